use svs_common::types::Neighbor;

/// Replace the root of a min-heap laid out in `heap` with `item`, then sift
/// down to restore the heap property. Returns the popped root.
///
/// `gt(a, b)` must return whether `a` orders strictly above `b`; the root is
/// the smallest element under that ordering, with children of node `i` at
/// `2i + 1` and `2i + 2`.
pub fn heap_replace<T>(heap: &mut [T], item: T, gt: impl Fn(&T, &T) -> bool) -> T {
    if heap.is_empty() {
        return item;
    }

    let popped = std::mem::replace(&mut heap[0], item);

    let len = heap.len();
    let mut idx = 0;
    loop {
        let left = 2 * idx + 1;
        let right = 2 * idx + 2;
        if left >= len {
            break;
        }

        // Pick the smaller child; left wins when the right is out of bounds
        // or not smaller.
        let smaller = if right >= len || gt(&heap[right], &heap[left]) {
            left
        } else {
            right
        };

        if gt(&heap[idx], &heap[smaller]) {
            heap.swap(idx, smaller);
            idx = smaller;
        } else {
            break;
        }
    }

    popped
}

/// Bounded top-k selection over a stream of per-shard result batches.
///
/// Holds the k best neighbors seen so far as a min-heap keyed by score, so
/// the worst retained candidate sits at the root and each new candidate costs
/// at most one heap-replace.
pub struct TopK {
    best: Vec<Neighbor>,
}

impl TopK {
    /// Seed from the first shard's batch, which arrives sorted descending by
    /// score. Loading it in reverse puts the smallest score at index 0 and
    /// yields a valid min-heap without a sift pass. Batches shorter than `k`
    /// are padded with leading sentinels, which keeps the array ascending and
    /// therefore still a valid min-heap.
    pub fn seeded(k: usize, batch: &[Neighbor]) -> Self {
        let m = batch.len().min(k);
        let mut best = vec![Neighbor::SENTINEL; k - m];
        best.extend(batch[..m].iter().rev());
        Self { best }
    }

    /// Admit `candidate` if it beats the worst retained neighbor. Strictly
    /// greater: equal scores never displace an existing entry.
    pub fn offer(&mut self, candidate: Neighbor) {
        match self.best.first() {
            Some(worst) if candidate.score > worst.score => {
                heap_replace(&mut self.best, candidate, |a, b| a.score > b.score);
            }
            _ => {}
        }
    }

    /// Drain into the final response: exactly k neighbors, best first,
    /// surviving sentinels at the tail.
    pub fn into_sorted(mut self) -> Vec<Neighbor> {
        self.best.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.best
    }
}

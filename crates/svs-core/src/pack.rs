use std::collections::BTreeMap;

/// Allocate `n` items to fixed-capacity buckets, filling each bucket to
/// capacity in ascending index order before moving to the next.
///
/// Returns the number of items that did not fit, and how many items each
/// bucket should accept (only buckets receiving a positive count appear).
pub fn greedy_fill(n: u32, capacity: u32, sizes: &[u32]) -> (u32, BTreeMap<usize, u32>) {
    let mut fills = BTreeMap::new();
    if n == 0 {
        return (0, fills);
    }

    let mut leftover = n;
    for (bucket, &size) in sizes.iter().enumerate() {
        let available = capacity.saturating_sub(size);
        if available == 0 {
            continue;
        }

        let take = leftover.min(available);
        fills.insert(bucket, take);
        leftover -= take;
        if leftover == 0 {
            break;
        }
    }

    (leftover, fills)
}

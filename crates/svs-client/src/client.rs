use async_trait::async_trait;
use svs_common::error::{Result, SvsError};
use svs_common::types::{IndexStats, Neighbor, Vector};
use svs_core::service::IndexService;
use tonic::transport::Channel;
use tonic::{Code, Status};

use crate::proto::{
    self, index_service_client::IndexServiceClient, DescribeRequest, InsertRequest, SearchRequest,
    UpsertRequest,
};

/// A shard endpoint seen through its RPC contract. Constructed once per
/// endpoint at router startup; the underlying channel multiplexes calls, so
/// cloning the generated client per request is cheap.
pub struct RemoteShard {
    inner: IndexServiceClient<Channel>,
}

impl RemoteShard {
    /// Connect to a shard endpoint. Bare `host:port` addresses are assumed
    /// to be plaintext http.
    pub async fn connect(addr: &str) -> Result<Self> {
        let url = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("http://{addr}")
        };
        let inner = IndexServiceClient::connect(url)
            .await
            .map_err(|e| SvsError::Transport(e.to_string()))?;
        Ok(Self { inner })
    }

    fn client(&self) -> IndexServiceClient<Channel> {
        self.inner.clone()
    }
}

#[async_trait]
impl IndexService for RemoteShard {
    async fn describe(&self) -> Result<IndexStats> {
        let resp = self
            .client()
            .describe(DescribeRequest {})
            .await
            .map_err(status_to_error)?
            .into_inner();
        Ok(IndexStats {
            dimensions: resp.dimensions as usize,
            num_vectors: resp.num_vectors as u64,
        })
    }

    async fn insert(&self, vectors: Vec<Vector>) -> Result<()> {
        let request = InsertRequest {
            vectors: vectors.into_iter().map(vector_to_proto).collect(),
        };
        self.client()
            .insert(request)
            .await
            .map_err(status_to_error)?;
        Ok(())
    }

    async fn upsert(&self, vectors: Vec<Vector>) -> Result<()> {
        let request = UpsertRequest {
            vectors: vectors.into_iter().map(vector_to_proto).collect(),
        };
        self.client()
            .upsert(request)
            .await
            .map_err(status_to_error)?;
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let request = SearchRequest {
            query_vector: query.to_vec(),
            k: k as i32,
        };
        let resp = self
            .client()
            .search(request)
            .await
            .map_err(status_to_error)?
            .into_inner();
        Ok(resp
            .neighbors
            .into_iter()
            .map(|n| Neighbor::new(n.id, n.score))
            .collect())
    }
}

fn vector_to_proto(vector: Vector) -> proto::Vector {
    proto::Vector {
        id: vector.id,
        raw: vector.raw,
    }
}

/// Fold a wire status back into the error taxonomy so callers can tell
/// validation, capacity, and availability failures apart without seeing the
/// transport.
fn status_to_error(status: Status) -> SvsError {
    match status.code() {
        Code::InvalidArgument => SvsError::InvalidArgument(status.message().to_string()),
        Code::ResourceExhausted => SvsError::CapacityExhausted,
        Code::Unavailable => SvsError::Transport(status.message().to_string()),
        _ => SvsError::Internal(status.message().to_string()),
    }
}

use svs_common::error::SvsError;
use svs_common::types::Vector;
use svs_core::service::IndexService;
use tonic::{Request, Response, Status};

use crate::proto;

/// Adapts anything speaking [`IndexService`] onto the wire contract; a shard
/// node and the router are served by the same adapter.
pub struct IndexGrpcService<S> {
    service: S,
}

impl<S> IndexGrpcService<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl<S: IndexService + 'static> proto::index_service_server::IndexService
    for IndexGrpcService<S>
{
    async fn describe(
        &self,
        _request: Request<proto::DescribeRequest>,
    ) -> Result<Response<proto::DescribeResponse>, Status> {
        let stats = self.service.describe().await.map_err(error_to_status)?;
        Ok(Response::new(proto::DescribeResponse {
            dimensions: stats.dimensions as i32,
            num_vectors: stats.num_vectors as i64,
        }))
    }

    async fn insert(
        &self,
        request: Request<proto::InsertRequest>,
    ) -> Result<Response<proto::InsertResponse>, Status> {
        let vectors = vectors_from_proto(request.into_inner().vectors);
        self.service
            .insert(vectors)
            .await
            .map_err(error_to_status)?;
        Ok(Response::new(proto::InsertResponse {}))
    }

    async fn upsert(
        &self,
        request: Request<proto::UpsertRequest>,
    ) -> Result<Response<proto::UpsertResponse>, Status> {
        let vectors = vectors_from_proto(request.into_inner().vectors);
        self.service
            .upsert(vectors)
            .await
            .map_err(error_to_status)?;
        Ok(Response::new(proto::UpsertResponse {}))
    }

    async fn search(
        &self,
        request: Request<proto::SearchRequest>,
    ) -> Result<Response<proto::SearchResponse>, Status> {
        let req = request.into_inner();
        if req.k < 0 {
            return Err(Status::invalid_argument(format!(
                "k must be non-negative, got {}",
                req.k
            )));
        }

        let neighbors = self
            .service
            .search(&req.query_vector, req.k as usize)
            .await
            .map_err(error_to_status)?;

        Ok(Response::new(proto::SearchResponse {
            neighbors: neighbors
                .into_iter()
                .map(|n| proto::Neighbor {
                    id: n.id,
                    score: n.score,
                })
                .collect(),
        }))
    }
}

fn vectors_from_proto(vectors: Vec<proto::Vector>) -> Vec<Vector> {
    vectors
        .into_iter()
        .map(|v| Vector::new(v.id, v.raw))
        .collect()
}

/// The only place errors meet wire status codes.
fn error_to_status(err: SvsError) -> Status {
    match err {
        SvsError::DimensionMismatch { .. } | SvsError::InvalidArgument(_) => {
            Status::invalid_argument(err.to_string())
        }
        SvsError::CapacityExhausted => Status::resource_exhausted(err.to_string()),
        SvsError::ShardUnavailable { .. } | SvsError::Transport(_) => {
            Status::unavailable(err.to_string())
        }
        SvsError::Internal(_) => Status::internal(err.to_string()),
    }
}

pub mod grpc;

#[allow(clippy::all)]
pub mod proto {
    tonic::include_proto!("svs.v1");
}

use svs_client::RemoteShard;
use svs_common::config::{RouterConfig, ShardConfig};
use svs_common::error::{Result, SvsError};
use svs_core::router::Router;
use svs_core::service::IndexService;
use svs_core::shard::ShardNode;

use crate::proto::index_service_server::IndexServiceServer;

/// Serve one shard: a local brute-force index behind the wire contract.
pub async fn run_shard_server(config: ShardConfig) -> Result<()> {
    let node = ShardNode::with_metric(config.dimensions, config.metric);
    tracing::info!(
        "starting shard node, dimensions={} metric={}",
        config.dimensions,
        config.metric
    );
    serve(node, config.port).await
}

/// Serve the router: connect to every shard endpoint in fill order, then
/// expose the same contract the shards do.
pub async fn run_router_server(config: RouterConfig) -> Result<()> {
    let mut shards = Vec::with_capacity(config.shard_addrs.len());
    for addr in &config.shard_addrs {
        tracing::info!("connecting to shard at {addr}");
        shards.push(RemoteShard::connect(addr).await?);
    }

    let router = Router::new(config.dimensions, config.shard_capacity, shards);
    tracing::info!(
        "starting router, dimensions={} shard_capacity={} num_shards={}",
        config.dimensions,
        config.shard_capacity,
        router.num_shards()
    );
    serve(router, config.port).await
}

async fn serve<S: IndexService + 'static>(service: S, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{port}")
        .parse()
        .map_err(|e: std::net::AddrParseError| SvsError::Internal(e.to_string()))?;

    tracing::info!("svs listening on {addr}");

    tonic::transport::Server::builder()
        .add_service(IndexServiceServer::new(grpc::IndexGrpcService::new(
            service,
        )))
        .serve(addr)
        .await
        .map_err(|e| SvsError::Internal(e.to_string()))?;

    Ok(())
}

mod client;

#[allow(clippy::all)]
pub mod proto {
    tonic::include_proto!("svs.v1");
}

pub use client::RemoteShard;

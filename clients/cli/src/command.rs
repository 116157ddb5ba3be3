use anyhow::Result;
use async_trait::async_trait;
use basecamp_client::ResourceSpec;

use crate::args::CommonOptions;

#[async_trait]
pub trait RunCommand {
    async fn run<
        A: tokio::io::AsyncWrite + Send + Sync + Unpin,
        B: tokio::io::AsyncWrite + Send + Sync + Unpin,
    >(
        &self,
        out: &mut tokio::io::BufWriter<A>,
        err: &mut tokio::io::BufWriter<B>,
        common_options: &CommonOptions,
    ) -> Result<()>;
}

/// A subcommand that acts on one resource, e.g. `basecamp treks list`.
#[async_trait]
pub trait RunResourceCommand {
    async fn run<
        A: tokio::io::AsyncWrite + Send + Sync + Unpin,
        B: tokio::io::AsyncWrite + Send + Sync + Unpin,
    >(
        &self,
        spec: &'static ResourceSpec,
        out: &mut tokio::io::BufWriter<A>,
        err: &mut tokio::io::BufWriter<B>,
        common_options: &CommonOptions,
    ) -> Result<()>;
}

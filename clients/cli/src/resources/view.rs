use anyhow::Result;
use async_trait::async_trait;
use basecamp_client::{resources, EntityId, ResourceSpec};
use clap::Parser;

use crate::args::CommonOptions;
use crate::{emitln, RunResourceCommand};

#[derive(Clone, Debug, Parser)]
pub struct View {
    /// Entity id
    id: EntityId,
}

#[async_trait]
impl RunResourceCommand for View {
    async fn run<
        A: tokio::io::AsyncWrite + Send + Sync + Unpin,
        B: tokio::io::AsyncWrite + Send + Sync + Unpin,
    >(
        &self,
        spec: &'static ResourceSpec,
        out: &mut tokio::io::BufWriter<A>,
        err: &mut tokio::io::BufWriter<B>,
        common_options: &CommonOptions,
    ) -> Result<()> {
        let client = common_options.new_client().await?;
        let response = resources::get(&client, spec, &self.id).await?;

        let entity = response.into_inner()?;
        let json = serde_json::to_value(&entity)?;
        let colored = colored_json::to_colored_json_auto(&json)?;
        emitln!(out, "{}", colored);
        emitln!(
            err,
            "Edit page: {}",
            spec.detail_route(&entity.id, entity.text("slug"))
        );

        Ok(())
    }
}

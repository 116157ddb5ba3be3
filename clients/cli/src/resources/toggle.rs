use anyhow::{bail, Result};
use async_trait::async_trait;
use basecamp_client::{resources, EntityId, ResourceSpec};
use clap::Parser;
use colored::Colorize;

use crate::args::CommonOptions;
use crate::{emitln, RunResourceCommand};

#[derive(Clone, Debug, Parser)]
pub struct Toggle {
    /// Entity id
    id: EntityId,
    /// Boolean field to flip, e.g. `isActive`
    field: String,
}

#[async_trait]
impl RunResourceCommand for Toggle {
    async fn run<
        A: tokio::io::AsyncWrite + Send + Sync + Unpin,
        B: tokio::io::AsyncWrite + Send + Sync + Unpin,
    >(
        &self,
        spec: &'static ResourceSpec,
        out: &mut tokio::io::BufWriter<A>,
        _err: &mut tokio::io::BufWriter<B>,
        common_options: &CommonOptions,
    ) -> Result<()> {
        if !spec.is_toggle_field(&self.field) {
            bail!(
                "'{}' can't be toggled on {}, try one of: {}",
                self.field,
                spec.title.to_lowercase(),
                spec.toggles.join(", ")
            );
        }

        let client = common_options.new_client().await?;
        let entity = resources::get(&client, spec, &self.id)
            .await?
            .into_inner()?;
        let wanted = !entity.flag(&self.field).unwrap_or(false);

        resources::set_flag(&client, spec, &self.id, &self.field, wanted)
            .await?
            .into_inner()?;

        let shown = if wanted {
            "true".green()
        } else {
            "false".red()
        };
        emitln!(
            out,
            "{} '{}': {} is now {}",
            spec.kind,
            self.id,
            self.field,
            shown
        );
        Ok(())
    }
}

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use basecamp_client::listing::{DeleteGate, GateOutcome, CONFIRMATION_WORD};
use basecamp_client::{resources, EntityId, ResourceSpec};
use clap::Parser;

use crate::args::CommonOptions;
use crate::confirm::typed_confirm_fn;
use crate::{emitln, RunResourceCommand};

#[derive(Clone, Debug, Parser)]
pub struct Delete {
    /// Entity id
    id: EntityId,
}

#[async_trait]
impl RunResourceCommand for Delete {
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
        let mut gate = DeleteGate::default();
        gate.open(self.id.clone())?;
        let confirmed = typed_confirm_fn(
            common_options.yes,
            format!(
                "Permanently delete {} '{}'? This can't be undone.",
                spec.kind, self.id
            ),
        )?;
        if confirmed {
            gate.input(CONFIRMATION_WORD)?;
        }
        let target = gate.begin().map_err(|_| anyhow!("Aborted!"))?;

        let client = common_options.new_client().await?;
        let result = match resources::delete(&client, spec, &target).await {
            | Ok(response) => {
                response.into_inner().map(|_| ()).map_err(|e| e.to_string())
            }
            | Err(e) => Err(e.to_string()),
        };
        match gate.finish(result) {
            | GateOutcome::Refresh { target } => {
                emitln!(out, "{} '{}' has been deleted!", spec.kind, target);
            }
            | GateOutcome::Toast(message) => bail!(message),
        }

        Ok(())
    }
}

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use colored::Colorize;

use crate::args::CommonOptions;
use crate::{emitln, RunCommand};

#[derive(Parser, Debug, Clone)]
pub struct WhoAmI {
    #[arg(long)]
    /// Reveal the configured API secret token
    show_secret_token: bool,
}

#[async_trait]
impl RunCommand for WhoAmI {
    async fn run<
        A: tokio::io::AsyncWrite + Send + Sync + Unpin,
        B: tokio::io::AsyncWrite + Send + Sync + Unpin,
    >(
        &self,
        out: &mut tokio::io::BufWriter<A>,
        err: &mut tokio::io::BufWriter<B>,
        common_options: &CommonOptions,
    ) -> Result<()> {
        emitln!(
            out,
            "Basecamp API: {}",
            common_options.base_url().to_string().green()
        );
        let path = common_options.session_path()?;
        emitln!(out, "Session File: {}", path.display());

        let session = common_options.session().await?;
        match session.admin() {
            | Some(admin) => {
                emitln!(
                    out,
                    "Signed in as: {} <{}>",
                    admin.name.bold(),
                    admin.email
                );
                if let Some(role) = admin.role {
                    emitln!(out, "Role: {role}");
                }
            }
            | None => emitln!(out, "Signed in as: {}", "nobody".dimmed()),
        }
        match session.token() {
            | Some(token) if self.show_secret_token => {
                emitln!(out, "Secret Token: {}", token.yellow());
            }
            | Some(_) => {}
            | None => {
                emitln!(
                    err,
                    "{}",
                    "WARNING: NO API SECRET TOKEN IS SET, CHANGES WILL BE \
                     REJECTED"
                        .red()
                );
            }
        }

        Ok(())
    }
}

use std::env::VarError;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use basecamp_client::{
    ClientBuilder,
    ResourceKind,
    SessionStore,
    BASE_URL_ENV,
    DEFAULT_BASE_URL,
    DEFAULT_SEARCH_DEBOUNCE_MS,
};
use clap::clap_derive::Parser;
use etcetera::base_strategy::{choose_base_strategy, BaseStrategy};
use once_cell::sync::OnceCell;
use url::Url;

use crate::client::WrappedClient;
use crate::resources::ResourceCommand;
use crate::{whoami, RunCommand, RunResourceCommand};

const BASECAMP_SECRET_TOKEN_VAR: &str = "BASECAMP_SECRET_TOKEN";
const BASECAMP_SESSION_FILE_VAR: &str = "BASECAMP_SESSION_FILE";

#[derive(Parser, Debug, Clone)]
/// Command-line back office for treks, tours, bookings and the rest
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonOptions,
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Parser, Debug, Clone)]
pub struct CommonOptions {
    #[arg(long, global = true)]
    /// Connect to a local API server (http://localhost:5000/api/)
    localhost: bool,
    #[arg(long, global = true, value_name = "URL", env(BASE_URL_ENV))]
    base_url: Option<Url>,
    #[arg(
        long,
        global = true,
        value_name = "TOKEN",
        env(BASECAMP_SECRET_TOKEN_VAR),
        hide_env_values = true
    )]
    /// Bearer token for changes (toggle, create, update, delete). We attempt
    /// to read from `.env` if the environment variable is not set, then fall
    /// back to the session file.
    secret_token: Option<String>,
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        env(BASECAMP_SESSION_FILE_VAR)
    )]
    /// Session file with the signed-in admin and token. Defaults to
    /// `basecamp/session.json` under the user's config directory.
    session: Option<PathBuf>,
    #[arg(long, global = true)]
    /// Displays a table with meta information about the response
    show_meta: bool,
    /// Ignore the confirmation prompt and always answer "yes"
    #[arg(long, short, global = true)]
    pub yes: bool,
    #[arg(
        long,
        global = true,
        value_name = "MILLIS",
        default_value_t = DEFAULT_SEARCH_DEBOUNCE_MS
    )]
    /// Quiet period before a search is sent while browsing
    debounce_ms: u64,
}

#[derive(Parser, Debug, Clone)]
pub enum CliCommand {
    /// Commands for treks
    #[command(visible_alias = "trek")]
    Treks {
        #[command(subcommand)]
        command: ResourceCommand,
    },
    /// Commands for tours
    #[command(visible_alias = "tour")]
    Tours {
        #[command(subcommand)]
        command: ResourceCommand,
    },
    /// Commands for wellness packages
    Wellness {
        #[command(subcommand)]
        command: ResourceCommand,
    },
    /// Commands for activities
    #[command(visible_alias = "activity")]
    Activities {
        #[command(subcommand)]
        command: ResourceCommand,
    },
    /// Commands for blog posts
    #[command(visible_alias = "blog")]
    Blogs {
        #[command(subcommand)]
        command: ResourceCommand,
    },
    /// Commands for bookings
    #[command(visible_alias = "booking")]
    Bookings {
        #[command(subcommand)]
        command: ResourceCommand,
    },
    /// Commands for trip-plan requests
    #[command(visible_alias = "trip-request")]
    TripRequests {
        #[command(subcommand)]
        command: ResourceCommand,
    },
    /// Commands for client accounts
    #[command(visible_alias = "user")]
    Users {
        #[command(subcommand)]
        command: ResourceCommand,
    },
    #[command(name = "whoami")]
    /// Prints information about the current context/environment
    WhoAmI(whoami::WhoAmI),
}

impl CommonOptions {
    /// The explicitly configured token, if any. Reads work without one.
    pub fn secret_token(&self) -> Result<Option<String>> {
        if let Some(ref token) = self.secret_token {
            return Ok(Some(token.to_string()));
        }

        // is it set in env (loaded from .env)
        match std::env::var(BASECAMP_SECRET_TOKEN_VAR) {
            | Ok(t) => Ok(Some(t)),
            | Err(VarError::NotPresent) => Ok(None),
            | e => {
                // Note that we land here, only when the environment is loaded
                // through the .env file. If the environment variable was set
                // directly, then self.secret_token would have been set.
                e.with_context(|| {
                    format!(
                        "Failed to load value of `{}` from .env file",
                        BASECAMP_SECRET_TOKEN_VAR
                    )
                })
                .map(Some)
            }
        }
    }

    pub fn session_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.session {
            return Ok(path.clone());
        }
        let strategy = choose_base_strategy()
            .context("Cannot locate the user's config directory")?;
        Ok(strategy.config_dir().join("basecamp").join("session.json"))
    }

    pub async fn session(&self) -> Result<SessionStore> {
        let path = self.session_path()?;
        let session = SessionStore::load(&path)
            .await
            .context("Error while loading session file")?;
        if let Some(token) = self.secret_token()? {
            session.set_token(Some(token));
        }
        Ok(session)
    }

    pub fn base_url(&self) -> &Url {
        if self.localhost {
            static LOCALHOST_URL: OnceCell<Url> = OnceCell::new();
            LOCALHOST_URL.get_or_init(|| {
                Url::parse("http://localhost:5000/api/").unwrap()
            })
        } else {
            self.base_url.as_ref().unwrap_or(&DEFAULT_BASE_URL)
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn show_meta(&self) -> bool {
        self.show_meta
    }

    pub async fn new_client(&self) -> Result<WrappedClient> {
        let session = self.session().await?;
        self.client_for(&session)
    }

    pub fn client_for(&self, session: &SessionStore) -> Result<WrappedClient> {
        let inner = ClientBuilder::new()
            .base_url(self.base_url().clone())
            .context("Error while parsing base url")?
            .secret_token(session.token())
            .build()?;
        Ok(WrappedClient {
            common_options: self.clone(),
            inner,
        })
    }
}

impl CliCommand {
    fn resource(&self) -> Option<(ResourceKind, &ResourceCommand)> {
        let pair = match self {
            | CliCommand::Treks { command } => (ResourceKind::Trek, command),
            | CliCommand::Tours { command } => (ResourceKind::Tour, command),
            | CliCommand::Wellness { command } => {
                (ResourceKind::Wellness, command)
            }
            | CliCommand::Activities { command } => {
                (ResourceKind::Activity, command)
            }
            | CliCommand::Blogs { command } => (ResourceKind::Blog, command),
            | CliCommand::Bookings { command } => {
                (ResourceKind::Booking, command)
            }
            | CliCommand::TripRequests { command } => {
                (ResourceKind::TripRequest, command)
            }
            | CliCommand::Users { command } => (ResourceKind::User, command),
            | CliCommand::WhoAmI(_) => return None,
        };
        Some(pair)
    }

    pub async fn run<
        A: tokio::io::AsyncWrite + Send + Sync + Unpin,
        B: tokio::io::AsyncWrite + Send + Sync + Unpin,
    >(
        &self,
        out: &mut tokio::io::BufWriter<A>,
        err: &mut tokio::io::BufWriter<B>,
        common_options: &CommonOptions,
    ) -> Result<()> {
        match (self, self.resource()) {
            | (CliCommand::WhoAmI(c), _) => {
                c.run(out, err, common_options).await
            }
            | (_, Some((kind, command))) => {
                command.run(kind.spec(), out, err, common_options).await
            }
            | (_, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resource_dispatch() {
        let cli = Cli::try_parse_from([
            "basecamp",
            "bookings",
            "list",
            "--filter",
            "status=pending",
        ])
        .unwrap();
        let (kind, _) = cli.command.resource().unwrap();
        assert_eq!(ResourceKind::Booking, kind);

        let cli = Cli::try_parse_from(["basecamp", "trek", "view", "42"]).unwrap();
        assert_eq!(ResourceKind::Trek, cli.command.resource().unwrap().0);

        for name in ["trip-requests", "trip-request"] {
            let cli = Cli::try_parse_from(["basecamp", name, "list"]).unwrap();
            assert_eq!(
                ResourceKind::TripRequest,
                cli.command.resource().unwrap().0
            );
        }

        let cli = Cli::try_parse_from(["basecamp", "whoami"]).unwrap();
        assert!(cli.command.resource().is_none());
    }

    #[test]
    fn test_common_options() {
        let cli = Cli::try_parse_from([
            "basecamp",
            "--localhost",
            "--debounce-ms",
            "250",
            "--session",
            "/tmp/session.json",
            "whoami",
        ])
        .unwrap();
        assert_eq!(
            "http://localhost:5000/api/",
            cli.common.base_url().as_str()
        );
        assert_eq!(Duration::from_millis(250), cli.common.debounce());
        assert_eq!(
            PathBuf::from("/tmp/session.json"),
            cli.common.session_path().unwrap()
        );
    }
}

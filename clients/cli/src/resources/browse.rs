use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use basecamp_client::listing::{
    GateOutcome,
    ListEvent,
    RemoteResource,
    Rendered,
    ResourceList,
    ToggleOutcome,
    CONFIRMATION_WORD,
};
use basecamp_client::{
    parse_filter,
    EntityId,
    ResourceSpec,
    SessionStore,
    SortKey,
    DEFAULT_LIMIT,
};
use clap::Parser;
use colored::Colorize;
use spinners::{Spinner, Spinners};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
use tracing::debug;

use super::{pagination_hint, render_text, QueryArgs};
use crate::args::CommonOptions;
use crate::client::WrappedClient;
use crate::{emitln, RunResourceCommand};

const HELP: &str = "\
Commands:
  search TEXT       free-text search (empty clears it)
  filter KEY=VALUE  narrow the list
  unfilter KEY      drop a filter
  sort KEY          sort by KEY, prefix with - for descending
  next | prev       move between pages
  page N            jump to page N
  limit N           change the page size
  toggle ID FIELD   flip a boolean field of a row
  open ID           show where the row is edited
  delete ID         delete a row (asks for confirmation)
  refresh           fetch the current page again
  help              show this message
  quit              leave";

#[derive(Clone, Debug, Parser)]
pub struct Browse {
    /// Page size
    #[clap(long, default_value_t = DEFAULT_LIMIT)]
    limit: u32,
    #[clap(flatten)]
    query: QueryArgs,
}

/// One line typed at the browse prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Search(String),
    Filter(String, String),
    Unfilter(String),
    Sort(SortKey),
    Next,
    Prev,
    Page(u32),
    Limit(u32),
    Toggle(EntityId, String),
    Open(EntityId),
    Delete(EntityId),
    Refresh,
    Help,
    Quit,
    Empty,
}

fn parse_line(line: &str) -> Result<Line, String> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        | Some((command, rest)) => (command, rest.trim()),
        | None => (line, ""),
    };
    let number = |what: &str| {
        rest.parse::<u32>()
            .map_err(|_| format!("{what} must be a positive number"))
    };
    let id = || {
        if rest.is_empty() {
            Err(format!("usage: {command} ID"))
        } else {
            Ok(EntityId::from(rest))
        }
    };
    let parsed = match command.to_lowercase().as_str() {
        | "" => Line::Empty,
        | "search" | "s" => Line::Search(rest.to_owned()),
        | "filter" | "f" => {
            let (key, value) = parse_filter(rest).map_err(|e| e.to_string())?;
            Line::Filter(key, value)
        }
        | "unfilter" => {
            if rest.is_empty() {
                return Err("usage: unfilter KEY".to_owned());
            }
            Line::Unfilter(rest.to_owned())
        }
        | "sort" => {
            Line::Sort(rest.parse::<SortKey>().map_err(|e| e.to_string())?)
        }
        | "next" | "n" => Line::Next,
        | "prev" | "p" => Line::Prev,
        | "page" => Line::Page(number("page")?),
        | "limit" => Line::Limit(number("limit")?),
        | "toggle" | "t" => match rest.split_once(char::is_whitespace) {
            | Some((id, field)) if !field.trim().is_empty() => {
                Line::Toggle(EntityId::from(id), field.trim().to_owned())
            }
            | _ => return Err("usage: toggle ID FIELD".to_owned()),
        },
        | "open" | "o" => Line::Open(id()?),
        | "delete" | "rm" => Line::Delete(id()?),
        | "refresh" | "r" => Line::Refresh,
        | "help" | "?" => Line::Help,
        | "quit" | "q" | "exit" => Line::Quit,
        | other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(parsed)
}

type Controller = ResourceList<RemoteResource<WrappedClient>>;

struct Screen {
    spec: &'static ResourceSpec,
    session: SessionStore,
    spinner: Option<Spinner>,
}

impl Screen {
    fn loading(&mut self, list: &Controller) {
        if self.spinner.is_none() && list.render() == Rendered::Loading {
            self.spinner = Some(Spinner::new(
                Spinners::Dots,
                format!("Loading {}", self.spec.title.to_lowercase()),
            ));
        }
    }

    fn stop_spinner(&mut self) {
        if let Some(mut spinner) = self.spinner.take() {
            spinner.stop_with_newline();
        }
    }

    async fn draw<A: tokio::io::AsyncWrite + Send + Sync + Unpin>(
        &mut self,
        out: &mut tokio::io::BufWriter<A>,
        list: &Controller,
    ) -> Result<()> {
        self.stop_spinner();
        let view = list.view();
        let query = &view.query;

        let mut header = format!("{} | page {}", self.spec.title.bold(), query.page);
        if let Some(ref search) = query.search {
            header.push_str(&format!(" | search: {search}"));
        }
        for (key, value) in &query.filters {
            header.push_str(&format!(" | {key}={value}"));
        }
        if let Some(ref sort) = query.sort {
            header.push_str(&format!(" | sort: {sort}"));
        }
        let pending = self.session.pending(self.spec.kind);
        if pending > 0 {
            header.push_str(&format!(
                " | {}",
                format!("{pending} pending").yellow()
            ));
        }

        emitln!(out);
        emitln!(out, "{header}");
        emitln!(out, "{}", render_text(self.spec, &list.render()));
        if let Some(ref error) = view.error {
            if !view.rows.is_empty() {
                emitln!(
                    out,
                    "{}",
                    format!("Refresh failed, showing earlier results: {error}")
                        .red()
                );
            }
        }
        if let Some(hint) = pagination_hint(&view) {
            emitln!(out, "{}", hint.replace("--page=", "page ").dimmed());
        }
        out.flush().await?;
        Ok(())
    }
}

async fn prompt<A: tokio::io::AsyncWrite + Send + Sync + Unpin>(
    out: &mut tokio::io::BufWriter<A>,
    text: &str,
) -> Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

#[async_trait]
impl RunResourceCommand for Browse {
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
        let session = common_options.session().await?;
        let client = common_options.client_for(&session)?;
        let mut list = ResourceList::new(RemoteResource::new(client, spec))
            .with_debounce(common_options.debounce())
            .with_limit(self.limit)
            .with_session(session.clone());
        let mut events = list.subscribe();

        if let Some(ref sort) = self.query.sort {
            list.set_sort(sort.clone());
        }
        for (key, value) in self.query.filters()? {
            list.set_filter(&key, &value)?;
        }
        if let Some(ref search) = self.query.search {
            list.set_search(search);
        }
        // the flags above only shaped the query, this is the first fetch
        list.refresh();

        let mut screen = Screen {
            spec,
            session,
            spinner: None,
        };
        screen.loading(&list);

        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    let line = match parse_line(&line) {
                        | Ok(line) => line,
                        | Err(e) => {
                            emitln!(err, "{}", e.red());
                            err.flush().await?;
                            continue;
                        }
                    };
                    if line == Line::Quit {
                        break;
                    }
                    let redraw = self
                        .handle(line, &mut list, &mut lines, out, common_options)
                        .await?;
                    if redraw {
                        screen.draw(out, &list).await?;
                    } else {
                        screen.loading(&list);
                    }
                }
                Some(event) = events.recv() => {
                    debug!(?event, "List event");
                    match event {
                        | ListEvent::Applied { .. } | ListEvent::Failed { .. } => {
                            screen.draw(out, &list).await?;
                        }
                        | ListEvent::Discarded { .. } => {}
                    }
                }
            }
        }

        screen.stop_spinner();
        // let a delete's refresh or a pending search finish before exiting
        tokio::time::timeout(Duration::from_secs(5), list.settle())
            .await
            .ok();
        Ok(())
    }
}

impl Browse {
    /// Applies one prompt line. Returns whether the screen should be redrawn
    /// right away; fetch results redraw on their own.
    async fn handle<
        A: tokio::io::AsyncWrite + Send + Sync + Unpin,
        R: tokio::io::AsyncBufRead + Send + Unpin,
    >(
        &self,
        line: Line,
        list: &mut Controller,
        lines: &mut tokio::io::Lines<R>,
        out: &mut tokio::io::BufWriter<A>,
        common_options: &CommonOptions,
    ) -> Result<bool> {
        match line {
            | Line::Search(text) => {
                list.set_search(&text);
            }
            | Line::Filter(key, value) => {
                if let Err(e) = list.set_filter(&key, &value) {
                    emitln!(out, "{}", e.to_string().red());
                }
            }
            | Line::Unfilter(key) => {
                list.clear_filter(&key);
            }
            | Line::Sort(sort) => {
                list.set_sort(sort);
            }
            | Line::Next => {
                list.next_page();
            }
            | Line::Prev => {
                list.prev_page();
            }
            | Line::Page(page) => {
                if let Err(e) = list.set_page(page) {
                    emitln!(out, "{}", e.to_string().red());
                }
            }
            | Line::Limit(limit) => {
                if let Err(e) = list.set_limit(limit) {
                    emitln!(out, "{}", e.to_string().red());
                }
            }
            | Line::Refresh => list.refresh(),
            | Line::Open(id) => {
                emitln!(out, "Edit page: {}", list.navigate(&id));
            }
            | Line::Toggle(id, field) => {
                match list.toggle(&id, &field).await {
                    | ToggleOutcome::Applied(value) => {
                        emitln!(out, "{id}: {field} is now {value}");
                        out.flush().await?;
                        return Ok(true);
                    }
                    | ToggleOutcome::Rejected(message) => {
                        emitln!(
                            out,
                            "{}",
                            format!("Failed to update {field}: {message}").red()
                        );
                    }
                    | ToggleOutcome::Busy => {
                        emitln!(out, "{id} is already being updated");
                    }
                    | ToggleOutcome::UnknownRow => {
                        emitln!(out, "No row '{id}' on this page");
                    }
                    | ToggleOutcome::NotToggleable => {
                        emitln!(
                            out,
                            "'{field}' can't be toggled, try one of: {}",
                            list.spec().toggles.join(", ")
                        );
                    }
                }
            }
            | Line::Delete(id) => {
                self.delete(id, list, lines, out, common_options).await?;
            }
            | Line::Help => emitln!(out, "{HELP}"),
            | Line::Empty | Line::Quit => return Ok(true),
        }
        out.flush().await?;
        Ok(false)
    }

    async fn delete<
        A: tokio::io::AsyncWrite + Send + Sync + Unpin,
        R: tokio::io::AsyncBufRead + Send + Unpin,
    >(
        &self,
        id: EntityId,
        list: &mut Controller,
        lines: &mut tokio::io::Lines<R>,
        out: &mut tokio::io::BufWriter<A>,
        common_options: &CommonOptions,
    ) -> Result<()> {
        let label = match list.view().row(&id) {
            | Some(row) => match row.display_name() {
                | Some(name) => format!("'{name}' ({id})"),
                | None => format!("'{id}'"),
            },
            | None => {
                emitln!(out, "No row '{id}' on this page");
                return Ok(());
            }
        };
        list.request_delete(id.clone())?;

        let answer = if common_options.yes {
            CONFIRMATION_WORD.to_owned()
        } else {
            prompt(
                out,
                &format!(
                    "Permanently delete {} {label}? Type \
                     '{CONFIRMATION_WORD}' to continue: ",
                    list.spec().kind
                ),
            )
            .await?;
            lines.next_line().await?.unwrap_or_default()
        };

        if !list.type_confirmation(&answer)? {
            list.cancel_delete()?;
            emitln!(out, "Delete cancelled");
            return Ok(());
        }
        let outcome = list.confirm_delete().await?;
        match outcome {
            | GateOutcome::Refresh { target } => {
                emitln!(out, "{} '{target}' has been deleted!", list.spec().kind);
            }
            | GateOutcome::Toast(message) => {
                emitln!(out, "{}", message.red());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(Ok(Line::Search("base camp".to_owned())), parse_line("search base camp"));
        assert_eq!(Ok(Line::Search(String::new())), parse_line("search"));
        assert_eq!(
            Ok(Line::Filter("status".to_owned(), "pending".to_owned())),
            parse_line("filter status=pending")
        );
        assert_eq!(
            Ok(Line::Sort(SortKey::descending("createdAt"))),
            parse_line("sort -createdAt")
        );
        assert_eq!(Ok(Line::Page(3)), parse_line("page 3"));
        assert_eq!(
            Ok(Line::Toggle(EntityId::from("42"), "isActive".to_owned())),
            parse_line("toggle 42 isActive")
        );
        assert_eq!(Ok(Line::Delete(EntityId::from("42"))), parse_line("DELETE 42"));
        assert_eq!(Ok(Line::Quit), parse_line("q"));
        assert_eq!(Ok(Line::Empty), parse_line("   "));
    }

    #[test]
    fn test_descending_sort_flag() {
        let browse =
            Browse::try_parse_from(["browse", "--sort", "-name", "--limit", "5"])
                .unwrap();
        assert_eq!(Some(SortKey::descending("name")), browse.query.sort);
        assert_eq!(5, browse.limit);
    }

    #[test]
    fn test_parse_line_errors() {
        assert!(parse_line("page two").is_err());
        assert!(parse_line("toggle 42").is_err());
        assert!(parse_line("filter status").is_err());
        assert!(parse_line("delete").is_err());
        assert!(parse_line("unfilter").is_err());
        assert!(parse_line("dance").is_err());
    }
}

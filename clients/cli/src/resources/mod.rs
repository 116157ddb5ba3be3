//! Subcommands shared by every resource (`basecamp <resource> ...`).

mod browse;
mod delete;
mod form;
mod list;
mod toggle;
mod view;

use anyhow::Result;
use async_trait::async_trait;
use basecamp_client::listing::{ListView, Rendered};
use basecamp_client::{parse_filter, ListQuery, ResourceSpec, SortKey};
use clap::Parser;
use prettytable::{Cell as TableCell, Row, Table};

pub use self::browse::Browse;
pub use self::delete::Delete;
pub use self::form::{Create, Update};
pub use self::list::List;
pub use self::toggle::Toggle;
pub use self::view::View;
use crate::args::CommonOptions;
use crate::ui::FancyToString;
use crate::RunResourceCommand;

#[derive(Parser, Debug, Clone)]
pub enum ResourceCommand {
    /// List one page, with optional search, sort and filters
    #[command(visible_alias = "ls")]
    List(List),
    /// View details about a given entity
    #[command(visible_alias = "v")]
    View(View),
    /// Flip a boolean field (visibility, popular, paid, ...)
    Toggle(Toggle),
    /// Permanently delete an entity
    Delete(Delete),
    /// Create an entity from a JSON definition
    Create(Create),
    /// Replace an entity's fields from a JSON definition
    Update(Update),
    /// Interactive list with live search, paging and row actions
    Browse(Browse),
}

#[async_trait]
impl RunResourceCommand for ResourceCommand {
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
        match self {
            | ResourceCommand::List(c) => {
                c.run(spec, out, err, common_options).await
            }
            | ResourceCommand::View(c) => {
                c.run(spec, out, err, common_options).await
            }
            | ResourceCommand::Toggle(c) => {
                c.run(spec, out, err, common_options).await
            }
            | ResourceCommand::Delete(c) => {
                c.run(spec, out, err, common_options).await
            }
            | ResourceCommand::Create(c) => {
                c.run(spec, out, err, common_options).await
            }
            | ResourceCommand::Update(c) => {
                c.run(spec, out, err, common_options).await
            }
            | ResourceCommand::Browse(c) => {
                c.run(spec, out, err, common_options).await
            }
        }
    }
}

/// Query flags shared by `list` and `browse`.
#[derive(Parser, Debug, Clone)]
pub struct QueryArgs {
    /// Free-text search
    #[clap(long)]
    search: Option<String>,
    /// Sort key, prefix with `-` for descending (e.g. `-createdAt`)
    #[clap(long, allow_hyphen_values = true)]
    sort: Option<SortKey>,
    /// Only show entities where KEY equals VALUE. Repeatable.
    #[clap(long = "filter", value_name = "KEY=VALUE")]
    filters: Vec<String>,
}

impl QueryArgs {
    pub fn filters(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .filters
            .iter()
            .map(|raw| parse_filter(raw))
            .collect::<Result<_, _>>()?)
    }
}

/// The rendered list as terminal text: a table, or the empty/loading/error
/// message in its place.
pub(crate) fn render_text(spec: &ResourceSpec, rendered: &Rendered) -> String {
    match rendered {
        | Rendered::Loading => "Loading...".to_owned(),
        | Rendered::Empty(message) => message.clone(),
        | Rendered::Failed(message) => {
            format!("Failed to load {}: {message}", spec.title.to_lowercase())
        }
        | Rendered::Table(rows) => {
            let mut table = Table::new();
            let mut titles = vec![TableCell::new("ID")];
            titles.extend(spec.columns.iter().map(|c| TableCell::new(c.header)));
            table.set_titles(Row::new(titles));
            for row in rows {
                let mut cells = vec![TableCell::new(row.id.as_str())];
                cells.extend(row.cells.iter().map(|c| TableCell::new(&c.fancy())));
                table.add_row(Row::new(cells));
            }
            table.to_string()
        }
    }
}

/// `Page N of M`, or a hint for the next page when the server doesn't say.
pub(crate) fn pagination_hint(view: &ListView) -> Option<String> {
    let query: &ListQuery = &view.query;
    match view.total_pages {
        | Some(total) => Some(format!("Page {} of {total}", query.page)),
        | None if view.has_more() => {
            Some(format!("View next page by --page={}", query.page + 1))
        }
        | None => None,
    }
}

#[cfg(test)]
mod tests {
    use basecamp_client::listing::{render, Cell, RenderedRow};
    use basecamp_client::{Entity, EntityId, TREKS};

    use super::*;

    #[test]
    fn test_render_text_messages() {
        assert_eq!("Loading...", render_text(&TREKS, &Rendered::Loading));
        assert_eq!(
            "No treks found.",
            render_text(&TREKS, &Rendered::Empty("No treks found.".to_owned()))
        );
        assert_eq!(
            "Failed to load treks: boom",
            render_text(&TREKS, &Rendered::Failed("boom".to_owned()))
        );
    }

    #[test]
    fn test_render_text_table() {
        colored::control::set_override(false);
        let rendered = Rendered::Table(vec![RenderedRow {
            id: EntityId::from("t1"),
            cells: vec![Cell::Text("Everest Trek".to_owned())],
        }]);
        let text = render_text(&TREKS, &rendered);
        assert!(text.contains("Everest Trek"));
        assert!(text.contains("t1"));
        assert!(text.contains("Name"));
    }

    #[test]
    fn test_pagination_hint() {
        let mut view = ListView {
            rows: (0..10).map(|i| Entity::new(format!("{i}"))).collect(),
            loaded: true,
            ..Default::default()
        };
        assert_eq!(
            Some("View next page by --page=2".to_owned()),
            pagination_hint(&view)
        );
        view.rows.truncate(3);
        assert_eq!(None, pagination_hint(&view));
        view.total_pages = Some(4);
        assert_eq!(Some("Page 1 of 4".to_owned()), pagination_hint(&view));
        assert!(matches!(render(&view, &TREKS), Rendered::Table(_)));
    }
}

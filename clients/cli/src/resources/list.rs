use anyhow::Result;
use async_trait::async_trait;
use basecamp_client::listing::{render, ListView, QueryState};
use basecamp_client::{resources, ResourceSpec, DEFAULT_LIMIT, DEFAULT_PAGE};
use clap::Parser;

use super::{pagination_hint, render_text, QueryArgs};
use crate::args::CommonOptions;
use crate::{emitln, RunResourceCommand};

#[derive(Clone, Debug, Parser)]
pub struct List {
    /// Page to show, starting at 1
    #[clap(long, default_value_t = DEFAULT_PAGE)]
    page: u32,
    /// Limit the number of results
    #[clap(long, default_value_t = DEFAULT_LIMIT)]
    limit: u32,
    #[clap(flatten)]
    query: QueryArgs,
}

impl List {
    fn query_state(&self, spec: &'static ResourceSpec) -> Result<QueryState> {
        let mut state = QueryState::new(spec);
        if let Some(ref search) = self.query.search {
            state.set_search(search);
        }
        if let Some(ref sort) = self.query.sort {
            state.set_sort(sort.clone());
        }
        for (key, value) in self.query.filters()? {
            state.set_filter(&key, &value)?;
        }
        state.set_limit(self.limit)?;
        // last, everything above sends us back to page 1
        state.set_page(self.page)?;
        Ok(state)
    }
}

#[async_trait]
impl RunResourceCommand for List {
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
        let query = self.query_state(spec)?.snapshot();
        let client = common_options.new_client().await?;
        let page = resources::list_page(&client, spec, &query).await?;

        let len = page.data.len();
        let view = ListView {
            rows: page.data,
            loaded: true,
            total_pages: page.total_pages,
            query,
            ..Default::default()
        };
        emitln!(out, "{}", render_text(spec, &render(&view, spec)));

        if len > 0 {
            emitln!(err, "{len} {} Shown", spec.title);
        }
        if let Some(hint) = pagination_hint(&view) {
            emitln!(err, "{hint}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use basecamp_client::{SortKey, BOOKINGS};

    use super::*;

    #[test]
    fn test_flags_build_query() {
        let list = List::try_parse_from([
            "list",
            "--page",
            "3",
            "--limit",
            "25",
            "--search",
            "everest",
            "--sort",
            "-createdAt",
            "--filter",
            "status=PENDING",
        ])
        .unwrap();
        let query = list.query_state(&BOOKINGS).unwrap().snapshot();
        assert_eq!(3, query.page);
        assert_eq!(25, query.limit);
        assert_eq!(Some("everest".to_owned()), query.search);
        assert_eq!(Some(SortKey::descending("createdAt")), query.sort);
        assert_eq!(Some(&"pending".to_owned()), query.filters.get("status"));
    }

    #[test]
    fn test_bad_filter_is_rejected() {
        let list =
            List::try_parse_from(["list", "--filter", "status=lost"]).unwrap();
        assert!(list.query_state(&BOOKINGS).is_err());

        let list = List::try_parse_from(["list", "--filter", "nokey"]).unwrap();
        assert!(list.query_state(&BOOKINGS).is_err());
    }
}

use basecamp_api_model::{ListQuery, QueryError, ResourceSpec, SortKey};

/// How a query change should reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryChange {
    /// Nothing changed, no fetch needed.
    Unchanged,
    Immediate,
    /// Free-text search, fetched after the debounce window.
    Debounced,
}

/// Owns pagination, sort, search and filters of one resource list.
///
/// Changing what is being looked at (search, filters, sort, page size)
/// always sends the user back to page 1.
#[derive(Debug, Clone)]
pub struct QueryState {
    spec: &'static ResourceSpec,
    query: ListQuery,
}

impl QueryState {
    pub fn new(spec: &'static ResourceSpec) -> Self {
        Self {
            spec,
            query: ListQuery {
                sort: spec.default_sort(),
                ..Default::default()
            },
        }
    }

    pub fn spec(&self) -> &'static ResourceSpec {
        self.spec
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn snapshot(&self) -> ListQuery {
        self.query.clone()
    }

    pub fn set_search(&mut self, text: &str) -> QueryChange {
        let text = text.trim();
        let search = if text.is_empty() {
            None
        } else {
            Some(text.to_owned())
        };
        if search == self.query.search {
            return QueryChange::Unchanged;
        }
        self.query.search = search;
        self.query.page = 1;
        QueryChange::Debounced
    }

    pub fn set_filter(
        &mut self,
        key: &str,
        value: &str,
    ) -> Result<QueryChange, QueryError> {
        let value = self.spec.validate_filter(key, value)?;
        if self.query.filters.get(key).map(String::as_str) == Some(value) {
            return Ok(QueryChange::Unchanged);
        }
        self.query.filters.insert(key.to_owned(), value.to_owned());
        self.query.page = 1;
        Ok(QueryChange::Immediate)
    }

    pub fn clear_filter(&mut self, key: &str) -> QueryChange {
        if self.query.filters.remove(key).is_none() {
            return QueryChange::Unchanged;
        }
        self.query.page = 1;
        QueryChange::Immediate
    }

    pub fn set_sort(&mut self, sort: SortKey) -> QueryChange {
        if self.query.sort.as_ref() == Some(&sort) {
            return QueryChange::Unchanged;
        }
        self.query.sort = Some(sort);
        self.query.page = 1;
        QueryChange::Immediate
    }

    pub fn set_limit(&mut self, limit: u32) -> Result<QueryChange, QueryError> {
        if limit == 0 {
            return Err(QueryError::InvalidLimit);
        }
        if limit == self.query.limit {
            return Ok(QueryChange::Unchanged);
        }
        self.query.limit = limit;
        self.query.page = 1;
        Ok(QueryChange::Immediate)
    }

    pub fn set_page(&mut self, page: u32) -> Result<QueryChange, QueryError> {
        if page < 1 {
            return Err(QueryError::InvalidPage);
        }
        if page == self.query.page {
            return Ok(QueryChange::Unchanged);
        }
        self.query.page = page;
        Ok(QueryChange::Immediate)
    }

    pub fn next_page(&mut self) -> QueryChange {
        self.query.page = self.query.page.saturating_add(1);
        QueryChange::Immediate
    }

    pub fn prev_page(&mut self) -> QueryChange {
        if self.query.page <= 1 {
            return QueryChange::Unchanged;
        }
        self.query.page -= 1;
        QueryChange::Immediate
    }
}

#[cfg(test)]
mod tests {
    use basecamp_api_model::{BOOKINGS, TREKS};

    use super::*;

    #[test]
    fn test_defaults_come_from_resource() {
        let state = QueryState::new(&TREKS);
        assert_eq!(1, state.query().page);
        assert_eq!(Some(SortKey::descending("createdAt")), state.query().sort);
        assert!(state.query().filters.is_empty());
    }

    #[test]
    fn test_search_resets_page_and_is_debounced() {
        let mut state = QueryState::new(&TREKS);
        state.set_page(4).unwrap();
        assert_eq!(QueryChange::Debounced, state.set_search("camp"));
        assert_eq!(1, state.query().page);
        assert_eq!(Some("camp".to_owned()), state.query().search);

        // same text (modulo surrounding whitespace) is not a change
        assert_eq!(QueryChange::Unchanged, state.set_search(" camp "));
        // clearing the box is a change
        assert_eq!(QueryChange::Debounced, state.set_search(""));
        assert_eq!(None, state.query().search);
    }

    #[test]
    fn test_filter_resets_page() {
        let mut state = QueryState::new(&BOOKINGS);
        state.next_page();
        state.next_page();
        assert_eq!(3, state.query().page);

        assert_eq!(
            Ok(QueryChange::Immediate),
            state.set_filter("status", "PENDING")
        );
        assert_eq!(1, state.query().page);
        assert_eq!(
            Some(&"pending".to_owned()),
            state.query().filters.get("status")
        );
        assert_eq!(
            Ok(QueryChange::Unchanged),
            state.set_filter("status", "pending")
        );

        state.next_page();
        assert_eq!(QueryChange::Immediate, state.clear_filter("status"));
        assert_eq!(1, state.query().page);
        assert_eq!(QueryChange::Unchanged, state.clear_filter("status"));
    }

    #[test]
    fn test_invalid_filter_is_not_applied() {
        let mut state = QueryState::new(&BOOKINGS);
        state.next_page();
        assert!(state.set_filter("status", "lost").is_err());
        assert!(state.set_filter("colour", "red").is_err());
        assert!(state.query().filters.is_empty());
        // nothing changed, so the page stays where it was
        assert_eq!(2, state.query().page);
    }

    #[test]
    fn test_sort_and_limit_reset_page() {
        let mut state = QueryState::new(&TREKS);
        state.next_page();
        assert_eq!(
            QueryChange::Immediate,
            state.set_sort(SortKey::ascending("name"))
        );
        assert_eq!(1, state.query().page);
        assert_eq!(
            QueryChange::Unchanged,
            state.set_sort(SortKey::ascending("name"))
        );

        state.next_page();
        assert_eq!(Ok(QueryChange::Immediate), state.set_limit(50));
        assert_eq!(1, state.query().page);
        assert_eq!(Err(QueryError::InvalidLimit), state.set_limit(0));
    }

    #[test]
    fn test_paging() {
        let mut state = QueryState::new(&TREKS);
        assert_eq!(QueryChange::Unchanged, state.prev_page());
        assert_eq!(QueryChange::Immediate, state.next_page());
        assert_eq!(2, state.query().page);
        assert_eq!(QueryChange::Immediate, state.prev_page());
        assert_eq!(1, state.query().page);
        assert_eq!(Err(QueryError::InvalidPage), state.set_page(0));
        assert_eq!(Ok(QueryChange::Unchanged), state.set_page(1));
    }
}

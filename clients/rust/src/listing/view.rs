use basecamp_api_model::{
    status_label,
    ColumnKind,
    Entity,
    EntityId,
    ListQuery,
    ResourceSpec,
    StatusTone,
};

/// What the list currently shows. Owned by the fetch coordinator, read by
/// the renderer and patched in place by row toggles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListView {
    pub rows: Vec<Entity>,
    /// True while the most recently issued fetch is outstanding.
    pub loading: bool,
    /// Set once a fetch has been applied; before that there is nothing to
    /// call "empty".
    pub loaded: bool,
    /// Last fetch failure. Rows from the previous successful fetch are kept.
    pub error: Option<String>,
    pub total_pages: Option<u32>,
    /// The query the current rows were fetched with.
    pub query: ListQuery,
}

impl ListView {
    pub fn row(&self, id: &EntityId) -> Option<&Entity> {
        self.rows.iter().find(|r| &r.id == id)
    }

    /// Same rule as [`basecamp_api_model::ListPage::has_more`], applied to
    /// what is on screen.
    pub fn has_more(&self) -> bool {
        match self.total_pages {
            | Some(total) => self.query.page < total,
            | None => self.rows.len() >= self.query.limit as usize,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Badge { label: String, tone: StatusTone },
    Switch(bool),
    Date(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub id: EntityId,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Loading,
    Empty(String),
    /// A fetch failed and there is nothing older to fall back to.
    Failed(String),
    Table(Vec<RenderedRow>),
}

/// Maps the view onto display rows. Pure: no I/O, same input same output.
pub fn render(view: &ListView, spec: &ResourceSpec) -> Rendered {
    if view.loading {
        return Rendered::Loading;
    }
    if view.rows.is_empty() {
        if let Some(ref error) = view.error {
            return Rendered::Failed(error.clone());
        }
        if !view.loaded {
            return Rendered::Loading;
        }
        return Rendered::Empty(empty_message(&view.query, spec));
    }

    let rows = view
        .rows
        .iter()
        .take(view.query.limit as usize)
        .map(|entity| RenderedRow {
            id: entity.id.clone(),
            cells: spec
                .columns
                .iter()
                .map(|column| render_cell(entity, column.field, column.kind))
                .collect(),
        })
        .collect();
    Rendered::Table(rows)
}

fn render_cell(entity: &Entity, field: &str, kind: ColumnKind) -> Cell {
    match kind {
        | ColumnKind::Text => Cell::Text(entity.cell(field)),
        | ColumnKind::Status => {
            let raw = entity.cell(field);
            Cell::Badge {
                label: status_label(&raw),
                tone: StatusTone::of(&raw),
            }
        }
        | ColumnKind::Toggle => Cell::Switch(entity.flag(field).unwrap_or(false)),
        | ColumnKind::Date => {
            let formatted = match field {
                | "createdAt" => entity
                    .created_at()
                    .map(|t| t.format("%Y-%m-%d").to_string()),
                | _ => None,
            };
            Cell::Date(formatted.unwrap_or_else(|| entity.cell(field)))
        }
    }
}

fn empty_message(query: &ListQuery, spec: &ResourceSpec) -> String {
    let noun = spec.title.to_lowercase();
    let narrowed = query.search.is_some() || !query.filters.is_empty();
    if narrowed {
        format!("No {noun} match the current search or filters.")
    } else if query.page > 1 {
        format!("No more {noun} on page {}.", query.page)
    } else {
        format!("No {noun} found.")
    }
}

#[cfg(test)]
mod tests {
    use basecamp_api_model::{BOOKINGS, TREKS};

    use super::*;

    fn loaded(rows: Vec<Entity>, limit: u32) -> ListView {
        ListView {
            rows,
            loaded: true,
            query: ListQuery {
                limit,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_single_trek_row() {
        let view = loaded(
            vec![Entity::new("1")
                .with("name", "Everest Trek")
                .with("isPopular", false)],
            10,
        );
        let Rendered::Table(rows) = render(&view, &TREKS) else {
            panic!("expected a table");
        };
        assert_eq!(1, rows.len());
        assert_eq!("1", rows[0].id.as_str());
        assert_eq!(Cell::Text("Everest Trek".to_owned()), rows[0].cells[0]);
        // Popular column, unchecked
        assert_eq!(Cell::Switch(false), rows[0].cells[4]);
    }

    #[test]
    fn test_rows_never_exceed_limit() {
        let rows: Vec<Entity> =
            (0..25).map(|i| Entity::new(format!("t{i}"))).collect();
        for limit in [1, 5, 10, 25, 100] {
            let view = loaded(rows.clone(), limit);
            match render(&view, &TREKS) {
                | Rendered::Table(rendered) => {
                    assert!(rendered.len() <= limit as usize)
                }
                | other => panic!("unexpected render: {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_state() {
        let view = loaded(vec![], 10);
        assert_eq!(
            Rendered::Empty("No treks found.".to_owned()),
            render(&view, &TREKS)
        );

        let mut narrowed = loaded(vec![], 10);
        narrowed.query.search = Some("camp".to_owned());
        assert_eq!(
            Rendered::Empty(
                "No treks match the current search or filters.".to_owned()
            ),
            render(&narrowed, &TREKS)
        );
    }

    #[test]
    fn test_loading_wins() {
        let mut view = loaded(vec![Entity::new("1")], 10);
        view.loading = true;
        assert_eq!(Rendered::Loading, render(&view, &TREKS));
        // nothing fetched yet
        assert_eq!(Rendered::Loading, render(&ListView::default(), &TREKS));
    }

    #[test]
    fn test_failure_keeps_stale_rows() {
        let mut view = loaded(vec![Entity::new("1")], 10);
        view.error = Some("connection refused".to_owned());
        assert!(matches!(render(&view, &TREKS), Rendered::Table(_)));

        let mut view = ListView::default();
        view.error = Some("connection refused".to_owned());
        assert_eq!(
            Rendered::Failed("connection refused".to_owned()),
            render(&view, &TREKS)
        );
    }

    #[test]
    fn test_status_badges() {
        let view = loaded(
            vec![
                Entity::new("b1").with("status", "pending"),
                Entity::new("b2").with("status", "CONFIRMED"),
            ],
            10,
        );
        let Rendered::Table(rows) = render(&view, &BOOKINGS) else {
            panic!("expected a table");
        };
        let status_idx = BOOKINGS
            .columns
            .iter()
            .position(|c| c.kind == ColumnKind::Status)
            .unwrap();
        assert_eq!(
            Cell::Badge {
                label: "Pending".to_owned(),
                tone: StatusTone::Orange
            },
            rows[0].cells[status_idx]
        );
        assert_eq!(
            Cell::Badge {
                label: "Confirmed".to_owned(),
                tone: StatusTone::Green
            },
            rows[1].cells[status_idx]
        );
    }

    #[test]
    fn test_date_cells() {
        let view = loaded(
            vec![Entity::new("1").with("createdAt", "2024-03-01T10:00:00Z")],
            10,
        );
        let Rendered::Table(rows) = render(&view, &TREKS) else {
            panic!("expected a table");
        };
        assert_eq!(
            Some(&Cell::Date("2024-03-01".to_owned())),
            rows[0].cells.last()
        );
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::EntityId;

/// Fields tried, in order, when an entity needs a human readable label.
const DISPLAY_FIELDS: &[&str] = &["name", "title", "fullName", "email"];

/// A record of any managed resource.
///
/// Resources differ wildly in shape (a booking has nothing in common with a
/// blog post besides an id), so everything apart from the identifier is kept
/// as raw JSON and read through typed accessors. Columns, filters and toggle
/// fields are described by [`crate::ResourceSpec`] rather than by Rust types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Link from one entity to another, e.g. a booking pointing at the trek or
/// tour it was made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignRef {
    pub id: EntityId,
    pub kind: Option<String>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style helper, mostly handy for fixtures.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_owned(), value.into());
        self
    }

    pub fn display_name(&self) -> Option<&str> {
        DISPLAY_FIELDS.iter().find_map(|f| self.text(f))
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        self.fields.get(field).and_then(Value::as_bool)
    }

    pub fn set_flag(&mut self, field: &str, value: bool) {
        self.fields.insert(field.to_owned(), Value::Bool(value));
    }

    pub fn status(&self) -> Option<&str> {
        self.text("status")
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.text("createdAt")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn reference(&self) -> Option<ForeignRef> {
        let id = self.text("adventureId")?;
        Some(ForeignRef {
            id: id.into(),
            kind: self.text("adventureType").map(ToOwned::to_owned),
        })
    }

    /// Renders a field for tabular output. Nested values are shown as
    /// compact JSON, missing values as an empty string.
    pub fn cell(&self, field: &str) -> String {
        match self.fields.get(field) {
            | None | Some(Value::Null) => String::new(),
            | Some(Value::String(s)) => s.clone(),
            | Some(Value::Bool(b)) => b.to_string(),
            | Some(Value::Number(n)) => n.to_string(),
            | Some(v) => v.to_string(),
        }
    }
}

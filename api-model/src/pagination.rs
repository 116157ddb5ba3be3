use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{Entity, ListQuery};

/// The body every endpoint answers with: `{success, data?, message?}`. List
/// endpoints may also report `totalPages`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub total_pages: Option<u32>,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub data: Vec<Entity>,
    /// Only present when the backend reports it; most list endpoints don't.
    pub total_pages: Option<u32>,
}

impl ListPage {
    /// Whether a page after `query.page` is likely to exist. Without a
    /// reported page count, a full page is taken as a hint that more follow.
    pub fn has_more(&self, query: &ListQuery) -> bool {
        match self.total_pages {
            | Some(total) => query.page < total,
            | None => self.data.len() >= query.limit as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_envelope_parsing() -> Result<()> {
        let raw = json!({
            "success": true,
            "data": [{"_id": "1", "name": "Everest Trek", "isPopular": false}],
        });
        let envelope: Envelope<Vec<Entity>> = serde_json::from_value(raw)?;
        assert!(envelope.success);
        assert_eq!(1, envelope.data.unwrap().len());
        assert_eq!(None, envelope.total_pages);

        let raw = json!({"success": false, "message": "not allowed"});
        let envelope: Envelope<Vec<Entity>> = serde_json::from_value(raw)?;
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(Some("not allowed".to_owned()), envelope.message);

        let raw = json!({"success": true, "data": [], "totalPages": 4});
        let envelope: Envelope<Vec<Entity>> = serde_json::from_value(raw)?;
        assert_eq!(Some(4), envelope.total_pages);
        Ok(())
    }

    #[test]
    fn test_has_more() {
        let query = ListQuery {
            page: 2,
            limit: 2,
            ..Default::default()
        };
        let full = ListPage {
            data: vec![Entity::new("1"), Entity::new("2")],
            total_pages: None,
        };
        assert!(full.has_more(&query));

        let short = ListPage {
            data: vec![Entity::new("1")],
            total_pages: None,
        };
        assert!(!short.has_more(&query));

        // a reported page count wins over the heuristic
        let last = ListPage {
            total_pages: Some(2),
            ..full
        };
        assert!(!last.has_more(&query));
    }
}

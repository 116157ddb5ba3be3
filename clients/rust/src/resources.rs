//! REST operations shared by every resource. Paths come from the resource's
//! [`ResourceSpec`], so the same functions serve treks, blogs, bookings and
//! the rest.

use std::path::PathBuf;

use basecamp_api_model::{Entity, EntityId, ListPage, ListQuery, ResourceSpec};
use http::Method;
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

use crate::client::RequestRunner;
use crate::{Error, Response, Result};

/// Retrieve one page of a resource.
pub async fn list(
    client: &impl RequestRunner,
    spec: &ResourceSpec,
    query: &ListQuery,
) -> Result<Response<Vec<Entity>>> {
    query.validate()?;
    let mut path = client.make_url(&spec.list_path())?;
    path.query_pairs_mut().extend_pairs(query.query_pairs());

    client.run(Method::GET, path).await
}

/// Retrieve a page and fold the reported page count into a [`ListPage`].
pub async fn list_page(
    client: &impl RequestRunner,
    spec: &ResourceSpec,
    query: &ListQuery,
) -> Result<ListPage> {
    let response = list(client, spec, query).await?;
    let total_pages = response.total_pages();
    let data = response.into_inner()?;
    Ok(ListPage { data, total_pages })
}

/// Retrieve a single entity by id.
pub async fn get(
    client: &impl RequestRunner,
    spec: &ResourceSpec,
    id: &EntityId,
) -> Result<Response<Entity>> {
    let path = client.make_url(&spec.detail_path(id))?;
    client.run(Method::GET, path).await
}

/// Set one boolean field of an entity, leaving every other field alone.
pub async fn set_flag(
    client: &impl RequestRunner,
    spec: &ResourceSpec,
    id: &EntityId,
    field: &str,
    value: bool,
) -> Result<Response<()>> {
    let path = client.make_url(&spec.visibility_path(id))?;
    let mut body = Map::new();
    body.insert(field.to_owned(), Value::Bool(value));

    client
        .run_with_body(Method::PATCH, path, Value::Object(body))
        .await
}

/// Permanently delete an entity.
pub async fn delete(
    client: &impl RequestRunner,
    spec: &ResourceSpec,
    id: &EntityId,
) -> Result<Response<()>> {
    let path = client.make_url(&spec.delete_path(id))?;
    client.run(Method::DELETE, path).await
}

/// Create an entity from a form submission. Some endpoints echo the created
/// entity back, others only acknowledge.
pub async fn create(
    client: &impl RequestRunner,
    spec: &ResourceSpec,
    body: FormBody,
) -> Result<Response<Option<Entity>>> {
    let path = client.make_url(&spec.create_path())?;
    let form = body.into_form().await?;
    client.run_with_form(Method::POST, path, form).await
}

/// Replace an entity's fields from a form submission.
pub async fn update(
    client: &impl RequestRunner,
    spec: &ResourceSpec,
    id: &EntityId,
    body: FormBody,
) -> Result<Response<Option<Entity>>> {
    let path = client.make_url(&spec.update_path(id))?;
    let form = body.into_form().await?;
    client.run_with_form(Method::PUT, path, form).await
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub field: String,
    pub path: PathBuf,
}

/// Payload of a create/update submission: plain fields plus file
/// attachments, sent as `multipart/form-data`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormBody {
    pub fields: Map<String, Value>,
    pub attachments: Vec<Attachment>,
}

impl FormBody {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            attachments: Vec::new(),
        }
    }

    pub fn attach(mut self, field: impl Into<String>, path: PathBuf) -> Self {
        self.attachments.push(Attachment {
            field: field.into(),
            path,
        });
        self
    }

    /// Text parts of the form. Nested arrays and objects (FAQs, itinerary
    /// days, highlights) travel as JSON strings; nulls are dropped.
    pub fn text_parts(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter_map(|(k, v)| {
                let text = match v {
                    | Value::Null => return None,
                    | Value::String(s) => s.clone(),
                    | Value::Bool(b) => b.to_string(),
                    | Value::Number(n) => n.to_string(),
                    | v @ (Value::Array(_) | Value::Object(_)) => v.to_string(),
                };
                Some((k.clone(), text))
            })
            .collect()
    }

    async fn into_form(self) -> Result<Form> {
        let mut form = Form::new();
        for (k, v) in self.text_parts() {
            form = form.text(k, v);
        }
        for attachment in self.attachments {
            let bytes =
                tokio::fs::read(&attachment.path).await.map_err(|source| {
                    Error::Io {
                        path: attachment.path.display().to_string(),
                        source,
                    }
                })?;
            let file_name = attachment
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| attachment.field.clone());
            form = form
                .part(attachment.field, Part::bytes(bytes).file_name(file_name));
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_text_parts_stringify_nested_values() {
        let fields = json!({
            "name": "Annapurna Circuit",
            "duration": 14,
            "isPopular": true,
            "faq": [{"q": "Permits?", "a": "Included"}],
            "itinerary": {"day1": "Kathmandu"},
            "notes": null,
        });
        let Value::Object(fields) = fields else {
            unreachable!()
        };
        let parts = FormBody::new(fields).text_parts();

        let get = |k: &str| {
            parts
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(Some("Annapurna Circuit"), get("name"));
        assert_eq!(Some("14"), get("duration"));
        assert_eq!(Some("true"), get("isPopular"));
        assert_eq!(Some(r#"[{"a":"Included","q":"Permits?"}]"#), get("faq"));
        assert_eq!(Some(r#"{"day1":"Kathmandu"}"#), get("itinerary"));
        assert_eq!(None, get("notes"));
    }

    #[tokio::test]
    async fn test_missing_attachment_is_reported() {
        let body = FormBody::default()
            .attach("coverImage", PathBuf::from("/definitely/not/here.jpg"));
        let err = body.into_form().await.unwrap_err();
        match err {
            | Error::Io { path, .. } => {
                assert_eq!("/definitely/not/here.jpg", path)
            }
            | e => panic!("unexpected error: {e}"),
        }
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use basecamp_api_model::{Entity, ResourceKind};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// On-disk form of a session, written by whatever performed the login.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SessionFile {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub admin: Option<AdminProfile>,
}

#[derive(Default)]
struct SessionInner {
    admin: Option<AdminProfile>,
    token: Option<String>,
    pending: BTreeMap<ResourceKind, usize>,
}

/// Shared state of one signed-in admin session.
///
/// Cloning hands out another handle to the same session. Components that
/// need the admin profile or the pending-count badges get one of these
/// passed in explicitly.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionInner>>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        f.debug_struct("SessionStore")
            .field("admin", &inner.admin)
            .field("token", &inner.token.as_ref().map(|_| "<redacted>"))
            .field("pending", &inner.pending)
            .finish()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(file: SessionFile) -> Self {
        let store = Self::new();
        {
            let mut inner = store.write();
            inner.admin = file.admin;
            inner.token = file.token;
        }
        store
    }

    /// Reads a session file. A missing file is an empty session.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = match tokio::fs::read(path).await {
            | Ok(raw) => raw,
            | Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "No session file at {}, starting signed out",
                    path.display()
                );
                return Ok(Self::new());
            }
            | Err(source) => {
                return Err(Error::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        let file: SessionFile = serde_json::from_slice(&raw)?;
        Ok(Self::from_file(file))
    }

    pub fn set_admin(&self, admin: Option<AdminProfile>) {
        self.write().admin = admin;
    }

    pub fn admin(&self) -> Option<AdminProfile> {
        self.read().admin.clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        self.write().token = token;
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn set_pending(&self, kind: ResourceKind, count: usize) {
        self.write().pending.insert(kind, count);
    }

    /// Recounts the badge for `kind` from freshly fetched rows.
    pub fn record_pending(&self, kind: ResourceKind, rows: &[Entity]) {
        let count = rows
            .iter()
            .filter(|row| {
                row.status()
                    .is_some_and(|s| s.eq_ignore_ascii_case("pending"))
            })
            .count();
        self.set_pending(kind, count);
    }

    pub fn pending(&self, kind: ResourceKind) -> usize {
        self.read().pending.get(&kind).copied().unwrap_or(0)
    }

    /// Non-zero badges, in resource order.
    pub fn badges(&self) -> Vec<(ResourceKind, usize)> {
        self.read()
            .pending
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(kind, count)| (*kind, *count))
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_share_state() {
        let session = SessionStore::new();
        let other = session.clone();
        other.set_admin(Some(AdminProfile {
            name: "Asha".to_owned(),
            email: "asha@example.com".to_owned(),
            role: None,
        }));
        other.set_token(Some("sekret".to_owned()));
        assert_eq!(Some("Asha"), session.admin().as_ref().map(|a| a.name.as_str()));
        assert_eq!(Some("sekret".to_owned()), session.token());
        assert!(!format!("{session:?}").contains("sekret"));
    }

    #[test]
    fn test_pending_badges() {
        let session = SessionStore::new();
        assert_eq!(0, session.pending(ResourceKind::Booking));

        session.record_pending(
            ResourceKind::Booking,
            &[
                Entity::new("1").with("status", "pending"),
                Entity::new("2").with("status", "Pending"),
                Entity::new("3").with("status", "confirmed"),
                Entity::new("4"),
            ],
        );
        session.record_pending(ResourceKind::Trek, &[Entity::new("t")]);
        assert_eq!(2, session.pending(ResourceKind::Booking));
        assert_eq!(vec![(ResourceKind::Booking, 2)], session.badges());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join("basecamp-no-such-session.json");
        let session = SessionStore::load(&path).await?;
        assert_eq!(None, session.token());
        assert_eq!(None, session.admin());
        Ok(())
    }

    #[tokio::test]
    async fn test_load_session_file() -> anyhow::Result<()> {
        let path = std::env::temp_dir()
            .join(format!("basecamp-session-{}.json", std::process::id()));
        tokio::fs::write(
            &path,
            r#"{"token":"abc","admin":{"name":"Asha","email":"a@b.c"}}"#,
        )
        .await?;
        let session = SessionStore::load(&path).await;
        tokio::fs::remove_file(&path).await?;
        let session = session?;
        assert_eq!(Some("abc".to_owned()), session.token());
        assert_eq!(Some("a@b.c".to_owned()), session.admin().map(|a| a.email));
        Ok(())
    }
}

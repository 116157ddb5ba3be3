use derive_more::{Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Backend-assigned identifier of an entity. Opaque and immutable; the admin
/// never mints one itself.
#[derive(
    Debug,
    From,
    Into,
    Display,
    Clone,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deref,
)]
pub struct EntityId(String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

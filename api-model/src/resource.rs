//! Registry of the resources the back-office manages.
//!
//! Every resource is listed, filtered, toggled and deleted the same way; what
//! differs is only the REST sub-path, the endpoint names, which columns are
//! worth showing, which categorical filters exist and which boolean fields
//! may be flipped. All of that is data, collected here in one
//! [`ResourceSpec`] per [`ResourceKind`].

use serde::{Deserialize, Serialize};

use crate::{EntityId, QueryError, SortKey};

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Trek,
    Tour,
    Wellness,
    Activity,
    Blog,
    Booking,
    TripRequest,
    User,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", serde_variant::to_variant_name(self).unwrap())
    }
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Trek,
        ResourceKind::Tour,
        ResourceKind::Wellness,
        ResourceKind::Activity,
        ResourceKind::Blog,
        ResourceKind::Booking,
        ResourceKind::TripRequest,
        ResourceKind::User,
    ];

    pub fn spec(self) -> &'static ResourceSpec {
        match self {
            | ResourceKind::Trek => &TREKS,
            | ResourceKind::Tour => &TOURS,
            | ResourceKind::Wellness => &WELLNESS,
            | ResourceKind::Activity => &ACTIVITIES,
            | ResourceKind::Blog => &BLOGS,
            | ResourceKind::Booking => &BOOKINGS,
            | ResourceKind::TripRequest => &TRIP_REQUESTS,
            | ResourceKind::User => &USERS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    /// Rendered as a colored badge, see [`crate::StatusTone`].
    Status,
    /// A boolean switch that can be flipped in place.
    Toggle,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub field: &'static str,
    pub kind: ColumnKind,
}

const fn text(header: &'static str, field: &'static str) -> Column {
    Column {
        header,
        field,
        kind: ColumnKind::Text,
    }
}

const fn status(header: &'static str, field: &'static str) -> Column {
    Column {
        header,
        field,
        kind: ColumnKind::Status,
    }
}

const fn toggle(header: &'static str, field: &'static str) -> Column {
    Column {
        header,
        field,
        kind: ColumnKind::Toggle,
    }
}

const fn date(header: &'static str, field: &'static str) -> Column {
    Column {
        header,
        field,
        kind: ColumnKind::Date,
    }
}

/// A categorical filter and the values the backend accepts for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub key: &'static str,
    pub options: &'static [&'static str],
}

/// Endpoint names under a resource's sub-path. An empty name means the
/// resource path itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub list: &'static str,
    pub detail: &'static str,
    pub create: &'static str,
    pub update: &'static str,
    pub visibility: &'static str,
    pub delete: &'static str,
}

impl Endpoints {
    pub const STANDARD: Endpoints = Endpoints {
        list: "all",
        detail: "",
        create: "create",
        update: "update",
        visibility: "visibility",
        delete: "delete",
    };
}

#[derive(Debug, PartialEq, Eq)]
pub struct ResourceSpec {
    pub kind: ResourceKind,
    /// Plural label, used in headings and empty-state messages.
    pub title: &'static str,
    pub path: &'static str,
    pub endpoints: Endpoints,
    pub columns: &'static [Column],
    pub filters: &'static [FilterSpec],
    pub toggles: &'static [&'static str],
    pub default_sort: &'static str,
    /// Detail/edit route. `{id}` is substituted with the entity id and
    /// `{slug}` with the entity's slug (falling back to the id).
    pub detail_route: &'static str,
}

impl ResourceSpec {
    fn endpoint(&self, name: &str, id: Option<&EntityId>) -> String {
        let mut path = self.path.to_owned();
        if !name.is_empty() {
            path.push('/');
            path.push_str(name);
        }
        if let Some(id) = id {
            path.push('/');
            path.push_str(id.as_str());
        }
        path
    }

    pub fn list_path(&self) -> String {
        self.endpoint(self.endpoints.list, None)
    }

    pub fn detail_path(&self, id: &EntityId) -> String {
        self.endpoint(self.endpoints.detail, Some(id))
    }

    pub fn create_path(&self) -> String {
        self.endpoint(self.endpoints.create, None)
    }

    pub fn update_path(&self, id: &EntityId) -> String {
        self.endpoint(self.endpoints.update, Some(id))
    }

    pub fn visibility_path(&self, id: &EntityId) -> String {
        self.endpoint(self.endpoints.visibility, Some(id))
    }

    pub fn delete_path(&self, id: &EntityId) -> String {
        self.endpoint(self.endpoints.delete, Some(id))
    }

    pub fn detail_route(&self, id: &EntityId, slug: Option<&str>) -> String {
        self.detail_route
            .replace("{id}", id.as_str())
            .replace("{slug}", slug.unwrap_or(id.as_str()))
    }

    pub fn default_sort(&self) -> Option<SortKey> {
        self.default_sort.parse().ok()
    }

    pub fn is_toggle_field(&self, field: &str) -> bool {
        self.toggles.contains(&field)
    }

    pub fn filter(&self, key: &str) -> Option<&FilterSpec> {
        self.filters.iter().find(|f| f.key == key)
    }

    /// Checks a filter against the schema. Option matching ignores case and
    /// returns the canonical spelling.
    pub fn validate_filter(
        &self,
        key: &str,
        value: &str,
    ) -> Result<&'static str, QueryError> {
        let filter = self
            .filter(key)
            .ok_or_else(|| QueryError::UnknownFilter(key.to_owned()))?;
        filter
            .options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(value.trim()))
            .copied()
            .ok_or_else(|| QueryError::InvalidFilterOption {
                key: key.to_owned(),
                value: value.to_owned(),
                options: filter.options.join(", "),
            })
    }
}

const ADVENTURE_DIFFICULTY: FilterSpec = FilterSpec {
    key: "difficulty",
    options: &["easy", "moderate", "difficult", "extreme"],
};

const ACTIVE_STATE: FilterSpec = FilterSpec {
    key: "state",
    options: &["active", "inactive"],
};

pub static TREKS: ResourceSpec = ResourceSpec {
    kind: ResourceKind::Trek,
    title: "Treks",
    path: "trek",
    endpoints: Endpoints::STANDARD,
    columns: &[
        text("Name", "name"),
        text("Region", "region"),
        text("Difficulty", "difficulty"),
        text("Days", "duration"),
        toggle("Popular", "isPopular"),
        toggle("Active", "isActive"),
        date("Created", "createdAt"),
    ],
    filters: &[ADVENTURE_DIFFICULTY, ACTIVE_STATE],
    toggles: &["isPopular", "isActive", "isFeatured"],
    default_sort: "-createdAt",
    detail_route: "/treks/edit/{id}",
};

pub static TOURS: ResourceSpec = ResourceSpec {
    kind: ResourceKind::Tour,
    title: "Tours",
    path: "tour",
    endpoints: Endpoints::STANDARD,
    columns: &[
        text("Name", "name"),
        text("Category", "category"),
        text("Country", "country"),
        toggle("Popular", "isPopular"),
        toggle("Active", "isActive"),
        date("Created", "createdAt"),
    ],
    filters: &[
        FilterSpec {
            key: "category",
            options: &["cultural", "wildlife", "adventure", "pilgrimage"],
        },
        ACTIVE_STATE,
    ],
    toggles: &["isPopular", "isActive"],
    default_sort: "-createdAt",
    detail_route: "/tours/edit/{id}",
};

pub static WELLNESS: ResourceSpec = ResourceSpec {
    kind: ResourceKind::Wellness,
    title: "Wellness Packages",
    path: "wellness",
    endpoints: Endpoints::STANDARD,
    columns: &[
        text("Name", "name"),
        text("Location", "location"),
        toggle("Active", "isActive"),
        date("Created", "createdAt"),
    ],
    filters: &[ACTIVE_STATE],
    toggles: &["isActive", "isPopular"],
    default_sort: "-createdAt",
    detail_route: "/wellness/edit/{id}",
};

pub static ACTIVITIES: ResourceSpec = ResourceSpec {
    kind: ResourceKind::Activity,
    title: "Activities",
    path: "activity",
    endpoints: Endpoints::STANDARD,
    columns: &[
        text("Name", "name"),
        text("Type", "activityType"),
        toggle("Popular", "isPopular"),
        toggle("Active", "isActive"),
        date("Created", "createdAt"),
    ],
    filters: &[
        FilterSpec {
            key: "activityType",
            options: &["rafting", "paragliding", "bungee", "climbing"],
        },
        ACTIVE_STATE,
    ],
    toggles: &["isPopular", "isActive"],
    default_sort: "-createdAt",
    detail_route: "/activities/edit/{id}",
};

pub static BLOGS: ResourceSpec = ResourceSpec {
    kind: ResourceKind::Blog,
    title: "Blogs",
    path: "blog",
    endpoints: Endpoints::STANDARD,
    columns: &[
        text("Title", "title"),
        text("Author", "author"),
        status("Status", "status"),
        toggle("Featured", "isFeatured"),
        date("Created", "createdAt"),
    ],
    filters: &[FilterSpec {
        key: "status",
        options: &["published", "draft"],
    }],
    toggles: &["isFeatured"],
    default_sort: "-createdAt",
    detail_route: "/blogs/edit/{slug}",
};

pub static BOOKINGS: ResourceSpec = ResourceSpec {
    kind: ResourceKind::Booking,
    title: "Bookings",
    path: "booking",
    endpoints: Endpoints {
        visibility: "status",
        ..Endpoints::STANDARD
    },
    columns: &[
        text("Customer", "fullName"),
        text("Adventure", "adventureName"),
        text("Type", "adventureType"),
        text("Guests", "guests"),
        status("Status", "status"),
        date("Created", "createdAt"),
    ],
    filters: &[
        FilterSpec {
            key: "status",
            options: &["pending", "confirmed", "cancelled", "completed"],
        },
        FilterSpec {
            key: "adventureType",
            options: &["trek", "tour", "activity", "wellness"],
        },
    ],
    toggles: &["isPaid"],
    default_sort: "-createdAt",
    detail_route: "/bookings/{id}",
};

pub static TRIP_REQUESTS: ResourceSpec = ResourceSpec {
    kind: ResourceKind::TripRequest,
    title: "Trip Requests",
    path: "trip-plan",
    endpoints: Endpoints::STANDARD,
    columns: &[
        text("Name", "fullName"),
        text("Email", "email"),
        text("Destination", "destination"),
        status("Status", "status"),
        toggle("Contacted", "isContacted"),
        date("Created", "createdAt"),
    ],
    filters: &[FilterSpec {
        key: "status",
        options: &["pending", "contacted", "closed"],
    }],
    toggles: &["isContacted"],
    default_sort: "-createdAt",
    detail_route: "/trip-requests/{id}",
};

pub static USERS: ResourceSpec = ResourceSpec {
    kind: ResourceKind::User,
    title: "Users",
    path: "user",
    endpoints: Endpoints {
        list: "list",
        delete: "remove",
        ..Endpoints::STANDARD
    },
    columns: &[
        text("Name", "fullName"),
        text("Email", "email"),
        text("Role", "role"),
        toggle("Active", "isActive"),
        date("Joined", "createdAt"),
    ],
    filters: &[FilterSpec {
        key: "role",
        options: &["admin", "editor", "customer"],
    }],
    toggles: &["isActive"],
    default_sort: "-createdAt",
    detail_route: "/users/{id}",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_maps_to_its_spec() {
        for kind in ResourceKind::ALL {
            let spec = kind.spec();
            assert_eq!(kind, spec.kind);
            assert!(spec.default_sort().is_some());
            // toggle columns must be flippable
            for column in spec.columns {
                if column.kind == ColumnKind::Toggle {
                    assert!(
                        spec.is_toggle_field(column.field),
                        "{kind}: {} is not a toggle field",
                        column.field
                    );
                }
            }
        }
    }

    #[test]
    fn test_endpoint_paths() {
        let id = EntityId::from("42");
        assert_eq!("trek/all", TREKS.list_path());
        assert_eq!("trek/42", TREKS.detail_path(&id));
        assert_eq!("trek/visibility/42", TREKS.visibility_path(&id));
        assert_eq!("trek/delete/42", TREKS.delete_path(&id));
        assert_eq!("trek/update/42", TREKS.update_path(&id));
        assert_eq!("trek/create", TREKS.create_path());

        assert_eq!("user/list", USERS.list_path());
        assert_eq!("user/remove/42", USERS.delete_path(&id));
        assert_eq!("booking/status/42", BOOKINGS.visibility_path(&id));
    }

    #[test]
    fn test_detail_route() {
        let id = EntityId::from("abc");
        assert_eq!("/treks/edit/abc", TREKS.detail_route(&id, None));
        assert_eq!(
            "/blogs/edit/monsoon-hikes",
            BLOGS.detail_route(&id, Some("monsoon-hikes"))
        );
        assert_eq!("/blogs/edit/abc", BLOGS.detail_route(&id, None));
    }

    #[test]
    fn test_validate_filter() {
        assert_eq!(Ok("pending"), BOOKINGS.validate_filter("status", "Pending"));
        assert_eq!(
            Err(QueryError::UnknownFilter("colour".to_owned())),
            BOOKINGS.validate_filter("colour", "red")
        );
        let err = BOOKINGS.validate_filter("status", "lost").unwrap_err();
        assert!(matches!(err, QueryError::InvalidFilterOption { .. }));
        assert!(err.to_string().contains("pending, confirmed"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!("trip-request", ResourceKind::TripRequest.to_string());
        assert_eq!("trek", ResourceKind::Trek.to_string());
    }
}

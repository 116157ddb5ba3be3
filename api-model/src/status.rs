use serde::{Deserialize, Serialize};

/// Badge color of a status value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Green,
    Orange,
    Red,
    Gray,
}

impl std::fmt::Display for StatusTone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", serde_variant::to_variant_name(self).unwrap())
    }
}

impl StatusTone {
    /// Deterministic lookup used for every status-like field. Unknown values
    /// render green.
    pub fn of(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            | "pending" => StatusTone::Orange,
            | "cancelled" | "canceled" | "rejected" | "failed" => {
                StatusTone::Red
            }
            | "inactive" | "draft" => StatusTone::Gray,
            | _ => StatusTone::Green,
        }
    }
}

/// Status labels arrive in whatever casing the backend stored; the admin
/// shows them capitalized.
pub fn status_label(status: &str) -> String {
    let mut chars = status.trim().chars();
    match chars.next() {
        | Some(first) => {
            first.to_uppercase().collect::<String>()
                + &chars.as_str().to_lowercase()
        }
        | None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_lookup() {
        assert_eq!(StatusTone::Orange, StatusTone::of("pending"));
        assert_eq!(StatusTone::Orange, StatusTone::of("PENDING"));
        assert_eq!(StatusTone::Red, StatusTone::of("cancelled"));
        assert_eq!(StatusTone::Gray, StatusTone::of("draft"));
        assert_eq!(StatusTone::Green, StatusTone::of("confirmed"));
        assert_eq!(StatusTone::Green, StatusTone::of("anything-else"));
        assert_eq!("orange", StatusTone::Orange.to_string());
    }

    #[test]
    fn test_status_label() {
        assert_eq!("Pending", status_label("pending"));
        assert_eq!("Confirmed", status_label("CONFIRMED"));
        assert_eq!("", status_label(""));
    }
}

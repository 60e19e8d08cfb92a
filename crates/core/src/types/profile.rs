//! User profile rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;

/// A row of the `profiles` table.
///
/// The id references the auth principal; the backend enforces that users can
/// only read and write their own row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// An empty profile for a user who has never saved one.
    #[must_use]
    pub const fn blank(id: UserId) -> Self {
        Self {
            id,
            full_name: None,
            avatar_url: None,
            updated_at: None,
        }
    }
}

/// Payload of an insert-or-update on `profiles`, keyed by `id`.
///
/// `None` fields are written as `null`, matching what the edit form holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpsert {
    pub id: UserId,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_upsert_serializes_all_columns() {
        let id = UserId::new(Uuid::nil());
        let upsert = ProfileUpsert {
            id,
            full_name: Some("Ada".to_string()),
            avatar_url: None,
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        };
        let value = serde_json::to_value(&upsert).unwrap();
        assert_eq!(value["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(value["full_name"], "Ada");
        assert!(value["avatar_url"].is_null());
        assert_eq!(value["updated_at"], "2024-03-01T12:00:00Z");
    }

    #[test]
    fn test_profile_tolerates_missing_columns() {
        let json = r#"{"id": "00000000-0000-0000-0000-000000000000"}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile, Profile::blank(UserId::new(Uuid::nil())));
    }
}

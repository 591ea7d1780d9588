//! Person domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use taskboard_core::{ChildId, PersonId};

/// A person's postal address sub-record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street address line.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or province.
    pub state_or_province: Option<String>,
}

/// A child sub-record attached to a person.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    /// Unique child ID.
    pub id: ChildId,
    /// Child's name.
    pub name: String,
    /// Child's date of birth, when known.
    pub date_of_birth: Option<NaiveDate>,
}

/// A person record with audit stamps.
///
/// `created_*` fields are stamped at creation; `last_modified_*` fields are
/// restamped on every successful update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Unique person ID.
    pub id: PersonId,
    /// Person's full name.
    pub full_name: String,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// Postal address sub-record.
    pub address: Address,
    /// Child sub-records.
    pub children: Vec<Child>,
    /// Username of the caller who created the record.
    pub created_by_user: String,
    /// When the record was created.
    pub created_date: DateTime<Utc>,
    /// Username of the caller who last updated the record.
    pub last_modified_by_user: Option<String>,
    /// When the record was last updated.
    pub last_modified_date: Option<DateTime<Utc>>,
}

/// Request body for a child sub-record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildPayload {
    /// Child's name.
    pub name: String,
    /// Child's date of birth, when known.
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

/// Request body for creating or updating a person.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPayload {
    /// Optional explicit id; present when a create is really an update.
    #[serde(default)]
    pub id: Option<PersonId>,
    /// Person's full name.
    pub full_name: String,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// Postal address sub-record.
    #[serde(default)]
    pub address: Address,
    /// Child sub-records; replaces the stored set on update.
    #[serde(default)]
    pub children: Vec<ChildPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_serializes_with_frontend_field_names() {
        let person = Person {
            id: PersonId::generate(),
            full_name: "Ada Lovelace".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1815, 12, 10).expect("valid date"),
            address: Address {
                address: Some("12 St James Square".to_string()),
                city: Some("London".to_string()),
                state_or_province: None,
            },
            children: vec![],
            created_by_user: "admin".to_string(),
            created_date: Utc::now(),
            last_modified_by_user: None,
            last_modified_date: None,
        };

        let json = serde_json::to_value(&person).expect("serialize");
        assert_eq!(json["fullName"], "Ada Lovelace");
        assert_eq!(json["address"]["city"], "London");
        assert!(json["address"]["stateOrProvince"].is_null());
        assert_eq!(json["dateOfBirth"], "1815-12-10");
    }

    #[test]
    fn test_payload_defaults() {
        let payload: PersonPayload = serde_json::from_str(
            r#"{"fullName": "Grace Hopper", "dateOfBirth": "1906-12-09"}"#,
        )
        .expect("deserialize");
        assert!(payload.id.is_none());
        assert!(payload.children.is_empty());
        assert!(payload.address.city.is_none());
    }
}

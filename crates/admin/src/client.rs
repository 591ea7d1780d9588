//! Typed HTTP client for the task service API.
//!
//! Every call forwards the session's bearer token; the API remains the
//! enforcement point for roles and ownership. A 401 from the API is
//! surfaced as its own error variant so handlers can clear the session
//! and send the user back to the login page.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use taskboard_core::{ChildId, Page, PersonId};

/// Errors from task service API calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API rejected the session's token.
    #[error("token rejected by the task service")]
    Unauthorized,

    /// The caller lacks an authority the API requires.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested record does not exist.
    #[error("not found")]
    NotFound,

    /// Any other non-success API response.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A person record as returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub children: Vec<Child>,
    pub created_by_user: String,
    pub created_date: DateTime<Utc>,
    pub last_modified_by_user: Option<String>,
    pub last_modified_date: Option<DateTime<Utc>>,
}

/// A person's address sub-record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state_or_province: Option<String>,
}

/// A child sub-record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: ChildId,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
}

/// Request body for creating or updating a person.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonForm {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub address: AddressForm,
    pub children: Vec<ChildForm>,
}

/// Address fields of a [`PersonForm`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressForm {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state_or_province: Option<String>,
}

/// Child fields of a [`PersonForm`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildForm {
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
}

/// Client for the task service's people endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the people list URL for the given page and search text.
    fn people_url(&self, page: u32, page_size: u32, search: Option<&str>) -> String {
        let mut url = format!(
            "{}/api/people?page={page}&pageSize={page_size}",
            self.base_url
        );
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            url.push_str("&search=");
            url.push_str(&urlencode(search));
        }
        url
    }

    /// Fetch one page of people.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` if the token was rejected, or
    /// another `ClientError` for transport and API failures.
    pub async fn list_people(
        &self,
        token: &str,
        page: u32,
        page_size: u32,
        search: Option<&str>,
    ) -> Result<Page<Person>, ClientError> {
        let response = self
            .http
            .get(self.people_url(page, page_size, search))
            .bearer_auth(token)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Fetch a single person.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown id, or another
    /// `ClientError` for transport and API failures.
    pub async fn get_person(&self, token: &str, id: PersonId) -> Result<Person, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/people/{id}", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Create a person.
    ///
    /// # Errors
    ///
    /// Returns a `ClientError` for transport and API failures.
    pub async fn create_person(
        &self,
        token: &str,
        form: &PersonForm,
    ) -> Result<Person, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/people", self.base_url))
            .bearer_auth(token)
            .json(form)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Update a person.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown id, or another
    /// `ClientError` for transport and API failures.
    pub async fn update_person(
        &self,
        token: &str,
        id: PersonId,
        form: &PersonForm,
    ) -> Result<Person, ClientError> {
        let response = self
            .http
            .put(format!("{}/api/people/{id}", self.base_url))
            .bearer_auth(token)
            .json(form)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Delete a person.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown id, or another
    /// `ClientError` for transport and API failures.
    pub async fn delete_person(&self, token: &str, id: PersonId) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(format!("{}/api/people/{id}", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Probe the API with the given token.
    ///
    /// Used by the login flow to confirm a pasted token before a session
    /// is created.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` if the token was rejected, or
    /// another `ClientError` for transport and API failures.
    pub async fn probe(&self, token: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .get(self.people_url(1, 1, None))
            .bearer_auth(token)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}

/// Map non-success statuses onto `ClientError` variants.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        StatusCode::NOT_FOUND => ClientError::NotFound,
        other => ClientError::Api {
            status: other.as_u16(),
            message,
        },
    })
}

/// Percent-encode a query value.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            b' ' => out.push_str("%20"),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_people_url_without_search() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(
            client.people_url(1, 10, None),
            "http://localhost:8080/api/people?page=1&pageSize=10"
        );
    }

    #[test]
    fn test_people_url_with_search() {
        let client = ApiClient::new("http://localhost:8080");
        assert_eq!(
            client.people_url(2, 25, Some("Ada Lovelace")),
            "http://localhost:8080/api/people?page=2&pageSize=25&search=Ada%20Lovelace"
        );
    }

    #[test]
    fn test_people_url_ignores_blank_search() {
        let client = ApiClient::new("http://localhost:8080");
        assert_eq!(
            client.people_url(1, 10, Some("   ")),
            "http://localhost:8080/api/people?page=1&pageSize=10"
        );
    }

    #[test]
    fn test_urlencode_reserved_characters() {
        assert_eq!(urlencode("a&b=c"), "a%26b%3Dc");
    }

    #[test]
    fn test_person_deserializes_api_shape() {
        let person: Person = serde_json::from_str(
            r#"{
                "id": "7f9c24e5-2e18-4a1b-9d53-0f3b8a2c6d41",
                "fullName": "Ada Lovelace",
                "dateOfBirth": "1815-12-10",
                "address": {"address": null, "city": "London", "stateOrProvince": null},
                "children": [],
                "createdByUser": "admin",
                "createdDate": "2026-08-01T12:00:00Z",
                "lastModifiedByUser": null,
                "lastModifiedDate": null
            }"#,
        )
        .expect("deserialize");
        assert_eq!(person.full_name, "Ada Lovelace");
        assert_eq!(person.address.city.as_deref(), Some("London"));
    }
}

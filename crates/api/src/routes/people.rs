//! Person CRUD route handlers.
//!
//! The person list speaks the admin frontend's dialect: one-based `page`,
//! `pageSize`, and a free-text `search` over the full name.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use taskboard_core::{PageRequest, PersonId, SortDirection, authorities};

use super::{require_any_role, require_owner_or_admin};
use crate::auth::CurrentUser;
use crate::db::PersonRepository;
use crate::db::people::PersonFilter;
use crate::error::AppError;
use crate::models::{Person, PersonPayload};
use crate::state::AppState;

/// List query parameters, in the shape the admin frontend sends.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeopleListQuery {
    /// One-based page number.
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub search: Option<String>,
}

const fn default_page() -> u32 {
    1
}

const fn default_page_size() -> u32 {
    taskboard_core::page::DEFAULT_PAGE_SIZE
}

impl PeopleListQuery {
    /// Normalize the one-based `page` into the zero-based [`PageRequest`].
    fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page.saturating_sub(1), self.page_size, SortDirection::Desc)
    }
}

/// `GET /api/people/{id}`
#[instrument(skip(state, user))]
pub async fn find_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<PersonId>,
) -> Result<Json<Person>, AppError> {
    require_any_role(&user, &[authorities::PERSON_READ, authorities::PERSON_SAVE])?;

    let person = PersonRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("person {id}")))?;

    require_owner_or_admin(&user, &person.created_by_user)?;

    Ok(Json(person))
}

/// `GET /api/people`
#[instrument(skip(state, user))]
pub async fn find_all(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PeopleListQuery>,
) -> Result<Json<taskboard_core::Page<Person>>, AppError> {
    require_any_role(
        &user,
        &[
            authorities::PERSON_READ,
            authorities::PERSON_SAVE,
            authorities::PERSON_DELETE,
            authorities::PERSON_CREATE,
        ],
    )?;

    let request = query.page_request();
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string);

    let filter = if user.is_admin() {
        PersonFilter {
            owner: None,
            name_contains: search,
        }
    } else {
        PersonFilter {
            owner: Some(user.username.clone()),
            name_contains: search,
        }
    };

    let page = PersonRepository::new(state.pool())
        .find_page(&filter, &request, &["created_date"])
        .await?;

    Ok(Json(page))
}

/// `POST /api/people`
///
/// Stamps the caller as owner. A body carrying an id is treated as an
/// update of that record.
#[instrument(skip(state, user, payload))]
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<PersonPayload>,
) -> Result<Response, AppError> {
    require_any_role(&user, &[authorities::PERSON_CREATE])?;

    validate(&payload)?;

    if let Some(id) = payload.id.filter(|id| !id.as_uuid().is_nil()) {
        let person = apply_update(&state, &user, id, &payload).await?;
        return Ok(Json(person).into_response());
    }

    let person = PersonRepository::new(state.pool())
        .create(&payload, &user.username)
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/people/{}", person.id))],
        Json(person),
    )
        .into_response())
}

/// `PUT /api/people/{id}`
#[instrument(skip(state, user, payload))]
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<PersonId>,
    Json(payload): Json<PersonPayload>,
) -> Result<Json<Person>, AppError> {
    require_any_role(&user, &[authorities::PERSON_SAVE])?;

    let person = apply_update(&state, &user, id, &payload).await?;
    Ok(Json(person))
}

/// Shared update path for PUT and for POST bodies that carry an id.
async fn apply_update(
    state: &AppState,
    user: &CurrentUser,
    id: PersonId,
    payload: &PersonPayload,
) -> Result<Person, AppError> {
    validate(payload)?;

    let repository = PersonRepository::new(state.pool());

    let existing = repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("person {id}")))?;

    require_owner_or_admin(user, &existing.created_by_user)?;

    Ok(repository.update(id, payload, &user.username).await?)
}

/// `DELETE /api/people/{id}`
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<PersonId>,
) -> Result<StatusCode, AppError> {
    require_any_role(&user, &[authorities::PERSON_DELETE])?;

    let repository = PersonRepository::new(state.pool());

    let person = repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("person {id}")))?;

    require_owner_or_admin(&user, &person.created_by_user)?;

    repository.delete(id).await?;
    Ok(StatusCode::OK)
}

fn validate(payload: &PersonPayload) -> Result<(), AppError> {
    if payload.full_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "person fullName must not be blank".to_string(),
        ));
    }
    if payload.children.iter().any(|c| c.name.trim().is_empty()) {
        return Err(AppError::BadRequest(
            "child name must not be blank".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, ChildPayload};
    use chrono::NaiveDate;

    fn payload() -> PersonPayload {
        PersonPayload {
            id: None,
            full_name: "Ada Lovelace".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1815, 12, 10).expect("valid date"),
            address: Address::default(),
            children: vec![],
        }
    }

    #[test]
    fn test_one_based_page_normalizes_to_zero_based() {
        let query = PeopleListQuery {
            page: 1,
            page_size: 10,
            search: None,
        };
        assert_eq!(query.page_request().page(), 0);

        let query = PeopleListQuery {
            page: 3,
            page_size: 10,
            search: None,
        };
        assert_eq!(query.page_request().page(), 2);
    }

    #[test]
    fn test_page_zero_is_treated_as_first_page() {
        // The frontend sends one-based pages, but a raw client can send 0.
        let query = PeopleListQuery {
            page: 0,
            page_size: 10,
            search: None,
        };
        assert_eq!(query.page_request().page(), 0);
    }

    #[test]
    fn test_validate_accepts_well_formed_payload() {
        assert!(validate(&payload()).is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_full_name() {
        let mut p = payload();
        p.full_name = "   ".to_string();
        assert!(validate(&p).is_err());
    }

    #[test]
    fn test_validate_rejects_blank_child_name() {
        let mut p = payload();
        p.children.push(ChildPayload {
            name: String::new(),
            date_of_birth: None,
        });
        assert!(validate(&p).is_err());
    }
}

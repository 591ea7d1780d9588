//! Task CRUD route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use taskboard_core::{PageRequest, SortDirection, TaskId, authorities};

use super::{require_any_role, require_owner_or_admin};
use crate::auth::CurrentUser;
use crate::db::TaskRepository;
use crate::db::tasks::TaskFilter;
use crate::error::AppError;
use crate::models::{Task, TaskPayload};
use crate::state::AppState;

/// List query parameters: zero-based `page`, `size`, `sort-dir`,
/// comma-separated `sort-idx`, and a `search` predicate.
#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(rename = "sort-dir", default)]
    pub sort_dir: Option<String>,
    #[serde(rename = "sort-idx", default)]
    pub sort_idx: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

const fn default_size() -> u32 {
    taskboard_core::page::DEFAULT_PAGE_SIZE
}

/// Map a requested sort field to its column.
///
/// Only whitelisted fields may reach the repository's ORDER BY clause;
/// anything else is a client error.
fn sort_column(field: &str) -> Option<&'static str> {
    match field {
        "createdDate" => Some("created_date"),
        "name" => Some("name"),
        _ => None,
    }
}

/// Resolve the comma-separated `sort-idx` parameter against the whitelist.
fn sort_columns(sort_idx: Option<&str>) -> Result<Vec<&'static str>, AppError> {
    let Some(raw) = sort_idx else {
        return Ok(vec!["created_date"]);
    };

    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|field| {
            sort_column(field)
                .ok_or_else(|| AppError::BadRequest(format!("unknown sort field: {field}")))
        })
        .collect()
}

/// Parse the `search` predicate parameter.
///
/// The grammar is `name:substring` (field name case-insensitive); bare text
/// is shorthand for a name search. `name` is the only bound field.
fn parse_search(search: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(raw) = search else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.split_once(':') {
        Some((field, value)) if field.eq_ignore_ascii_case("name") => {
            Ok(Some(value.to_string()))
        }
        Some((field, _)) => Err(AppError::BadRequest(format!(
            "unknown search field: {field}"
        ))),
        None => Ok(Some(raw.to_string())),
    }
}

fn sort_direction(sort_dir: Option<&str>) -> Result<SortDirection, AppError> {
    sort_dir
        .map_or(Ok(SortDirection::Desc), str::parse)
        .map_err(AppError::BadRequest)
}

/// `GET /api/tasks/{id}`
#[instrument(skip(state, user))]
pub async fn find_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, AppError> {
    require_any_role(&user, &[authorities::TASK_READ, authorities::TASK_SAVE])?;

    let task = TaskRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("task {id}")))?;

    require_owner_or_admin(&user, &task.created_by_user)?;

    Ok(Json(task))
}

/// `GET /api/tasks`
///
/// Admins page through every task with the search predicate applied;
/// everyone else sees only their own rows and the predicate is ignored.
#[instrument(skip(state, user))]
pub async fn find_all(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<taskboard_core::Page<Task>>, AppError> {
    require_any_role(
        &user,
        &[
            authorities::TASK_READ,
            authorities::TASK_SAVE,
            authorities::TASK_DELETE,
            authorities::TASK_CREATE,
        ],
    )?;

    let direction = sort_direction(query.sort_dir.as_deref())?;
    let columns = sort_columns(query.sort_idx.as_deref())?;
    let request = PageRequest::new(query.page, query.size, direction);

    let filter = if user.is_admin() {
        TaskFilter {
            owner: None,
            name_contains: parse_search(query.search.as_deref())?,
        }
    } else {
        TaskFilter {
            owner: Some(user.username.clone()),
            name_contains: None,
        }
    };

    let page = TaskRepository::new(state.pool())
        .find_page(&filter, &request, &columns)
        .await?;

    Ok(Json(page))
}

/// `POST /api/tasks`
///
/// Stamps the caller as owner. A body carrying an id is treated as an
/// update of that record.
#[instrument(skip(state, user, payload))]
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<TaskPayload>,
) -> Result<Response, AppError> {
    require_any_role(&user, &[authorities::TASK_CREATE])?;

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("task name must not be blank".to_string()));
    }

    if let Some(id) = payload.id.filter(|id| !id.as_uuid().is_nil()) {
        let task = apply_update(&state, &user, id, &payload).await?;
        return Ok(Json(task).into_response());
    }

    let task = TaskRepository::new(state.pool())
        .create(payload.name.trim(), &user.username)
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/tasks/{}", task.id))],
        Json(task),
    )
        .into_response())
}

/// `PUT /api/tasks/{id}`
#[instrument(skip(state, user, payload))]
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<TaskId>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<Task>, AppError> {
    require_any_role(&user, &[authorities::TASK_SAVE])?;

    let task = apply_update(&state, &user, id, &payload).await?;
    Ok(Json(task))
}

/// Shared update path for PUT and for POST bodies that carry an id.
///
/// The ownership check runs against the stored record, not the request
/// body, so `created_by_user` cannot be forged to hijack someone else's row.
async fn apply_update(
    state: &AppState,
    user: &CurrentUser,
    id: TaskId,
    payload: &TaskPayload,
) -> Result<Task, AppError> {
    let repository = TaskRepository::new(state.pool());

    let existing = repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("task {id}")))?;

    require_owner_or_admin(user, &existing.created_by_user)?;

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("task name must not be blank".to_string()));
    }

    Ok(repository.update(id, payload.name.trim()).await?)
}

/// `DELETE /api/tasks/{id}`
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<TaskId>,
) -> Result<StatusCode, AppError> {
    require_any_role(&user, &[authorities::TASK_DELETE])?;

    let repository = TaskRepository::new(state.pool());

    let task = repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("task {id}")))?;

    require_owner_or_admin(&user, &task.created_by_user)?;

    repository.delete(id).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_columns_default_is_created_date() {
        assert_eq!(sort_columns(None).expect("default"), vec!["created_date"]);
    }

    #[test]
    fn test_sort_columns_maps_field_names() {
        assert_eq!(
            sort_columns(Some("createdDate,name")).expect("whitelisted"),
            vec!["created_date", "name"]
        );
    }

    #[test]
    fn test_sort_columns_rejects_unknown_field() {
        assert!(sort_columns(Some("createdDate,secret_col")).is_err());
    }

    #[test]
    fn test_parse_search_field_form() {
        assert_eq!(
            parse_search(Some("NAME:ar")).expect("parse"),
            Some("ar".to_string())
        );
        assert_eq!(
            parse_search(Some("name:Learn")).expect("parse"),
            Some("Learn".to_string())
        );
    }

    #[test]
    fn test_parse_search_bare_text() {
        assert_eq!(
            parse_search(Some("groceries")).expect("parse"),
            Some("groceries".to_string())
        );
    }

    #[test]
    fn test_parse_search_rejects_unknown_field() {
        assert!(parse_search(Some("createdByUser:bob")).is_err());
    }

    #[test]
    fn test_parse_search_empty_is_none() {
        assert_eq!(parse_search(None).expect("parse"), None);
        assert_eq!(parse_search(Some("  ")).expect("parse"), None);
    }

    #[test]
    fn test_sort_direction_default_is_desc() {
        assert_eq!(
            sort_direction(None).expect("default"),
            SortDirection::Desc
        );
        assert_eq!(
            sort_direction(Some("asc")).expect("parse"),
            SortDirection::Asc
        );
        assert!(sort_direction(Some("upward")).is_err());
    }
}

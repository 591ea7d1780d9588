//! Person list and form route handlers.
//!
//! The list page offers free-text search, one-based pagination, a children
//! modal per row, and Edit/Delete/Add buttons enabled only when the
//! session's authorities allow the matching API call to succeed.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use taskboard_core::{PersonId, authorities};

use crate::client::{AddressForm, Child, ChildForm, Person, PersonForm};
use crate::error::AdminError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Rows per list page.
const PAGE_SIZE: u32 = 10;

/// List page query parameters.
#[derive(Debug, Deserialize)]
pub struct PeopleQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub search: Option<String>,
}

const fn default_page() -> u32 {
    1
}

// =============================================================================
// View Types
// =============================================================================

/// Child view for the per-row modal.
#[derive(Debug, Clone)]
pub struct ChildView {
    pub name: String,
    pub date_of_birth: String,
}

impl From<&Child> for ChildView {
    fn from(child: &Child) -> Self {
        Self {
            name: child.name.clone(),
            date_of_birth: child
                .date_of_birth
                .map_or_else(String::new, |d| d.to_string()),
        }
    }
}

/// Person row view for the list template.
#[derive(Debug, Clone)]
pub struct PersonView {
    pub id: String,
    pub full_name: String,
    pub created_by_user: String,
    pub created_date: String,
    pub last_modified_by_user: String,
    pub last_modified_date: String,
    pub date_of_birth: String,
    pub location: String,
    pub children: Vec<ChildView>,
}

impl From<&Person> for PersonView {
    fn from(person: &Person) -> Self {
        let location = [
            person.address.address.as_deref(),
            person.address.city.as_deref(),
            person.address.state_or_province.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        Self {
            id: person.id.to_string(),
            full_name: person.full_name.clone(),
            created_by_user: person.created_by_user.clone(),
            created_date: person.created_date.format("%Y-%m-%d %H:%M").to_string(),
            last_modified_by_user: person.last_modified_by_user.clone().unwrap_or_default(),
            last_modified_date: person
                .last_modified_date
                .map_or_else(String::new, |d| d.format("%Y-%m-%d %H:%M").to_string()),
            date_of_birth: person.date_of_birth.to_string(),
            location,
            children: person.children.iter().map(ChildView::from).collect(),
        }
    }
}

/// Authority-gated button states for the current session.
#[derive(Debug, Clone, Copy)]
pub struct Access {
    pub can_create: bool,
    pub can_save: bool,
    pub can_delete: bool,
}

impl Access {
    fn for_user(user: &CurrentUser) -> Self {
        Self {
            can_create: user
                .authorities
                .any_role_or_openid(&[authorities::PERSON_CREATE]),
            can_save: user
                .authorities
                .any_role_or_openid(&[authorities::PERSON_SAVE]),
            can_delete: user
                .authorities
                .any_role_or_openid(&[authorities::PERSON_DELETE]),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// One pagination control entry.
#[derive(Debug, Clone)]
pub struct PageLink {
    pub number: u32,
    pub current: bool,
}

/// Person list page template.
#[derive(Template)]
#[template(path = "people/index.html")]
pub struct PeopleIndexTemplate {
    pub username: String,
    pub people: Vec<PersonView>,
    pub access: Access,
    pub search_query: String,
    pub total_pages: u32,
    pub total_elements: i64,
    pub pages: Vec<PageLink>,
}

/// Person create/edit form template.
#[derive(Template)]
#[template(path = "people/form.html")]
pub struct PersonFormTemplate {
    pub username: String,
    pub heading: String,
    pub action: String,
    pub full_name: String,
    pub date_of_birth: String,
    pub address: String,
    pub city: String,
    pub state_or_province: String,
    pub children_text: String,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /people`
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<PeopleQuery>,
) -> Result<Html<String>, AdminError> {
    let page = state
        .client()
        .list_people(&user.token, query.page, PAGE_SIZE, query.search.as_deref())
        .await?;

    let current_page = query.page;
    let template = PeopleIndexTemplate {
        username: user.username.clone(),
        people: page.content.iter().map(PersonView::from).collect(),
        access: Access::for_user(&user),
        search_query: query.search.unwrap_or_default(),
        total_pages: page.total_pages,
        total_elements: page.total_elements,
        pages: (1..=page.total_pages)
            .map(|number| PageLink {
                number,
                current: number == current_page,
            })
            .collect(),
    };

    Ok(render(&template))
}

/// `GET /people/new`
#[instrument(skip(user))]
pub async fn new_form(RequireAuth(user): RequireAuth) -> Html<String> {
    render(&PersonFormTemplate {
        username: user.username,
        heading: "Add Person".to_string(),
        action: "/people".to_string(),
        full_name: String::new(),
        date_of_birth: String::new(),
        address: String::new(),
        city: String::new(),
        state_or_province: String::new(),
        children_text: String::new(),
        error: None,
    })
}

/// `GET /people/{id}`
#[instrument(skip(state, user))]
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<PersonId>,
) -> Result<Html<String>, AdminError> {
    let person = state.client().get_person(&user.token, id).await?;

    Ok(render(&PersonFormTemplate {
        username: user.username,
        heading: "Edit Person".to_string(),
        action: format!("/people/{id}"),
        full_name: person.full_name,
        date_of_birth: person.date_of_birth.to_string(),
        address: person.address.address.unwrap_or_default(),
        city: person.address.city.unwrap_or_default(),
        state_or_province: person.address.state_or_province.unwrap_or_default(),
        children_text: format_children(&person.children),
        error: None,
    }))
}

/// Person form body.
#[derive(Debug, Deserialize)]
pub struct PersonFormData {
    pub full_name: String,
    pub date_of_birth: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state_or_province: String,
    #[serde(default)]
    pub children: String,
}

/// `POST /people`
#[instrument(skip(state, user, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<PersonFormData>,
) -> Result<Response, AdminError> {
    let person_form = match to_person_form(&form) {
        Ok(f) => f,
        Err(message) => {
            return Ok(render_form_error(&user, "Add Person", "/people", &form, message)
                .into_response());
        }
    };

    state.client().create_person(&user.token, &person_form).await?;
    Ok(Redirect::to("/people").into_response())
}

/// `POST /people/{id}`
#[instrument(skip(state, user, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<PersonId>,
    Form(form): Form<PersonFormData>,
) -> Result<Response, AdminError> {
    let action = format!("/people/{id}");
    let person_form = match to_person_form(&form) {
        Ok(f) => f,
        Err(message) => {
            return Ok(render_form_error(&user, "Edit Person", &action, &form, message)
                .into_response());
        }
    };

    state
        .client()
        .update_person(&user.token, id, &person_form)
        .await?;
    Ok(Redirect::to("/people").into_response())
}

/// `POST /people/{id}/delete`
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<PersonId>,
) -> Result<Redirect, AdminError> {
    state.client().delete_person(&user.token, id).await?;
    Ok(Redirect::to("/people"))
}

// =============================================================================
// Form Parsing
// =============================================================================

/// Turn submitted form fields into an API payload.
fn to_person_form(form: &PersonFormData) -> Result<PersonForm, String> {
    if form.full_name.trim().is_empty() {
        return Err("full name must not be blank".to_string());
    }

    let date_of_birth = NaiveDate::parse_from_str(form.date_of_birth.trim(), "%Y-%m-%d")
        .map_err(|_| "date of birth must be YYYY-MM-DD".to_string())?;

    Ok(PersonForm {
        full_name: form.full_name.trim().to_string(),
        date_of_birth,
        address: AddressForm {
            address: non_blank(&form.address),
            city: non_blank(&form.city),
            state_or_province: non_blank(&form.state_or_province),
        },
        children: parse_children(&form.children)?,
    })
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse the children textarea: one child per line, `Name` or
/// `Name; YYYY-MM-DD`.
fn parse_children(text: &str) -> Result<Vec<ChildForm>, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (name, date) = match line.split_once(';') {
                Some((name, date)) => (name.trim(), Some(date.trim())),
                None => (line, None),
            };
            if name.is_empty() {
                return Err(format!("child line has no name: {line}"));
            }
            let date_of_birth = date
                .filter(|d| !d.is_empty())
                .map(|d| {
                    NaiveDate::parse_from_str(d, "%Y-%m-%d")
                        .map_err(|_| format!("child date of birth must be YYYY-MM-DD: {d}"))
                })
                .transpose()?;
            Ok(ChildForm {
                name: name.to_string(),
                date_of_birth,
            })
        })
        .collect()
}

/// Render stored children back into the textarea format.
fn format_children(children: &[Child]) -> String {
    children
        .iter()
        .map(|child| match child.date_of_birth {
            Some(date) => format!("{}; {date}", child.name),
            None => child.name.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_form_error(
    user: &CurrentUser,
    heading: &str,
    action: &str,
    form: &PersonFormData,
    message: String,
) -> Html<String> {
    render(&PersonFormTemplate {
        username: user.username.clone(),
        heading: heading.to_string(),
        action: action.to_string(),
        full_name: form.full_name.clone(),
        date_of_birth: form.date_of_birth.clone(),
        address: form.address.clone(),
        city: form.city.clone(),
        state_or_province: form.state_or_province.clone(),
        children_text: form.children.clone(),
        error: Some(message),
    })
}

fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_children_empty_text() {
        assert!(parse_children("").expect("parse").is_empty());
        assert!(parse_children("\n  \n").expect("parse").is_empty());
    }

    #[test]
    fn test_parse_children_name_only() {
        let children = parse_children("Alice").expect("parse");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "Alice");
        assert!(children[0].date_of_birth.is_none());
    }

    #[test]
    fn test_parse_children_with_dates() {
        let children = parse_children("Alice; 2015-04-01\nBob; 2018-09-30").expect("parse");
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[0].date_of_birth,
            NaiveDate::from_ymd_opt(2015, 4, 1)
        );
        assert_eq!(children[1].name, "Bob");
    }

    #[test]
    fn test_parse_children_rejects_bad_date() {
        assert!(parse_children("Alice; 01/04/2015").is_err());
    }

    #[test]
    fn test_format_children_round_trips() {
        let children = vec![
            Child {
                id: taskboard_core::ChildId::generate(),
                name: "Alice".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(2015, 4, 1),
            },
            Child {
                id: taskboard_core::ChildId::generate(),
                name: "Bob".to_string(),
                date_of_birth: None,
            },
        ];
        let text = format_children(&children);
        assert_eq!(text, "Alice; 2015-04-01\nBob");

        let parsed = parse_children(&text).expect("parse");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "Alice");
        assert!(parsed[1].date_of_birth.is_none());
    }

    #[test]
    fn test_to_person_form_requires_name_and_date() {
        let form = PersonFormData {
            full_name: " ".to_string(),
            date_of_birth: "1980-01-01".to_string(),
            address: String::new(),
            city: String::new(),
            state_or_province: String::new(),
            children: String::new(),
        };
        assert!(to_person_form(&form).is_err());

        let form = PersonFormData {
            full_name: "Ada".to_string(),
            date_of_birth: "not-a-date".to_string(),
            address: String::new(),
            city: String::new(),
            state_or_province: String::new(),
            children: String::new(),
        };
        assert!(to_person_form(&form).is_err());
    }

    #[test]
    fn test_to_person_form_blank_address_fields_become_none() {
        let form = PersonFormData {
            full_name: "Ada Lovelace".to_string(),
            date_of_birth: "1815-12-10".to_string(),
            address: "  ".to_string(),
            city: "London".to_string(),
            state_or_province: String::new(),
            children: String::new(),
        };
        let parsed = to_person_form(&form).expect("parse");
        assert!(parsed.address.address.is_none());
        assert_eq!(parsed.address.city.as_deref(), Some("London"));
    }
}

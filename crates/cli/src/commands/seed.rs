//! Seed the database with sample tasks and people.
//!
//! Inserts the default admin's three sample tasks plus a couple of person
//! records, handy for local development and for exercising the search and
//! pagination endpoints end to end.

use chrono::NaiveDate;
use secrecy::SecretString;
use tracing::info;

use taskboard_api::db::{self, PersonRepository, TaskRepository};
use taskboard_api::models::{Address, ChildPayload, PersonPayload};

/// Username stamped onto the seeded rows.
const SEED_USER: &str = "default@admin.com";

/// The default admin's sample tasks.
const SEED_TASKS: &[&str] = &["Learn new technologies", "Wash the car", "Walk the dog"];

/// Seed sample tasks and people.
///
/// # Arguments
///
/// * `clear_existing` - If true, delete existing tasks and people first
///
/// # Errors
///
/// Returns an error if environment variables are missing or database
/// operations fail.
pub async fn run(clear_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "API_DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    if clear_existing {
        info!("Clearing existing rows");
        sqlx::query("DELETE FROM person").execute(&pool).await?;
        sqlx::query("DELETE FROM task").execute(&pool).await?;
    }

    let tasks = TaskRepository::new(&pool);
    for name in SEED_TASKS {
        let task = tasks.create(name, SEED_USER).await?;
        info!(id = %task.id, name = %task.name, "Seeded task");
    }

    let people = PersonRepository::new(&pool);
    for payload in sample_people() {
        let person = people.create(&payload, SEED_USER).await?;
        info!(id = %person.id, name = %person.full_name, "Seeded person");
    }

    info!("Seeding complete!");
    Ok(())
}

/// Sample person records, one with children and one without.
fn sample_people() -> Vec<PersonPayload> {
    vec![
        PersonPayload {
            id: None,
            full_name: "Ada Lovelace".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1815, 12, 10)
                .unwrap_or_default(),
            address: Address {
                address: Some("12 St James Square".to_string()),
                city: Some("London".to_string()),
                state_or_province: None,
            },
            children: vec![
                ChildPayload {
                    name: "Byron".to_string(),
                    date_of_birth: NaiveDate::from_ymd_opt(1836, 5, 12),
                },
                ChildPayload {
                    name: "Anne".to_string(),
                    date_of_birth: NaiveDate::from_ymd_opt(1837, 9, 22),
                },
            ],
        },
        PersonPayload {
            id: None,
            full_name: "Grace Hopper".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1906, 12, 9)
                .unwrap_or_default(),
            address: Address {
                address: None,
                city: Some("Arlington".to_string()),
                state_or_province: Some("VA".to_string()),
            },
            children: vec![],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_tasks_match_the_search_fixtures() {
        // The integration tests assume: two names contain "ar" and exactly
        // one contains "Learn".
        let ar = SEED_TASKS
            .iter()
            .filter(|n| n.to_lowercase().contains("ar"))
            .count();
        let learn = SEED_TASKS.iter().filter(|n| n.contains("Learn")).count();
        assert_eq!(ar, 2);
        assert_eq!(learn, 1);
        assert_eq!(SEED_TASKS.len(), 3);
    }

    #[test]
    fn test_sample_people_are_well_formed() {
        let people = sample_people();
        assert_eq!(people.len(), 2);
        assert!(people.iter().all(|p| !p.full_name.is_empty()));
        assert_eq!(people[0].children.len(), 2);
    }
}

//! Admin dashboard helpers.

use std::fmt;

use crate::api::{Analytics, UserUpdate};
use crate::session::Session;

/// One bar of the passes-by-category chart.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBar {
    pub category: String,
    pub passes: u64,
    /// Width relative to the largest category, 0-100.
    pub percent_of_max: f64,
}

/// Bars sorted by pass count (descending, then by name).
pub fn category_bars(analytics: &Analytics) -> Vec<CategoryBar> {
    let max = analytics
        .passes_by_category
        .values()
        .copied()
        .max()
        .unwrap_or(0)
        .max(1);

    let mut bars: Vec<CategoryBar> = analytics
        .passes_by_category
        .iter()
        .map(|(category, &passes)| CategoryBar {
            category: category.clone(),
            passes,
            percent_of_max: percent(passes, max),
        })
        .collect();
    bars.sort_by(|a, b| {
        b.passes
            .cmp(&a.passes)
            .then_with(|| a.category.cmp(&b.category))
    });
    bars
}

fn percent(value: u64, max: u64) -> f64 {
    value as f64 * 100.0 / max as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminError {
    NothingToUpdate,
    EmptyField(&'static str),
    DeleteSelf,
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminError::NothingToUpdate => f.write_str("Provide at least one field to update"),
            AdminError::EmptyField(field) => write!(f, "{field} cannot be empty"),
            AdminError::DeleteSelf => f.write_str("You cannot delete your own account"),
        }
    }
}

impl std::error::Error for AdminError {}

/// Trims text fields and rejects empty updates.
///
/// # Errors
/// Returns [`AdminError::NothingToUpdate`] or [`AdminError::EmptyField`].
pub fn validate_update(update: UserUpdate) -> Result<UserUpdate, AdminError> {
    fn text(value: Option<String>, field: &'static str) -> Result<Option<String>, AdminError> {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if v.is_empty() => Err(AdminError::EmptyField(field)),
            other => Ok(other),
        }
    }

    let update = UserUpdate {
        name: text(update.name, "name")?,
        email: text(update.email, "email")?,
        role: text(update.role, "role")?,
        is_admin: update.is_admin,
    };
    if update == UserUpdate::default() {
        return Err(AdminError::NothingToUpdate);
    }
    Ok(update)
}

/// Refuses to delete the signed-in admin's own account.
///
/// # Errors
/// Returns [`AdminError::DeleteSelf`] when `user_id` is the session's user.
pub fn check_delete(session: &Session, user_id: i64) -> Result<(), AdminError> {
    if session.user.id == user_id {
        Err(AdminError::DeleteSelf)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::api::User;

    #[test]
    fn test_bars_sorted_and_scaled() {
        let analytics = Analytics {
            passes_by_category: BTreeMap::from([
                ("Cleaner".to_string(), 2),
                ("Electrician".to_string(), 4),
                ("Plumber".to_string(), 0),
            ]),
            ..Analytics::default()
        };
        let bars = category_bars(&analytics);
        let names: Vec<_> = bars.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(names, ["Electrician", "Cleaner", "Plumber"]);
        assert!((bars[0].percent_of_max - 100.0).abs() < f64::EPSILON);
        assert!((bars[1].percent_of_max - 50.0).abs() < f64::EPSILON);
        assert!(bars[2].percent_of_max.abs() < f64::EPSILON);
    }

    #[test]
    fn test_bars_with_no_passes() {
        let analytics = Analytics {
            passes_by_category: BTreeMap::from([("Cleaner".to_string(), 0)]),
            ..Analytics::default()
        };
        assert!(category_bars(&analytics)[0].percent_of_max.abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_update() {
        assert_eq!(
            validate_update(UserUpdate::default()).unwrap_err(),
            AdminError::NothingToUpdate
        );
        assert_eq!(
            validate_update(UserUpdate {
                name: Some("  ".to_string()),
                ..UserUpdate::default()
            })
            .unwrap_err(),
            AdminError::EmptyField("name")
        );
        let ok = validate_update(UserUpdate {
            role: Some(" Welder ".to_string()),
            is_admin: Some(false),
            ..UserUpdate::default()
        })
        .unwrap();
        assert_eq!(ok.role.as_deref(), Some("Welder"));
    }

    #[test]
    fn test_cannot_delete_self() {
        let session = Session {
            token: "t".to_string(),
            user: User {
                id: 1,
                name: "Admin".to_string(),
                email: "admin@example.com".to_string(),
                role: "Admin".to_string(),
                is_admin: true,
                created_at: None,
            },
        };
        assert_eq!(check_delete(&session, 1), Err(AdminError::DeleteSelf));
        assert!(check_delete(&session, 2).is_ok());
    }
}

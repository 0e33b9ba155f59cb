use std::fmt;

use uuid::Uuid;

use crate::api::AttemptInfo;
use crate::session::Session;

/// Screens of the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Payment,
    Test,
    /// Carries the one-time token of a cached verdict.
    Result { token: Uuid },
    Certificate,
    Admin,
}

impl Route {
    pub fn requires_session(self) -> bool {
        !matches!(self, Route::Login)
    }

    pub fn requires_admin(self) -> bool {
        matches!(self, Route::Admin)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login => f.write_str("/login"),
            Route::Dashboard => f.write_str("/dashboard"),
            Route::Payment => f.write_str("/payment"),
            Route::Test => f.write_str("/test"),
            Route::Result { .. } => f.write_str("/result"),
            Route::Certificate => f.write_str("/certificate"),
            Route::Admin => f.write_str("/admin"),
        }
    }
}

/// Applies the session guards and returns the route that should actually render.
///
/// Protected routes without a session go to login; the admin route without
/// admin rights goes to the dashboard.
pub fn guard(requested: Route, session: Option<&Session>) -> Route {
    match session {
        None if requested.requires_session() => Route::Login,
        Some(s) if requested.requires_admin() && !s.is_admin() => Route::Dashboard,
        _ => requested,
    }
}

/// Where the dashboard's "start" action leads. Payment re-gates on entry.
pub fn dashboard_start(info: &AttemptInfo) -> Route {
    if info.has_passed {
        Route::Certificate
    } else {
        Route::Payment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::User;

    fn session(is_admin: bool) -> Session {
        Session {
            token: "t".to_string(),
            user: User {
                id: 1,
                name: "N".to_string(),
                email: "n@example.com".to_string(),
                role: "Plumber".to_string(),
                is_admin,
                created_at: None,
            },
        }
    }

    #[test]
    fn test_protected_routes_need_session() {
        assert_eq!(guard(Route::Payment, None), Route::Login);
        assert_eq!(guard(Route::Admin, None), Route::Login);
        assert_eq!(guard(Route::Login, None), Route::Login);
    }

    #[test]
    fn test_admin_route_needs_admin() {
        assert_eq!(guard(Route::Admin, Some(&session(false))), Route::Dashboard);
        assert_eq!(guard(Route::Admin, Some(&session(true))), Route::Admin);
        assert_eq!(guard(Route::Test, Some(&session(false))), Route::Test);
    }

    #[test]
    fn test_dashboard_start() {
        assert_eq!(
            dashboard_start(&AttemptInfo::new(1, true)),
            Route::Certificate
        );
        assert_eq!(dashboard_start(&AttemptInfo::new(2, false)), Route::Payment);
    }
}

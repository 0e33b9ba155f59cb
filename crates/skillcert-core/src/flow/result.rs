//! Hand-off of a test verdict to the result view.
//!
//! The verdict is kept in-process under a one-time token. Resolving the
//! token consumes it, so the view can be shown once and never for stale data.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::api::TestResult;
use crate::flow::route::Route;

pub const RESULT_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    entries: HashMap<Uuid, (Instant, TestResult)>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(RESULT_TTL)
    }
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Stores a verdict and returns the route that shows it.
    pub fn put(&mut self, result: TestResult) -> Route {
        self.evict_expired();
        let token = Uuid::new_v4();
        self.entries.insert(token, (Instant::now(), result));
        Route::Result { token }
    }

    /// Consumes the verdict behind `token`, if it is still fresh.
    pub fn take(&mut self, token: Uuid) -> Option<TestResult> {
        let (stored_at, result) = self.entries.remove(&token)?;
        (stored_at.elapsed() <= self.ttl).then_some(result)
    }

    /// Resolves the result route: the view to render, or where to go instead.
    pub fn resolve(&mut self, token: Uuid) -> Result<ResultView, Route> {
        match self.take(token) {
            Some(result) => Ok(ResultView::new(result)),
            None => {
                tracing::debug!(%token, "no result for token; redirecting");
                Err(Route::Dashboard)
            }
        }
    }

    fn evict_expired(&mut self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, (stored_at, _)| stored_at.elapsed() <= ttl);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    ViewCertificate,
    /// Another attempt is allowed; it goes through payment gating.
    Retry,
    BackToDashboard,
}

impl NextAction {
    pub fn route(self) -> Route {
        match self {
            NextAction::ViewCertificate => Route::Certificate,
            NextAction::Retry => Route::Payment,
            NextAction::BackToDashboard => Route::Dashboard,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NextAction::ViewCertificate => "View Certificate",
            NextAction::Retry => "Retry Test",
            NextAction::BackToDashboard => "Back to Dashboard",
        }
    }
}

/// What the result screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub result: TestResult,
}

impl ResultView {
    pub fn new(result: TestResult) -> Self {
        Self { result }
    }

    /// Rounded score percentage; 0 for an empty test.
    pub fn percentage(&self) -> u32 {
        let TestResult { score, total, .. } = self.result;
        if total == 0 {
            return 0;
        }
        let scaled = u64::from(score) * 100;
        let total = u64::from(total);
        // Round half up.
        u32::try_from((scaled * 2 + total) / (total * 2)).unwrap_or(u32::MAX)
    }

    pub fn headline(&self) -> &'static str {
        if self.result.passed {
            "Congratulations!"
        } else {
            "Test Not Passed"
        }
    }

    pub fn next_actions(&self) -> Vec<NextAction> {
        if self.result.passed {
            vec![NextAction::ViewCertificate, NextAction::BackToDashboard]
        } else if self.result.can_retry {
            vec![NextAction::Retry, NextAction::BackToDashboard]
        } else {
            vec![NextAction::BackToDashboard]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: u32, total: u32, passed: bool, can_retry: bool) -> TestResult {
        TestResult {
            score,
            total,
            passed,
            attempt_number: 1,
            message: String::new(),
            can_retry,
        }
    }

    #[test]
    fn test_token_is_single_use() {
        let mut cache = ResultCache::default();
        let Route::Result { token } = cache.put(result(8, 10, true, false)) else {
            panic!("expected result route");
        };
        assert!(cache.resolve(token).is_ok());
        assert_eq!(cache.resolve(token).unwrap_err(), Route::Dashboard);
    }

    #[test]
    fn test_unknown_token_redirects_to_dashboard() {
        let mut cache = ResultCache::default();
        assert_eq!(cache.resolve(Uuid::new_v4()).unwrap_err(), Route::Dashboard);
    }

    #[test]
    fn test_expired_entry_is_gone() {
        let mut cache = ResultCache::new(Duration::ZERO);
        let Route::Result { token } = cache.put(result(8, 10, true, false)) else {
            panic!("expected result route");
        };
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.take(token).is_none());
    }

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(ResultView::new(result(7, 10, true, false)).percentage(), 70);
        assert_eq!(ResultView::new(result(2, 3, false, true)).percentage(), 67);
        assert_eq!(ResultView::new(result(1, 8, false, true)).percentage(), 13);
        assert_eq!(ResultView::new(result(0, 0, false, true)).percentage(), 0);
    }

    #[test]
    fn test_next_actions() {
        let passed = ResultView::new(result(9, 10, true, false));
        assert_eq!(passed.headline(), "Congratulations!");
        assert_eq!(passed.next_actions()[0].route(), Route::Certificate);

        let retry = ResultView::new(result(3, 10, false, true));
        assert_eq!(retry.headline(), "Test Not Passed");
        assert_eq!(retry.next_actions()[0].route(), Route::Payment);

        let done = ResultView::new(result(3, 10, false, false));
        assert_eq!(done.next_actions(), vec![NextAction::BackToDashboard]);
    }
}

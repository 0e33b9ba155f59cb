//! Attempt gating.
//!
//! Every entry into payment or test re-reads the attempt counters from the
//! server; nothing here caches them.

use crate::api::{ApiError, AttemptInfo, MAX_ATTEMPTS};
use crate::flow::route::Route;

/// Outcome of entering the payment route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEntry {
    Redirect(Route),
    /// Stay and show the method selector.
    SelectMethod { repayment_required: bool },
}

/// Outcome of entering the test route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestEntry {
    Redirect(Route),
    Start { remaining_attempts: u32 },
}

/// Decides the payment route from a fresh attempt fetch.
///
/// A failed fetch falls back to the method selector as if no attempts were
/// used, so a flaky counter endpoint never blocks paying.
pub fn payment_gate(fetched: Result<AttemptInfo, ApiError>) -> PaymentEntry {
    let info = match fetched {
        Ok(info) => info,
        Err(err) => {
            tracing::warn!(error = %err, kind = %err.kind, "attempt fetch failed; showing payment");
            AttemptInfo::default()
        }
    };

    if info.has_passed {
        return PaymentEntry::Redirect(Route::Certificate);
    }
    if info.attempt_count > 0 && info.attempt_count < MAX_ATTEMPTS {
        return PaymentEntry::Redirect(Route::Test);
    }
    PaymentEntry::SelectMethod {
        repayment_required: info.attempt_count >= MAX_ATTEMPTS,
    }
}

/// Decides the test route from a fresh attempt fetch.
pub fn test_gate(info: &AttemptInfo) -> TestEntry {
    if info.has_passed {
        TestEntry::Redirect(Route::Certificate)
    } else if info.attempt_count >= MAX_ATTEMPTS {
        TestEntry::Redirect(Route::Payment)
    } else {
        TestEntry::Start {
            remaining_attempts: info.remaining_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;

    #[test]
    fn test_payment_gate_redirects_mid_cycle_to_test() {
        for count in 1..MAX_ATTEMPTS {
            assert_eq!(
                payment_gate(Ok(AttemptInfo::new(count, false))),
                PaymentEntry::Redirect(Route::Test)
            );
        }
    }

    #[test]
    fn test_payment_gate_fresh_user_sees_selector() {
        assert_eq!(
            payment_gate(Ok(AttemptInfo::new(0, false))),
            PaymentEntry::SelectMethod {
                repayment_required: false
            }
        );
    }

    #[test]
    fn test_payment_gate_exhausted_requires_repayment() {
        assert_eq!(
            payment_gate(Ok(AttemptInfo::new(3, false))),
            PaymentEntry::SelectMethod {
                repayment_required: true
            }
        );
        assert_eq!(
            payment_gate(Ok(AttemptInfo::new(4, false))),
            PaymentEntry::SelectMethod {
                repayment_required: true
            }
        );
    }

    #[test]
    fn test_passed_goes_to_certificate_everywhere() {
        let info = AttemptInfo::new(2, true);
        assert_eq!(
            payment_gate(Ok(info)),
            PaymentEntry::Redirect(Route::Certificate)
        );
        assert_eq!(test_gate(&info), TestEntry::Redirect(Route::Certificate));
    }

    #[test]
    fn test_payment_gate_fails_open() {
        let err = ApiError::new(ApiErrorKind::Network, "Connection failed");
        assert_eq!(
            payment_gate(Err(err)),
            PaymentEntry::SelectMethod {
                repayment_required: false
            }
        );
    }

    #[test]
    fn test_test_gate_sends_exhausted_back_to_payment() {
        assert_eq!(
            test_gate(&AttemptInfo::new(3, false)),
            TestEntry::Redirect(Route::Payment)
        );
        assert_eq!(
            test_gate(&AttemptInfo::new(0, false)),
            TestEntry::Start {
                remaining_attempts: 3
            }
        );
    }
}

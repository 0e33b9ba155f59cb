//! Client-side progression: routes, the attempt gate, payment, test and result.
//!
//! State machines here follow a reducer/effect split: reducers mutate state
//! and return effects, and a driver performs the effects (HTTP, timers) and
//! feeds the outcomes back in as events.

pub mod gate;
pub mod payment;
pub mod result;
pub mod route;

pub use gate::{payment_gate, test_gate, PaymentEntry, TestEntry};
pub use result::{NextAction, ResultCache, ResultView};
pub use route::{guard, Route};
pub use test::{IncompleteAnswers, TestSession};

//! Payment: method selection, card entry, processing and the countdown to the test.

mod card;
mod driver;
mod gateway;
mod state;
mod update;

pub use card::{CardDetails, CardError, CardInput};
pub use driver::{PaymentDriver, PaymentInput, PaymentOutcome};
pub use gateway::{Decline, FACILITATOR_DECLINED, PaymentGateway, SELF_PAY_DECLINED};
pub use state::{PaymentEffect, PaymentEvent, PaymentPhase, PaymentState};
pub use update::{RESET_FAILED, update};

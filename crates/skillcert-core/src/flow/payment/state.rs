use super::card::{CardDetails, CardInput};
use super::gateway::Decline;
use crate::api::{PaymentMethod, RecordPaymentRequest};
use crate::flow::route::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPhase {
    SelectingMethod,
    EnteringCard,
    /// Simulated processing delay; not cancellable.
    Processing,
    /// Paid. Counting down to the test.
    Complete { remaining_secs: u32 },
}

/// Payment flow state for one visit to the payment route.
#[derive(Debug, Clone)]
pub struct PaymentState {
    pub phase: PaymentPhase,
    pub method: Option<PaymentMethod>,
    pub card: CardInput,
    pub error: Option<String>,
    /// All attempts of the previous payment are used up.
    pub repayment_required: bool,
    pub(super) countdown_secs: u32,
    /// Bumped on every countdown re-arm; ticks from older arms are ignored.
    pub(super) countdown_generation: u64,
}

impl PaymentState {
    pub fn new(repayment_required: bool, countdown_secs: u32) -> Self {
        Self {
            phase: PaymentPhase::SelectingMethod,
            method: None,
            card: CardInput::default(),
            error: None,
            repayment_required,
            countdown_secs,
            countdown_generation: 0,
        }
    }

    /// Fee for the selected method.
    pub fn amount(&self) -> Option<u32> {
        self.method.map(PaymentMethod::amount)
    }

    /// The ledger entry written after processing.
    ///
    /// Repayments are always recorded as discounted, whichever method paid.
    pub fn record_request(&self) -> Option<RecordPaymentRequest> {
        let method = self.method?;
        Some(RecordPaymentRequest {
            amount: method.amount(),
            discounted: method == PaymentMethod::Facilitator || self.repayment_required,
        })
    }

    /// True while the user can act (timers alone drive `Processing`).
    pub fn accepts_input(&self) -> bool {
        !matches!(self.phase, PaymentPhase::Processing)
    }
}

#[derive(Debug, Clone)]
pub enum PaymentEvent {
    // User actions
    SelectMethod(PaymentMethod),
    SubmitCard(CardInput),
    Cancel,
    StartNow,

    // Effect outcomes
    Authorized,
    Declined(Decline),
    ProcessingElapsed,
    ResetFinished(Result<(), String>),
    RecordFinished,
    CountdownTick { generation: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEffect {
    /// Ask the gateway to approve the card.
    Authorize {
        method: PaymentMethod,
        card: CardDetails,
    },
    /// Deliver `ProcessingElapsed` after the processing delay.
    StartProcessing,
    ResetAttempts,
    RecordPayment(RecordPaymentRequest),
    /// Deliver `CountdownTick { generation }` after one tick interval,
    /// replacing any pending tick.
    ScheduleTick { generation: u64 },
    Navigate(Route),
}

//! Payment reducer.
//!
//! `update` is the only place payment state changes. It performs no I/O;
//! anything that talks to the outside world is returned as a [`PaymentEffect`].

use super::state::{PaymentEffect, PaymentEvent, PaymentPhase, PaymentState};
use crate::flow::route::Route;

pub const RESET_FAILED: &str = "Unable to reset attempts. Please try again.";

pub fn update(state: &mut PaymentState, event: PaymentEvent) -> Vec<PaymentEffect> {
    match (state.phase, event) {
        (
            PaymentPhase::SelectingMethod | PaymentPhase::EnteringCard,
            PaymentEvent::SelectMethod(method),
        ) => {
            state.method = Some(method);
            state.card.clear();
            state.error = None;
            state.phase = PaymentPhase::EnteringCard;
            vec![]
        }
        (PaymentPhase::EnteringCard, PaymentEvent::Cancel) => {
            state.method = None;
            state.card.clear();
            state.error = None;
            state.phase = PaymentPhase::SelectingMethod;
            vec![]
        }
        (PaymentPhase::EnteringCard, PaymentEvent::SubmitCard(input)) => {
            let Some(method) = state.method else {
                return vec![];
            };
            state.card = input;
            match state.card.validate() {
                Ok(card) => {
                    state.error = None;
                    vec![PaymentEffect::Authorize { method, card }]
                }
                Err(err) => {
                    state.error = Some(err.to_string());
                    vec![]
                }
            }
        }
        (PaymentPhase::EnteringCard, PaymentEvent::Declined(decline)) => {
            state.error = Some(decline.message);
            vec![]
        }
        (PaymentPhase::EnteringCard, PaymentEvent::Authorized) => {
            state.error = None;
            state.phase = PaymentPhase::Processing;
            vec![PaymentEffect::StartProcessing]
        }
        (PaymentPhase::Processing, PaymentEvent::ProcessingElapsed) => {
            if state.repayment_required {
                vec![PaymentEffect::ResetAttempts]
            } else {
                record(state)
            }
        }
        (PaymentPhase::Processing, PaymentEvent::ResetFinished(Ok(()))) => record(state),
        (PaymentPhase::Processing, PaymentEvent::ResetFinished(Err(message))) => {
            state.card.clear();
            state.error = Some(if message.trim().is_empty() {
                RESET_FAILED.to_string()
            } else {
                message
            });
            state.phase = PaymentPhase::EnteringCard;
            vec![]
        }
        (PaymentPhase::Processing, PaymentEvent::RecordFinished) => {
            state.phase = PaymentPhase::Complete {
                remaining_secs: state.countdown_secs,
            };
            arm_countdown(state)
        }
        (
            PaymentPhase::Complete { remaining_secs },
            PaymentEvent::CountdownTick { generation },
        ) => {
            if generation != state.countdown_generation {
                return vec![];
            }
            state.phase = PaymentPhase::Complete {
                remaining_secs: remaining_secs.saturating_sub(1),
            };
            arm_countdown(state)
        }
        (PaymentPhase::Complete { .. }, PaymentEvent::StartNow) => {
            // Invalidate whatever tick is still pending.
            state.countdown_generation += 1;
            state.phase = PaymentPhase::Complete { remaining_secs: 0 };
            vec![PaymentEffect::Navigate(Route::Test)]
        }
        (phase, _) => {
            tracing::trace!(?phase, "payment event ignored");
            vec![]
        }
    }
}

fn record(state: &PaymentState) -> Vec<PaymentEffect> {
    state
        .record_request()
        .map(PaymentEffect::RecordPayment)
        .into_iter()
        .collect()
}

fn arm_countdown(state: &mut PaymentState) -> Vec<PaymentEffect> {
    let PaymentPhase::Complete { remaining_secs } = state.phase else {
        return vec![];
    };
    state.countdown_generation += 1;
    if remaining_secs == 0 {
        vec![PaymentEffect::Navigate(Route::Test)]
    } else {
        vec![PaymentEffect::ScheduleTick {
            generation: state.countdown_generation,
        }]
    }
}

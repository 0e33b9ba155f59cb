use anyhow::Result;
use skillcert_core::api::PaymentMethod;
use skillcert_core::flow::payment::{
    CardInput, PaymentDriver, PaymentEvent, PaymentGateway, PaymentInput, PaymentOutcome,
    PaymentPhase, PaymentState,
};
use skillcert_core::flow::{PaymentEntry, Route, payment_gate};

use crate::cli::app::App;
use crate::cli::prompt::Prompt;
use crate::cli::render::Ui;

pub async fn run(app: &mut App) -> Result<Option<Route>> {
    app.session()?;

    let repayment_required = match payment_gate(app.api.attempt_count().await) {
        PaymentEntry::Redirect(route) => {
            if route == Route::Test {
                app.ui
                    .muted("Your current payment still has attempts left. Taking you to the test.");
            }
            return Ok(Some(route));
        }
        PaymentEntry::SelectMethod { repayment_required } => repayment_required,
    };

    let gateway = PaymentGateway::from_config(&app.config.payment);
    let driver = PaymentDriver::new(&app.api, &gateway, app.config.processing_delay());
    let mut state = PaymentState::new(repayment_required, app.config.payment.countdown_secs);
    let mut input = TerminalInput {
        prompt: &mut app.prompt,
        countdown_seen: false,
    };
    let mut view = PaymentView::new(app.ui);

    let outcome = driver
        .run(&mut state, &mut input, |s| view.render(s))
        .await;
    match outcome {
        PaymentOutcome::Navigate(route) => Ok(Some(route)),
        PaymentOutcome::Abandoned => {
            app.ui.muted("Payment cancelled.");
            Ok(None)
        }
    }
}

struct TerminalInput<'a> {
    prompt: &'a mut Prompt,
    /// Set once input typed while processing has been discarded.
    countdown_seen: bool,
}

impl TerminalInput<'_> {
    async fn ask(&mut self, label: &str) -> Option<String> {
        match self.prompt.ask(label).await {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "reading payment input failed");
                None
            }
        }
    }
}

impl PaymentInput for TerminalInput<'_> {
    async fn next_event(&mut self, state: &PaymentState) -> Option<PaymentEvent> {
        match state.phase {
            PaymentPhase::SelectingMethod => loop {
                let choice = self.ask("Choose 1 or 2 (q to quit): ").await?;
                match choice.trim().to_ascii_lowercase().as_str() {
                    "1" | "self" => return Some(PaymentEvent::SelectMethod(PaymentMethod::SelfPay)),
                    "2" | "facilitator" => {
                        return Some(PaymentEvent::SelectMethod(PaymentMethod::Facilitator));
                    }
                    "q" | "quit" => return None,
                    _ => println!("Please enter 1 or 2."),
                }
            },
            PaymentPhase::EnteringCard => {
                let number = self.ask("Card number (or 'back'): ").await?;
                if number.trim().eq_ignore_ascii_case("back") {
                    return Some(PaymentEvent::Cancel);
                }
                let expiry = self.ask("Expiry (MM/YY): ").await?;
                let cvv = self.ask("CVV: ").await?;
                Some(PaymentEvent::SubmitCard(CardInput {
                    number,
                    expiry,
                    cvv,
                }))
            }
            PaymentPhase::Complete { .. } => {
                if !self.countdown_seen {
                    self.countdown_seen = true;
                    let dropped = self.prompt.discard_pending().await;
                    if dropped > 0 {
                        tracing::debug!(dropped, "discarded input typed during processing");
                    }
                }
                match self.prompt.read_line().await {
                    Ok(Some(_)) => Some(PaymentEvent::StartNow),
                    // No more input: let the countdown finish on its own.
                    Ok(None) | Err(_) => std::future::pending().await,
                }
            }
            PaymentPhase::Processing => std::future::pending().await,
        }
    }
}

/// Prints what changed after each payment event.
struct PaymentView {
    ui: Ui,
    last_phase: Option<PaymentPhase>,
}

impl PaymentView {
    fn new(ui: Ui) -> Self {
        Self {
            ui,
            last_phase: None,
        }
    }

    fn render(&mut self, state: &PaymentState) {
        let entered = self.last_phase != Some(state.phase);
        let ui = &self.ui;

        match state.phase {
            PaymentPhase::SelectingMethod if entered => {
                ui.heading("Certification Payment");
                if state.repayment_required {
                    ui.muted(
                        "All attempts on your last payment are used. Pay again to unlock 3 more.",
                    );
                }
                for (n, method) in [PaymentMethod::SelfPay, PaymentMethod::Facilitator]
                    .into_iter()
                    .enumerate()
                {
                    println!("  {}) {} (Rs {})", n + 1, method.label(), method.amount());
                }
            }
            PaymentPhase::EnteringCard if entered => {
                if let (Some(method), Some(amount)) = (state.method, state.amount()) {
                    ui.heading(format!("{}: Rs {amount}", method.label()));
                    ui.muted("Enter card details, or 'back' to choose another method.");
                }
            }
            PaymentPhase::Processing if entered => ui.muted("Processing payment..."),
            PaymentPhase::Complete { remaining_secs } => {
                if entered && matches!(self.last_phase, Some(PaymentPhase::Processing)) {
                    ui.success("Payment successful");
                }
                if remaining_secs > 0 {
                    ui.muted(format!(
                        "Starting your test in {remaining_secs}... (press Enter to start now)"
                    ));
                }
            }
            _ => {}
        }

        if let Some(error) = &state.error {
            ui.error(error);
        }
        self.last_phase = Some(state.phase);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn counting_down() -> PaymentState {
        let mut state = PaymentState::new(false, 3);
        state.phase = PaymentPhase::Complete { remaining_secs: 3 };
        state
    }

    #[tokio::test]
    async fn test_lines_typed_before_countdown_do_not_start_test() {
        let mut prompt = Prompt::from_bytes(b"early\n");
        let mut input = TerminalInput {
            prompt: &mut prompt,
            countdown_seen: false,
        };
        let state = counting_down();

        let next = tokio::time::timeout(Duration::from_millis(100), input.next_event(&state)).await;
        assert!(next.is_err(), "buffered line must not skip the countdown");
        assert!(input.countdown_seen);
    }

    #[tokio::test]
    async fn test_enter_during_countdown_starts_now() {
        let mut prompt = Prompt::from_bytes(b"\n");
        let mut input = TerminalInput {
            prompt: &mut prompt,
            countdown_seen: true,
        };
        let state = counting_down();

        let next = input.next_event(&state).await;
        assert!(matches!(next, Some(PaymentEvent::StartNow)));
    }
}

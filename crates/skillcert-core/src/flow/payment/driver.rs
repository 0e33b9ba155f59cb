//! Runs the payment reducer against the real world.
//!
//! One request is in flight at a time. The only concurrency is between user
//! input and the single pending timer (processing delay or countdown tick).

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::Sleep;

use super::gateway::PaymentGateway;
use super::state::{PaymentEffect, PaymentEvent, PaymentState};
use super::update::{update, RESET_FAILED};
use crate::api::ApiClient;
use crate::flow::route::Route;

/// Source of user actions for the payment flow.
pub trait PaymentInput {
    /// Waits for the next user action given the current state.
    /// Returns `None` when the user leaves the flow.
    ///
    /// The returned future may be dropped when a timer fires first, so it
    /// must not lose input when cancelled.
    fn next_event(&mut self, state: &PaymentState) -> impl Future<Output = Option<PaymentEvent>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Navigate(Route),
    /// The user left before paying.
    Abandoned,
}

pub struct PaymentDriver<'a> {
    api: &'a ApiClient,
    gateway: &'a PaymentGateway,
    processing_delay: Duration,
    tick: Duration,
}

struct PendingTimer {
    sleep: Pin<Box<Sleep>>,
    event: PaymentEvent,
}

impl PendingTimer {
    fn new(after: Duration, event: PaymentEvent) -> Self {
        Self {
            sleep: Box::pin(tokio::time::sleep(after)),
            event,
        }
    }
}

impl<'a> PaymentDriver<'a> {
    pub fn new(api: &'a ApiClient, gateway: &'a PaymentGateway, processing_delay: Duration) -> Self {
        Self {
            api,
            gateway,
            processing_delay,
            tick: Duration::from_secs(1),
        }
    }

    /// Overrides the countdown tick interval.
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Drives the flow until it navigates away or the user leaves.
    ///
    /// `render` is called with the state after every change.
    pub async fn run<I, R>(
        &self,
        state: &mut PaymentState,
        input: &mut I,
        mut render: R,
    ) -> PaymentOutcome
    where
        I: PaymentInput,
        R: FnMut(&PaymentState),
    {
        let mut timer: Option<PendingTimer> = None;
        let mut queue: VecDeque<PaymentEvent> = VecDeque::new();
        render(state);

        loop {
            let event = match queue.pop_front() {
                Some(event) => event,
                None => match self.wait(state, input, &mut timer).await {
                    Some(event) => event,
                    None => return PaymentOutcome::Abandoned,
                },
            };

            let effects = update(state, event);
            render(state);

            for effect in effects {
                match effect {
                    PaymentEffect::Authorize { method, card } => {
                        let event = match self.gateway.authorize(self.api, method, &card).await {
                            Ok(()) => {
                                tracing::info!(?method, "payment authorized");
                                PaymentEvent::Authorized
                            }
                            Err(decline) => {
                                tracing::info!(?method, reason = %decline, "payment declined");
                                PaymentEvent::Declined(decline)
                            }
                        };
                        queue.push_back(event);
                    }
                    PaymentEffect::StartProcessing => {
                        timer = Some(PendingTimer::new(
                            self.processing_delay,
                            PaymentEvent::ProcessingElapsed,
                        ));
                    }
                    PaymentEffect::ResetAttempts => {
                        let outcome = match self.api.reset_attempts().await {
                            Ok(_) => {
                                tracing::info!("attempts reset for repayment");
                                Ok(())
                            }
                            Err(err) => {
                                tracing::warn!(error = %err, kind = %err.kind, "attempt reset failed");
                                Err(err
                                    .server_message()
                                    .map_or_else(|| RESET_FAILED.to_string(), str::to_string))
                            }
                        };
                        queue.push_back(PaymentEvent::ResetFinished(outcome));
                    }
                    PaymentEffect::RecordPayment(request) => {
                        if let Err(err) = self.api.record_payment(request).await {
                            tracing::warn!(
                                error = %err,
                                amount = request.amount,
                                discounted = request.discounted,
                                "payment record failed; continuing"
                            );
                        }
                        queue.push_back(PaymentEvent::RecordFinished);
                    }
                    PaymentEffect::ScheduleTick { generation } => {
                        timer = Some(PendingTimer::new(
                            self.tick,
                            PaymentEvent::CountdownTick { generation },
                        ));
                    }
                    PaymentEffect::Navigate(route) => return PaymentOutcome::Navigate(route),
                }
            }
        }
    }

    /// Waits for the pending timer or user input, whichever comes first.
    /// Returns `None` only when the input source is exhausted.
    async fn wait<I: PaymentInput>(
        &self,
        state: &PaymentState,
        input: &mut I,
        timer: &mut Option<PendingTimer>,
    ) -> Option<PaymentEvent> {
        let Some(pending) = timer.as_mut() else {
            return input.next_event(state).await;
        };

        if !state.accepts_input() {
            pending.sleep.as_mut().await;
            return timer.take().map(|t| t.event);
        }

        let fired = tokio::select! {
            () = pending.sleep.as_mut() => true,
            next = input.next_event(state) => match next {
                Some(event) => return Some(event),
                None => false,
            },
        };
        if fired {
            timer.take().map(|t| t.event)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::api::PaymentMethod;
    use crate::flow::payment::card::CardInput;
    use crate::flow::payment::state::PaymentPhase;

    /// Replays scripted events, then waits forever.
    struct Scripted(VecDeque<PaymentEvent>);

    impl PaymentInput for Scripted {
        async fn next_event(&mut self, _state: &PaymentState) -> Option<PaymentEvent> {
            match self.0.pop_front() {
                Some(event) => Some(event),
                None => std::future::pending().await,
            }
        }
    }

    /// Replays scripted events, then reports that the user left.
    struct ThenQuit(VecDeque<PaymentEvent>);

    impl PaymentInput for ThenQuit {
        async fn next_event(&mut self, _state: &PaymentState) -> Option<PaymentEvent> {
            self.0.pop_front()
        }
    }

    /// Presses "start now" as soon as the countdown shows.
    struct StartNowWhenComplete(VecDeque<PaymentEvent>);

    impl PaymentInput for StartNowWhenComplete {
        async fn next_event(&mut self, state: &PaymentState) -> Option<PaymentEvent> {
            if matches!(state.phase, PaymentPhase::Complete { .. }) {
                return Some(PaymentEvent::StartNow);
            }
            match self.0.pop_front() {
                Some(event) => Some(event),
                None => std::future::pending().await,
            }
        }
    }

    fn registered_card_input() -> CardInput {
        CardInput {
            number: "4214490203937097".to_string(),
            expiry: "09/27".to_string(),
            cvv: "312".to_string(),
        }
    }

    #[tokio::test]
    async fn test_self_pay_decline_stays_on_card_entry_until_input_ends() {
        let api = ApiClient::new("http://127.0.0.1:9/api");
        let gateway = PaymentGateway::Local {
            facilitator_card: None,
        };
        let driver = PaymentDriver::new(&api, &gateway, Duration::from_millis(5));
        let mut state = PaymentState::new(false, 3);

        let mut input = ThenQuit(VecDeque::from([
            PaymentEvent::SelectMethod(PaymentMethod::SelfPay),
            PaymentEvent::SubmitCard(registered_card_input()),
        ]));

        let outcome = driver.run(&mut state, &mut input, |_| {}).await;
        assert_eq!(outcome, PaymentOutcome::Abandoned);
        assert_eq!(state.phase, PaymentPhase::EnteringCard);
        assert_eq!(
            state.error.as_deref(),
            Some("Payment not successful. Please contact your bank.")
        );
    }

    #[tokio::test]
    async fn test_start_now_cuts_countdown_short() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::path("/api/payment/record"))
            .respond_with(wiremock::ResponseTemplate::new(201).set_body_json(
                serde_json::json!({"message": "Payment recorded"}),
            ))
            .mount(&server)
            .await;

        let api = ApiClient::new(format!("{}/api", server.uri()));
        let gateway = PaymentGateway::Local {
            facilitator_card: Some(crate::config::RegisteredCard {
                number: "4214490203937097".to_string(),
                expiry: "09/27".to_string(),
                cvv: "312".to_string(),
            }),
        };
        // A tick long enough that only StartNow can finish the flow in time.
        let driver = PaymentDriver::new(&api, &gateway, Duration::from_millis(5))
            .with_tick(Duration::from_secs(60));
        let mut state = PaymentState::new(false, 3);

        let mut input = StartNowWhenComplete(VecDeque::from([
            PaymentEvent::SelectMethod(PaymentMethod::Facilitator),
            PaymentEvent::SubmitCard(registered_card_input()),
        ]));

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            driver.run(&mut state, &mut input, |_| {}),
        )
        .await
        .unwrap();
        assert_eq!(outcome, PaymentOutcome::Navigate(Route::Test));
    }

    #[tokio::test]
    async fn test_scripted_input_waits_for_timers() {
        let api = ApiClient::new("http://127.0.0.1:9/api");
        let gateway = PaymentGateway::Local {
            facilitator_card: None,
        };
        let driver = PaymentDriver::new(&api, &gateway, Duration::from_millis(5));
        let mut state = PaymentState::new(false, 3);
        let mut input = Scripted(VecDeque::from([PaymentEvent::SelectMethod(
            PaymentMethod::Facilitator,
        )]));

        let result = tokio::time::timeout(
            Duration::from_millis(100),
            driver.run(&mut state, &mut input, |_| {}),
        )
        .await;
        assert!(result.is_err(), "flow should still be waiting for card input");
        assert_eq!(state.phase, PaymentPhase::EnteringCard);
    }
}

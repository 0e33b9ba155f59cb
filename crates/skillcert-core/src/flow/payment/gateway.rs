use std::fmt;

use super::card::CardDetails;
use crate::api::{ApiClient, ApiErrorKind, PaymentMethod};
use crate::config::{GatewayKind, PaymentConfig, RegisteredCard};

pub const FACILITATOR_DECLINED: &str = "Card declined. Please use the registered facilitator card.";
pub const SELF_PAY_DECLINED: &str = "Payment not successful. Please contact your bank.";

/// A refused authorization. Leaves the payment flow where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decline {
    pub message: String,
}

impl Decline {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Decline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Decline {}

/// Verifies a card submission before the payment is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentGateway {
    /// Compares facilitator cards with the registered card in config.
    /// Self-payment by card is never approved.
    Local {
        facilitator_card: Option<RegisteredCard>,
    },
    /// Lets the portal decide via `POST payment/authorize-card`.
    Remote,
}

impl PaymentGateway {
    pub fn from_config(config: &PaymentConfig) -> Self {
        match config.gateway {
            GatewayKind::Local => PaymentGateway::Local {
                facilitator_card: config.facilitator_card.clone(),
            },
            GatewayKind::Remote => PaymentGateway::Remote,
        }
    }

    /// Authorizes the card for the chosen method.
    ///
    /// # Errors
    /// Returns a [`Decline`] carrying the message to show next to the card form.
    pub async fn authorize(
        &self,
        api: &ApiClient,
        method: PaymentMethod,
        card: &CardDetails,
    ) -> Result<(), Decline> {
        match self {
            PaymentGateway::Local { facilitator_card } => {
                authorize_locally(facilitator_card.as_ref(), method, card)
            }
            PaymentGateway::Remote => match api.authorize_payment(method, card).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind == ApiErrorKind::Rejected => Err(Decline::new(err.message)),
                Err(err) => {
                    tracing::warn!(error = %err, kind = %err.kind, "payment authorization unavailable");
                    Err(Decline::new(format!("Payment could not be authorized: {err}")))
                }
            },
        }
    }
}

fn authorize_locally(
    registered: Option<&RegisteredCard>,
    method: PaymentMethod,
    card: &CardDetails,
) -> Result<(), Decline> {
    match method {
        PaymentMethod::SelfPay => Err(Decline::new(SELF_PAY_DECLINED)),
        PaymentMethod::Facilitator => {
            let Some(registered) = registered else {
                tracing::warn!("no facilitator card registered in config; declining");
                return Err(Decline::new(FACILITATOR_DECLINED));
            };
            if card.number == registered.number
                && card.expiry == registered.expiry
                && card.cvv == registered.cvv
            {
                Ok(())
            } else {
                Err(Decline::new(FACILITATOR_DECLINED))
            }
        }
    }
}

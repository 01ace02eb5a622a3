//! Payment confirmation.
//!
//! After checkout the portal polls the payment record until the processor
//! settles it. The wait is capped (see [`PollPolicy::PAYMENT`]); running out
//! of attempts reports a timeout but says nothing about the payment itself,
//! which may still settle later.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::item_path;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::poll::{PollPolicy, poll_until};

pub const PAYMENTS_PATH: &str = "/api/billing/payments";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Succeeded,
    Failed,
}

impl PaymentStatus {
    #[must_use]
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    #[serde(default)]
    pub status: PaymentStatus,
    /// Amount in minor currency units.
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub currency: String,
}

#[derive(Clone)]
pub struct Billing {
    api: ApiClient,
}

impl Billing {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Propagates transport and status errors.
    pub async fn payment(&self, id: &str) -> Result<Payment, ClientError> {
        self.api.get(&item_path(PAYMENTS_PATH, id)).await
    }

    /// Poll until the payment settles, giving up after 30 attempts 5 s apart.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TimedOut`] when the payment is still pending
    /// after the last attempt.
    pub async fn wait(&self, id: &str) -> Result<Payment, ClientError> {
        self.wait_with(id, PollPolicy::PAYMENT).await
    }

    /// # Errors
    ///
    /// See [`Billing::wait`].
    pub async fn wait_with(&self, id: &str, policy: PollPolicy) -> Result<Payment, ClientError> {
        let payment = poll_until(policy, || self.payment(id), |p| p.status.is_settled()).await?;
        info!(%id, status = ?payment.status, "payment settled");
        Ok(payment)
    }
}

#[cfg(test)]
#[path = "billing_test.rs"]
mod tests;

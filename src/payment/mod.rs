use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpiProvider {
    Gpay,
    Phonepe,
    Paytm,
    Other,
}

impl fmt::Display for UpiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpiProvider::Gpay => "gpay",
            UpiProvider::Phonepe => "phonepe",
            UpiProvider::Paytm => "paytm",
            UpiProvider::Other => "other",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: u32,
    pub provider: UpiProvider,
    pub upi_id: Option<String>,
}

/// Outcome of a confirmed payment, consumed immediately by the booking
/// builder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub amount: u32,
    pub upi_id: String,
    pub provider: UpiProvider,
    pub transaction_id: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum PaymentError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("payment was cancelled before completing")]
    Cancelled,
}

/// Seam between the booking path and whatever settles the money. The rest of
/// the crate only sees this trait, so a real gateway can replace the
/// simulator without touching booking code.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn process(&self, request: PaymentRequest) -> Result<PaymentDetails, PaymentError>;
}

/// Stand-in gateway: validates, suspends for a fixed interval, then resolves
/// with a fresh transaction id. Never talks to a payment network.
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn process(&self, request: PaymentRequest) -> Result<PaymentDetails, PaymentError> {
        let upi_id = resolve_upi_id(&request)?;
        tokio::time::sleep(self.delay).await;

        Ok(PaymentDetails {
            amount: request.amount,
            upi_id,
            provider: request.provider,
            transaction_id: new_transaction_id(),
        })
    }
}

/// A named provider falls back to its default handle; "other" must carry an
/// explicit UPI id.
fn resolve_upi_id(request: &PaymentRequest) -> Result<String, ValidationError> {
    match request.upi_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_owned()),
        _ if request.provider == UpiProvider::Other => Err(ValidationError::MissingField("upi_id")),
        _ => Ok(format!("{}@user", request.provider)),
    }
}

pub fn new_transaction_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("TXN{}{}", Utc::now().timestamp_millis(), &suffix[..6])
}

/// An in-flight payment that the user may still walk away from. Dropping the
/// handle does not stop the task; cancelling does.
pub struct PendingPayment {
    handle: JoinHandle<Result<PaymentDetails, PaymentError>>,
}

impl PendingPayment {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub async fn wait(self) -> Result<PaymentDetails, PaymentError> {
        match self.handle.await {
            Ok(result) => result,
            Err(_) => Err(PaymentError::Cancelled),
        }
    }
}

/// Spawns the gateway call so the caller can keep servicing events while the
/// payment settles.
pub fn begin_payment(gateway: Arc<dyn PaymentGateway>, request: PaymentRequest) -> PendingPayment {
    let handle = tokio::spawn(async move { gateway.process(request).await });
    PendingPayment { handle }
}

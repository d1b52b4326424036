use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway rejected message to {to}: {reason}")]
    Rejected { to: String, reason: String },

    #[error("gateway unreachable: {0}")]
    Unreachable(String),
}

/// One outbound SMS send. Implementations wrap the actual provider.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Returns the provider's message id on acceptance
    async fn send(&self, to_phone: &str, body: &str) -> Result<String, GatewayError>;
}

/// Stand-in provider that logs instead of sending
pub struct LogGateway;

#[async_trait]
impl MessagingGateway for LogGateway {
    async fn send(&self, to_phone: &str, body: &str) -> Result<String, GatewayError> {
        info!("[SMS] to: {} | message: {}", to_phone, body);
        Ok(format!("mock-{}", uuid::Uuid::new_v4()))
    }
}

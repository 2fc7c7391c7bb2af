//! # Inbound Ports

use crate::domain::connection_request::ConnectionRequest;
use crate::domain::errors::ConnectionError;
use crate::domain::response::ConnectionResult;

/// Establish-connection API.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait::async_trait]
pub trait ConnectionApi: Send + Sync {
    /// Sign `request`, send it, and return the tri-state outcome.
    ///
    /// # Errors
    /// * `ConnectionError::Transport` - no response body was obtained
    async fn establish(
        &self,
        request: &ConnectionRequest,
    ) -> Result<ConnectionResult, ConnectionError>;
}

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::control::{Clock, QueryPlane};
use crate::provider::{DataProvider, ProviderError, ResponseStatus};

#[derive(Debug)]
pub enum SessionError {
    Rejected(ResponseStatus),
    Provider(ProviderError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(status) => write!(
                f,
                "vendor login rejected ({}): {}",
                status.code, status.message
            ),
            Self::Provider(err) => write!(f, "vendor login failed: {err}"),
        }
    }
}

impl Error for SessionError {}

impl From<ProviderError> for SessionError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

/// Authenticated vendor session shared by every tool invocation.
///
/// Established once at startup and released once at shutdown.
pub struct VendorSession<P: DataProvider> {
    provider: Arc<P>,
    control: QueryPlane<P>,
}

impl<P: DataProvider> Clone for VendorSession<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            control: self.control.clone(),
        }
    }
}

impl<P: DataProvider> VendorSession<P> {
    /// Logs in to the vendor.
    ///
    /// # Errors
    /// Returns `SessionError::Rejected` when the vendor refuses the login and
    /// `SessionError::Provider` when it cannot be reached.
    pub async fn establish(provider: P) -> Result<Self, SessionError> {
        Self::from_arc(Arc::new(provider)).await
    }

    /// Logs in through a shared provider.
    ///
    /// # Errors
    /// See [`VendorSession::establish`].
    pub async fn from_arc(provider: Arc<P>) -> Result<Self, SessionError> {
        let status = provider.login().await?;
        if !status.is_success() {
            return Err(SessionError::Rejected(status));
        }
        info!("vendor session established");
        let control = QueryPlane::new(provider.clone());
        Ok(Self { provider, control })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.control = self.control.with_clock(clock);
        self
    }

    #[must_use]
    pub fn provider(&self) -> Arc<P> {
        self.provider.clone()
    }

    #[must_use]
    pub fn control(&self) -> QueryPlane<P> {
        self.control.clone()
    }

    /// Logs out. Failures are logged and otherwise ignored.
    pub async fn release(&self) {
        match self.provider.logout().await {
            Ok(()) => info!("vendor session released"),
            Err(err) => warn!(error = %err, "vendor logout failed"),
        }
    }
}

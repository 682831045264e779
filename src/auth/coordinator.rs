//! Single-flight coordination of the credential refresh exchange.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{sync::Mutex, time::timeout};

use super::{error::AuthError, session::SessionStore};
use crate::{
    persistence::PreferenceStore,
    providers::{AuthExchange, SourceError},
};

/// Ensures at most one refresh exchange is in flight session-wide.
///
/// The internal mutex is the refresh state: unlocked means idle, locked means
/// an exchange is in flight. Callers that lose the race block on the lock
/// within a bounded wait budget and, once through, observe the winner's
/// outcome instead of issuing their own exchange: a renewed access credential
/// is returned directly, and a failed exchange (detected by the completed
/// attempt count having advanced while the credential stayed put) is reported
/// as [`AuthError::RefreshFailed`] without contacting the collaborator again.
/// Exhausting the wait budget returns the caller's current credential rather
/// than an error: for a long-running unattended display, availability beats
/// freshness.
pub struct RefreshCoordinator {
    session: Arc<SessionStore>,
    exchange: Arc<dyn AuthExchange>,
    store: Arc<dyn PreferenceStore>,
    // Locked iff a refresh exchange is in flight; holds the failure message
    // of the most recent attempt, for waiters that overlapped with it.
    refresh_lock: Mutex<Option<String>>,
    // Count of completed exchange attempts, successful or not.
    completed_exchanges: AtomicU64,
    wait_budget: Duration,
}

impl RefreshCoordinator {
    /// Creates a coordinator over the given session, exchange collaborator,
    /// and credential persistence.
    pub fn new(
        session: Arc<SessionStore>,
        exchange: Arc<dyn AuthExchange>,
        store: Arc<dyn PreferenceStore>,
        wait_budget: Duration,
    ) -> Self {
        Self {
            session,
            exchange,
            store,
            refresh_lock: Mutex::new(None),
            completed_exchanges: AtomicU64::new(0),
            wait_budget,
        }
    }

    /// Returns an access credential expected to be fresher than `observed`,
    /// the credential the caller just saw rejected.
    ///
    /// Exactly one outbound refresh call is made per overlapping wave of
    /// rejections. On exchange failure the session is left untouched and
    /// [`AuthError::RefreshFailed`] is returned; the caller surfaces its
    /// original 401 instead of escalating.
    pub async fn ensure_fresh(&self, observed: &str) -> Result<String, AuthError> {
        if self.session.refresh_credential().await.is_none() {
            return Err(AuthError::NoRefreshCredential);
        }

        let wave = self.completed_exchanges.load(Ordering::Acquire);
        let mut guard = match timeout(self.wait_budget, self.refresh_lock.lock()).await {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!(
                    budget_ms = self.wait_budget.as_millis() as u64,
                    "Refresh wait budget exhausted; proceeding with current credential"
                );
                return self
                    .session
                    .access_credential()
                    .await
                    .ok_or(AuthError::NoAccessCredential);
            }
        };

        // Another caller may have completed an exchange while we waited.
        if let Some(current) = self.session.access_credential().await {
            if current != observed {
                tracing::debug!("Credential already renewed by a concurrent caller");
                return Ok(current);
            }
        }
        if self.completed_exchanges.load(Ordering::Acquire) != wave {
            // The exchange we overlapped with completed without renewing the
            // credential: it failed, and that failure covers this wave too.
            let message = (*guard)
                .clone()
                .unwrap_or_else(|| "refresh exchange failed".to_string());
            tracing::debug!(error = %message, "Sharing the failure of a concurrent exchange");
            return Err(AuthError::RefreshFailed(SourceError::Transport(message)));
        }

        let refresh_credential =
            self.session.refresh_credential().await.ok_or(AuthError::NoRefreshCredential)?;

        tracing::debug!("Starting credential refresh exchange");
        let result = self.exchange.refresh(&refresh_credential).await;
        self.completed_exchanges.fetch_add(1, Ordering::Release);
        let pair = match result {
            Ok(pair) => pair,
            Err(e) => {
                *guard = Some(e.to_string());
                return Err(AuthError::RefreshFailed(e));
            }
        };
        *guard = None;

        let access = pair.access_credential.clone();
        self.session.install(pair.clone()).await;
        if let Err(e) = self.store.store_credentials(&pair).await {
            tracing::warn!(error = %e, "Failed to persist renewed credentials");
        }
        tracing::info!("Session credentials renewed");

        drop(guard);
        Ok(access)
    }
}

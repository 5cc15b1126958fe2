//! Credential refresh service contracts and adapters.

use std::{cell::RefCell, collections::VecDeque, future::Future, pin::Pin, rc::Rc};

use chrono::{DateTime, Utc};

use crate::error::GalleryError;

/// Object-safe boxed future used by [`CredentialRefreshService`].
pub type CredentialFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service that asks the proxy to swap in a fresh storage credential.
pub trait CredentialRefreshService {
    /// Refreshes the credential and returns the time the swap happened.
    fn refresh<'a>(&'a self) -> CredentialFuture<'a, Result<DateTime<Utc>, GalleryError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Refresh adapter for hosts without a refresh collaborator; always fails.
pub struct NoopCredentialRefresh;

impl CredentialRefreshService for NoopCredentialRefresh {
    fn refresh<'a>(&'a self) -> CredentialFuture<'a, Result<DateTime<Utc>, GalleryError>> {
        Box::pin(async {
            Err(GalleryError::Refresh {
                message: "credential refresh is not available on this host".to_string(),
            })
        })
    }
}

#[derive(Debug, Default)]
struct MemoryCredentialInner {
    outcomes: VecDeque<Result<DateTime<Utc>, GalleryError>>,
    calls: usize,
}

#[derive(Debug, Clone, Default)]
/// In-memory refresh adapter returning queued outcomes, then succeeding at the epoch.
pub struct MemoryCredentialRefresh {
    inner: Rc<RefCell<MemoryCredentialInner>>,
}

impl MemoryCredentialRefresh {
    /// Queues the outcome of the next call.
    pub fn push_outcome(&self, outcome: Result<DateTime<Utc>, GalleryError>) {
        self.inner.borrow_mut().outcomes.push_back(outcome);
    }

    /// Number of refresh calls made so far.
    pub fn calls(&self) -> usize {
        self.inner.borrow().calls
    }
}

impl CredentialRefreshService for MemoryCredentialRefresh {
    fn refresh<'a>(&'a self) -> CredentialFuture<'a, Result<DateTime<Utc>, GalleryError>> {
        Box::pin(async move {
            let mut inner = self.inner.borrow_mut();
            inner.calls += 1;
            inner
                .outcomes
                .pop_front()
                .unwrap_or(Ok(DateTime::<Utc>::UNIX_EPOCH))
        })
    }
}

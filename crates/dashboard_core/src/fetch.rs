//! Fetch bookkeeping shared by the list views.
//!
//! Every fetch is stamped with a [`FetchTicket`] from a counter that only
//! grows. A response is applied only when its ticket is the most recently
//! issued one, so an earlier, slower response can never overwrite a later one.

use shared::error::DashboardError;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Loading,
    Loaded(Vec<T>),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FetchTracker<T> {
    state: FetchState<T>,
    issued: u64,
}

impl<T> Default for FetchTracker<T> {
    fn default() -> Self {
        Self {
            state: FetchState::Loading,
            issued: 0,
        }
    }
}

impl<T> FetchTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fetch: the view shows its loading state until the response
    /// for the returned ticket arrives.
    pub fn begin(&mut self) -> FetchTicket {
        self.issued += 1;
        self.state = FetchState::Loading;
        FetchTicket(self.issued)
    }

    /// Applies a response. Returns `false` (and changes nothing) when the
    /// ticket has been superseded.
    pub fn finish(&mut self, ticket: FetchTicket, result: Result<Vec<T>, DashboardError>) -> bool {
        if !self.is_current(ticket) {
            warn!(
                ticket = ticket.0,
                latest = self.issued,
                "fetch: discarding stale response"
            );
            return false;
        }
        self.state = match result {
            Ok(rows) => FetchState::Loaded(rows),
            Err(err) => FetchState::Failed(err.to_string()),
        };
        true
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    /// Loaded rows, empty while loading or after a failure.
    pub fn rows(&self) -> &[T] {
        match &self.state {
            FetchState::Loaded(rows) => rows,
            FetchState::Loading | FetchState::Failed(_) => &[],
        }
    }
}

//! Observable load/error state shared by the view-models.

use crate::api::ApiError;

/// What a view-model is doing, as presentation sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing in flight and no error to show.
    #[default]
    Idle,
    /// A full list fetch is in flight.
    Loading,
    /// The most recent failure, as a user-facing message.
    Error(String),
}

impl LoadState {
    /// Returns `true` while a list fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The recorded error message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// An insertion-ordered cache of server entities plus what is needed to
/// derive its [`LoadState`].
///
/// View-models keep one behind a mutex and only touch it between awaits,
/// so whichever response resolves last is the one the cache reflects.
/// Full-list fetches are counted rather than flagged: the cache reports
/// `Loading` until every fetch that began has settled, whatever else
/// succeeds or fails meanwhile.
#[derive(Debug)]
pub(crate) struct CachedList<T> {
    pub(crate) items: Vec<T>,
    loads_in_flight: usize,
    last_error: Option<String>,
}

impl<T> Default for CachedList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loads_in_flight: 0,
            last_error: None,
        }
    }
}

impl<T> CachedList<T> {
    /// Current state. An in-flight fetch takes precedence over an error.
    pub(crate) fn state(&self) -> LoadState {
        if self.loads_in_flight > 0 {
            LoadState::Loading
        } else {
            self.last_error
                .clone()
                .map_or(LoadState::Idle, LoadState::Error)
        }
    }

    /// The most recent failure, still reported while a fetch is in flight.
    pub(crate) fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) const fn is_loading(&self) -> bool {
        self.loads_in_flight > 0
    }

    /// Marks the start of a full-list fetch. Pair with [`Self::settle_load`].
    pub(crate) const fn begin_load(&mut self) {
        self.loads_in_flight += 1;
    }

    /// Applies the outcome of one operation.
    ///
    /// On success `apply` mutates the cache and produces the caller's
    /// value, and a previously recorded error is cleared. On failure the
    /// items are left as they were and the error is recorded.
    pub(crate) fn settle<V, R>(
        &mut self,
        op: &'static str,
        result: Result<V, ApiError>,
        apply: impl FnOnce(&mut Vec<T>, V) -> R,
    ) -> Result<R, ApiError> {
        match result {
            Ok(value) => {
                let out = apply(&mut self.items, value);
                self.last_error = None;
                Ok(out)
            }
            Err(e) => Err(self.record_failure(op, e)),
        }
    }

    /// Records `err` as the current error and hands it back.
    pub(crate) fn record_failure(&mut self, op: &'static str, err: ApiError) -> ApiError {
        tracing::warn!(op, error = %err, "operation failed");
        self.last_error = Some(err.to_string());
        err
    }

    /// Settles a full-list fetch started with [`Self::begin_load`]:
    /// replaces the items on success and ends that fetch either way.
    pub(crate) fn settle_load(
        &mut self,
        op: &'static str,
        result: Result<Vec<T>, ApiError>,
    ) -> Result<(), ApiError> {
        self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
        self.settle(op, result, |items, fresh| *items = fresh)
    }
}

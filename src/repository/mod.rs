//! Annotation repository
//!
//! `AnnotationRepository` is the single entry point for transports. It
//! resolves tags against the term catalog, enforces the one-active-annotation
//! per slot rule, turns edits into version chains, maintains groups and
//! serves cursor-paginated listings. Persistence is delegated to an
//! `AnnotationStore`.

mod annotations;
mod error;
mod groups;
mod term;

pub use error::{ErrorKind, RepoError, RepoResult};

use crate::config::RepositoryConfig;
use crate::notify::{AnnotationEvent, NoopNotifier, Notifier};
use crate::query::{translate_filter, Cursor, FilterFragment, PageRequest, ANNOTATION_FIELDS};
use crate::storage::{AnnotationStore, StorageError};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// Page size used when a listing asks for `limit == 0`
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page a listing may ask for
pub const MAX_PAGE_SIZE: usize = 10_000;

/// Issues creation timestamps that strictly increase per repository, so
/// cursors never tie between two writes of the same process
#[derive(Debug, Default)]
struct MonotonicClock {
    last_millis: Mutex<i64>,
}

impl MonotonicClock {
    fn now(&self) -> RepoResult<DateTime<Utc>> {
        let mut last = self
            .last_millis
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        let now = Utc::now().timestamp_millis();
        let next = if now > *last { now } else { *last + 1 };
        *last = next;
        DateTime::from_timestamp_millis(next)
            .ok_or_else(|| RepoError::InvalidAttributes(format!("timestamp {next} out of range")))
    }
}

/// Repository over an annotation store
pub struct AnnotationRepository<S: AnnotationStore> {
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
    default_page_size: usize,
    clock: MonotonicClock,
}

impl<S: AnnotationStore> AnnotationRepository<S> {
    /// Create a repository that does not notify anyone
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            notifier: Arc::new(NoopNotifier),
            default_page_size: DEFAULT_PAGE_SIZE,
            clock: MonotonicClock::default(),
        }
    }

    /// Create a repository using the listing settings of `config`
    pub fn from_config(store: Arc<S>, config: &RepositoryConfig) -> Self {
        Self::new(store).with_default_page_size(config.default_page_size)
    }

    /// Send committed creates and edits to `notifier`
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn now(&self) -> RepoResult<DateTime<Utc>> {
        self.clock.now()
    }

    fn notify(&self, event: AnnotationEvent<'_>) -> RepoResult<()> {
        self.notifier.notify(&event).map_err(|err| {
            tracing::error!(
                subject = event.subject(),
                annotation = %event.document().key,
                error = %err,
                "notification failed after commit"
            );
            RepoError::Notification(err)
        })
    }

    fn page_request(&self, cursor: Cursor, limit: usize) -> RepoResult<PageRequest> {
        if cursor.as_millis() < 0 {
            return Err(RepoError::InvalidAttributes(format!(
                "cursor must not be negative, got {cursor}"
            )));
        }
        if limit > MAX_PAGE_SIZE {
            return Err(RepoError::InvalidAttributes(format!(
                "limit must not exceed {MAX_PAGE_SIZE}, got {limit}"
            )));
        }
        let limit = if limit == 0 { self.default_page_size } else { limit };
        Ok(PageRequest::new(cursor, limit))
    }
}

/// Translate an optional filter expression; a blank expression means no filter
fn filter_fragment(filter: Option<&str>) -> RepoResult<Option<FilterFragment>> {
    match filter.map(str::trim) {
        None | Some("") => Ok(None),
        Some(expr) => Ok(Some(translate_filter(expr, ANNOTATION_FIELDS)?)),
    }
}

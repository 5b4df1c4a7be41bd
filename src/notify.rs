//! Write notifications
//!
//! A notifier is called synchronously after a create or edit has been
//! committed. If it fails, the repository reports the write as failed even
//! though the store already holds it; callers decide whether to retry the
//! notification or reconcile.

use crate::annotation::AnnotationDocument;
use thiserror::Error;

/// Error returned by a notifier
#[derive(Debug, Error)]
#[error("{0}")]
pub struct NotifyError(pub String);

/// A committed write
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnnotationEvent<'a> {
    Created(&'a AnnotationDocument),
    Updated(&'a AnnotationDocument),
}

impl AnnotationEvent<'_> {
    pub fn document(&self) -> &AnnotationDocument {
        match self {
            AnnotationEvent::Created(doc) | AnnotationEvent::Updated(doc) => doc,
        }
    }

    /// Subject name subscribers listen on
    pub fn subject(&self) -> &'static str {
        match self {
            AnnotationEvent::Created(_) => "annotation.create",
            AnnotationEvent::Updated(_) => "annotation.update",
        }
    }
}

/// Receiver of committed writes
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &AnnotationEvent<'_>) -> Result<(), NotifyError>;
}

/// Notifier that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _event: &AnnotationEvent<'_>) -> Result<(), NotifyError> {
        Ok(())
    }
}

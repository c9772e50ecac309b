//! Presentation state as an explicit value.
//!
//! A front end keeps one [`SessionView`] in a variable it owns, passes it to
//! its render function, and replaces it with the value returned by
//! [`SessionView::begin`] / [`SessionView::finish`]. Nothing is global and
//! nothing mutates in place, so a render never observes a half-updated
//! session.

use crate::output::ConversionResult;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Snapshot of what the user is doing and has done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// The file currently (or most recently) being converted.
    pub current_file: Option<PathBuf>,
    /// Every finished conversion, oldest first.
    pub history: Vec<ConversionResult>,
    /// True between `begin` and the matching `finish`.
    pub is_converting: bool,
}

impl SessionView {
    pub fn new() -> Self {
        Self::default()
    }

    /// A conversion of `path` has started.
    #[must_use]
    pub fn begin(&self, path: impl AsRef<Path>) -> Self {
        Self {
            current_file: Some(path.as_ref().to_path_buf()),
            history: self.history.clone(),
            is_converting: true,
        }
    }

    /// A conversion has finished; record its result.
    #[must_use]
    pub fn finish(&self, result: ConversionResult) -> Self {
        let mut history = self.history.clone();
        history.push(result);
        Self {
            current_file: self.current_file.clone(),
            history,
            is_converting: false,
        }
    }

    /// The most recent result, if any.
    pub fn last(&self) -> Option<&ConversionResult> {
        self.history.last()
    }

    pub fn succeeded(&self) -> usize {
        self.history.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.history.len() - self.succeeded()
    }
}

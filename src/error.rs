// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types shared by the timeline model, codecs and session.

use std::io;

use thiserror::Error;

use crate::model::Beat;

/// Errors raised by timeline operations.
///
/// Every operation that returns one of these leaves the song and its layers
/// exactly as they were before the call.
#[derive(Debug, Error)]
pub enum ComposerError {
    /// A value was outside its allowed range or otherwise malformed
    #[error("validation failed: {0}")]
    Validation(String),

    /// A placement or move would intersect an existing unit
    #[error("beats {start}..={end} overlap an existing unit")]
    Overlap { start: Beat, end: Beat },

    /// A beat query was given a negative position
    #[error("beat {0} is out of range (must be >= 0)")]
    Range(Beat),

    /// Project text could not be parsed
    #[error("line {line}: {message}")]
    Format { line: usize, message: String },

    /// The unit to edit is not part of the layer
    #[error("unit is not in this layer")]
    UnitNotFound,

    /// A save was requested but no file path is associated with the song
    #[error("no file path is open")]
    NoOpenPath,

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ComposerError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ComposerError::Validation(message.into())
    }

    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        ComposerError::Format {
            line,
            message: message.into(),
        }
    }
}

/// Result alias for timeline operations
pub type Result<T> = std::result::Result<T, ComposerError>;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Doculens.

use thiserror::Error;

/// Top-level error type for all Doculens operations.
#[derive(Debug, Error)]
pub enum DoculensError {
    // -- Frame source --
    #[error("could not open frame source {source_name}: {reason}")]
    SourceOpen { source_name: String, reason: String },

    #[error("failed to read frame: {0}")]
    FrameRead(String),

    // -- Geometry --
    #[error("expected exactly 4 corner points, got {0}")]
    InvalidQuadrilateral(usize),

    #[error("corner points do not define a perspective transform")]
    DegenerateTransform,

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Images / output --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DoculensError {
    /// Whether the error ends the run rather than just the current frame.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SourceOpen { .. } | Self::InvalidConfig(_) | Self::Io(_) | Self::Serialization(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DoculensError>;

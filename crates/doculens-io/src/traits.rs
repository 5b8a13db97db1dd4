// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trait definitions for frame input and result output.

use doculens_core::error::Result;
use image::{DynamicImage, RgbImage};

/// A finite or endless stream of video frames.
pub trait FrameSource {
    /// Pull the next frame. Returns `Ok(None)` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<DynamicImage>>;

    /// Nominal frame rate, `None` when the source does not know it.
    fn fps(&self) -> Option<f64> {
        None
    }
}

/// What the sink wants the run loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkControl {
    Continue,
    /// The user (or a frame budget) asked to end the run.
    Stop,
}

/// A display surface with named windows.
pub trait FrameSink {
    /// Present `image` in the window called `window`.
    fn show(&mut self, window: &str, image: &RgbImage) -> Result<SinkControl>;

    /// Called once after every window of a frame has been shown.
    fn end_frame(&mut self) -> SinkControl {
        SinkControl::Continue
    }
}

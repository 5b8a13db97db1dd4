// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// doculens-io: Where frames come from and where results go.
//
// The scanner itself never touches devices or windows. Callers hand it frames
// pulled from a `FrameSource` and push named output images into a `FrameSink`.

pub mod fs;
pub mod traits;

pub use fs::{DirectorySink, ImageSequenceSource};
pub use traits::{FrameSink, FrameSource, SinkControl};

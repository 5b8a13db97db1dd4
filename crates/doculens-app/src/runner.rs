// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run loop: pull frames from a source, scan each one, and push the
// "Work Flow" composite and "Result" image to a sink.

use std::thread;
use std::time::Duration;

use doculens_core::error::Result;
use doculens_io::{FrameSink, FrameSource, SinkControl};
use doculens_scan::DocumentScanner;
use tracing::{debug, info, instrument, warn};

/// Name of the 2x2 debug composite window.
pub const WORKFLOW_WINDOW: &str = "Work Flow";
/// Name of the rectified (or fallback) result window.
pub const RESULT_WINDOW: &str = "Result";

/// Frame rate assumed when the source cannot report one.
pub const DEFAULT_FPS: f64 = 30.0;

/// Knobs that only matter to the run loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Overrides the frame rate reported by the source.
    pub fps: Option<f64>,
    /// Sleep between frames to play back at the frame rate.
    pub pace: bool,
}

/// Counters reported when the run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub detected: u64,
    /// Frames that could not be read and were skipped.
    pub skipped: u64,
    /// `true` when the sink asked to stop before the stream ended.
    pub stopped: bool,
}

/// Delay between frames for a given rate, `1000 / fps` milliseconds.
///
/// Missing, zero, negative, or non-finite rates fall back to [`DEFAULT_FPS`].
pub fn frame_delay(fps: Option<f64>) -> Duration {
    let fps = fps.filter(|f| f.is_finite() && *f > 0.0).unwrap_or(DEFAULT_FPS);
    Duration::from_millis((1000.0 / fps) as u64)
}

/// Scan frames until the source is exhausted or the sink asks to stop.
///
/// Unreadable frames are logged and skipped; only fatal errors (see
/// `DoculensError::is_fatal`) and sink write failures end the run early.
#[instrument(skip_all, fields(pace = options.pace))]
pub fn run(
    scanner: &DocumentScanner,
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    options: RunOptions,
) -> Result<RunSummary> {
    let delay = frame_delay(options.fps.or_else(|| source.fps()));
    debug!(delay_ms = delay.as_millis() as u64, "Frame pacing");

    let mut summary = RunSummary::default();
    loop {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                info!(frames = summary.frames, "End of stream");
                break;
            }
            Err(err) if !err.is_fatal() => {
                warn!(error = %err, "Skipping unreadable frame");
                summary.skipped += 1;
                continue;
            }
            Err(err) => return Err(err),
        };

        let result = scanner.process_frame(&frame);
        summary.frames += 1;
        if result.detected() {
            summary.detected += 1;
        }

        let mut control = SinkControl::Continue;
        if let Some(composite) = &result.composite {
            control = sink.show(WORKFLOW_WINDOW, composite)?;
        }
        if control == SinkControl::Continue {
            control = sink.show(RESULT_WINDOW, result.display())?;
        }
        if control == SinkControl::Continue {
            control = sink.end_frame();
        }
        if control == SinkControl::Stop {
            info!(frames = summary.frames, "Stop requested");
            summary.stopped = true;
            break;
        }

        if options.pace {
            thread::sleep(delay);
        }
    }

    Ok(summary)
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filesystem adapters: read frames from an image sequence on disk and write
// each named output window as a numbered PNG.

use std::path::{Path, PathBuf};

use doculens_core::error::{DoculensError, Result};
use image::{DynamicImage, ImageFormat, RgbImage};
use tracing::{debug, info, instrument, warn};

use crate::traits::{FrameSink, FrameSource, SinkControl};

/// File extensions treated as frames.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

// ---------------------------------------------------------------------------
// ImageSequenceSource
// ---------------------------------------------------------------------------

/// Frames read one by one from image files, in file name order.
#[derive(Debug, Clone)]
pub struct ImageSequenceSource {
    frames: Vec<PathBuf>,
    cursor: usize,
    fps: Option<f64>,
}

impl ImageSequenceSource {
    /// Open a directory of frames, or a single image file as a one-frame stream.
    ///
    /// Fails with [`DoculensError::SourceOpen`] when the path does not exist or
    /// holds no recognised image files.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let open_error = |reason: String| DoculensError::SourceOpen {
            source_name: path.display().to_string(),
            reason,
        };

        let frames = if path.is_file() {
            vec![path.to_path_buf()]
        } else if path.is_dir() {
            let entries = std::fs::read_dir(path).map_err(|err| open_error(err.to_string()))?;
            let mut frames = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|err| open_error(err.to_string()))?;
                let candidate = entry.path();
                if candidate.is_file() && is_image_file(&candidate) {
                    frames.push(candidate);
                }
            }
            frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            frames
        } else {
            return Err(open_error("no such file or directory".into()));
        };

        if frames.is_empty() {
            return Err(open_error("no image files found".into()));
        }

        info!(frames = frames.len(), "Frame source opened");
        Ok(Self {
            frames,
            cursor: 0,
            fps: None,
        })
    }

    /// Attach a nominal frame rate for pacing.
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Number of frames in the sequence; never zero after `open`.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frames not yet returned by `next_frame`.
    pub fn remaining(&self) -> usize {
        self.frames.len() - self.cursor
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<DynamicImage>> {
        let Some(path) = self.frames.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;

        let frame = image::open(path).map_err(|err| {
            DoculensError::FrameRead(format!("{}: {}", path.display(), err))
        })?;
        debug!(
            path = %path.display(),
            width = frame.width(),
            height = frame.height(),
            "Frame read"
        );
        Ok(Some(frame))
    }

    fn fps(&self) -> Option<f64> {
        self.fps
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// DirectorySink
// ---------------------------------------------------------------------------

/// Writes every shown window as `<frame:05>_<window>.png` in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    frame: u64,
    max_frames: Option<u64>,
}

impl DirectorySink {
    /// Create the output directory (and parents) if needed.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        debug!("Output directory ready");
        Ok(Self {
            dir,
            frame: 0,
            max_frames: None,
        })
    }

    /// Ask the run loop to stop after `max_frames` frames.
    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of completed frames.
    pub fn frames_written(&self) -> u64 {
        self.frame
    }

    /// Output path for `window` in the current frame.
    pub fn path_for(&self, window: &str) -> PathBuf {
        self.dir.join(format!("{:05}_{}.png", self.frame, window_slug(window)))
    }

    fn budget_spent(&self) -> bool {
        self.max_frames.is_some_and(|max| self.frame >= max)
    }
}

impl FrameSink for DirectorySink {
    fn show(&mut self, window: &str, image: &RgbImage) -> Result<SinkControl> {
        if self.budget_spent() {
            return Ok(SinkControl::Stop);
        }
        let path = self.path_for(window);
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|err| DoculensError::ImageError(format!("{}: {}", path.display(), err)))?;
        debug!(path = %path.display(), "Window written");
        Ok(SinkControl::Continue)
    }

    fn end_frame(&mut self) -> SinkControl {
        self.frame += 1;
        if self.budget_spent() {
            warn!(frames = self.frame, "Frame budget reached, stopping");
            SinkControl::Stop
        } else {
            SinkControl::Continue
        }
    }
}

/// `"Work Flow"` becomes `"work-flow"`.
fn window_slug(window: &str) -> String {
    let slug: String = window
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    if slug.is_empty() { "window".into() } else { slug }
}

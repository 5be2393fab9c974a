//! Variant resizing: box fitting and crop-to-fill.
//!
//! Dimension math is kept in pure functions so the invariants can be tested
//! without touching pixels:
//!
//! | Mode | Scale | Output |
//! |---|---|---|
//! | [`ResizeMode::Fit`] | `min(tw/sw, th/sh)`, capped at 1.0 | `round(sw*s) x round(sh*s)`, never larger than the box or the source |
//! | [`ResizeMode::CropFit`] | `max(tw/sw, th/sh)`, may upscale | exactly `tw x th`, centered crop of the source scaled to the box |
//!
//! Crop-fit picks its window in source pixels and resamples only that window,
//! so no intermediate buffer is ever larger than the source or the target.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

/// How a source is mapped onto a target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Scale down to fit inside the box, preserving aspect ratio
    Fit,
    /// Scale to cover the box, then center-crop to it
    CropFit,
}

/// Planned geometry for a crop-fit resize, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropPlan {
    /// Size of the source window that covers the target once scaled
    pub window: (u32, u32),
    /// Top-left corner of the window within the source
    pub offset: (u32, u32),
    /// Final output dimensions (always the target box)
    pub output: (u32, u32),
}

/// Output dimensions for fit mode.
pub fn fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;
    if src_w == 0 || src_h == 0 {
        return (src_w, src_h);
    }

    let scale = (tgt_w as f64 / src_w as f64)
        .min(tgt_h as f64 / src_h as f64)
        .min(1.0);
    if scale >= 1.0 {
        return source;
    }

    let w = ((src_w as f64 * scale).round() as u32).clamp(1, tgt_w);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, tgt_h);
    (w, h)
}

/// Centered source window for crop-fit mode.
pub fn crop_fit_plan(source: (u32, u32), target: (u32, u32)) -> CropPlan {
    let (src_w, src_h) = (source.0.max(1), source.1.max(1));
    let (tgt_w, tgt_h) = target;

    let scale = (tgt_w as f64 / src_w as f64).max(tgt_h as f64 / src_h as f64);

    // One axis spans the whole source; float error must not push it past the edge
    let window_w = ((tgt_w as f64 / scale).round() as u32).clamp(1, src_w);
    let window_h = ((tgt_h as f64 / scale).round() as u32).clamp(1, src_h);

    CropPlan {
        window: (window_w, window_h),
        offset: ((src_w - window_w) / 2, (src_h - window_h) / 2),
        output: (tgt_w, tgt_h),
    }
}

/// Resamples decoded images into variant geometry.
#[derive(Debug, Clone, Copy)]
pub struct Resizer {
    filter: FilterType,
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(FilterType::Lanczos3)
    }
}

impl Resizer {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    /// Resize `source` into a `target` box with the given mode.
    ///
    /// Always derives from the full source; callers never chain variants.
    pub fn resize(
        &self,
        source: &DynamicImage,
        target: (u32, u32),
        mode: ResizeMode,
    ) -> DynamicImage {
        match mode {
            ResizeMode::Fit => {
                let (w, h) = fit_dimensions(source.dimensions(), target);
                if (w, h) == source.dimensions() {
                    source.clone()
                } else {
                    source.resize_exact(w, h, self.filter)
                }
            }
            ResizeMode::CropFit => {
                let plan = crop_fit_plan(source.dimensions(), target);
                let (x, y) = plan.offset;
                let (window_w, window_h) = plan.window;
                let (w, h) = plan.output;
                source
                    .crop_imm(x, y, window_w, window_h)
                    .resize_exact(w, h, self.filter)
            }
        }
    }
}

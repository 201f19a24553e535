//! SVG and PNG Output

use crate::distribution::draw_rul_distribution;
use crate::failures::draw_failure_breakdown;
use crate::{ensure_fonts, ChartError};
use feature_store::{FailureBreakdown, RulDistribution};
use image::RgbImage;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Title of the failure-by-mode chart
pub const FAILURE_CHART_TITLE: &str = "Failures by Operating Mode";

/// Chart sizes in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Size of charts served to the dashboard
    pub dashboard_size: (u32, u32),
    /// Size of the raster embedded in the report (5:3, matching 5in × 3in)
    pub report_size: (u32, u32),
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            dashboard_size: (800, 480),
            report_size: (1000, 600),
        }
    }
}

fn render_error(err: impl std::fmt::Display) -> ChartError {
    ChartError::Render(err.to_string())
}

/// Failure-by-mode chart as an SVG document
pub fn failure_chart_svg(breakdown: &FailureBreakdown, config: &ChartConfig) -> Result<String, ChartError> {
    ensure_fonts()?;
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, config.dashboard_size).into_drawing_area();
        draw_failure_breakdown(&root, breakdown, FAILURE_CHART_TITLE, "Failure Count").map_err(render_error)?;
    }
    Ok(svg)
}

/// RUL histogram as an SVG document
pub fn rul_distribution_svg(distribution: &RulDistribution, config: &ChartConfig) -> Result<String, ChartError> {
    ensure_fonts()?;
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, config.dashboard_size).into_drawing_area();
        draw_rul_distribution(&root, distribution, "RUL (minutes)").map_err(render_error)?;
    }
    Ok(svg)
}

/// Render the failure-by-mode chart to a raster, save it as PNG at `path`
/// (creating parent directories), and return the pixels.
pub fn failure_chart_png(
    breakdown: &FailureBreakdown,
    config: &ChartConfig,
    path: &Path,
) -> Result<RgbImage, ChartError> {
    ensure_fonts()?;
    let (width, height) = config.report_size;
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_failure_breakdown(&root, breakdown, "Failure Count by Operating Mode", "Count")
            .map_err(render_error)?;
    }

    let image = RgbImage::from_raw(width, height, buffer).ok_or(ChartError::Buffer { width, height })?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image.save(path)?;
    info!("Wrote chart image to {}", path.display());

    Ok(image)
}

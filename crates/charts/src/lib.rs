//! Chart Rendering
//!
//! Draws the dashboard and report charts with plotters: SVG strings for the
//! browser, RGB rasters written as PNG for the PDF report.

mod distribution;
mod failures;
mod render;

pub use distribution::draw_rul_distribution;
pub use failures::draw_failure_breakdown;
pub use render::{
    failure_chart_png, failure_chart_svg, rul_distribution_svg, ChartConfig, FAILURE_CHART_TITLE,
};

use plotters::style::FontStyle;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors during chart rendering
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to register chart font")]
    Font,
    #[error("Chart rendering failed: {0}")]
    Render(String),
    #[error("Pixel buffer does not match {width}x{height}")]
    Buffer { width: u32, height: u32 },
    #[error("Failed to write chart image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to prepare chart directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Bundled so text rendering does not depend on system font configuration
static SANS_FONT: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans.ttf");

/// Register the bundled font as the `sans-serif` family once per process
pub(crate) fn ensure_fonts() -> Result<(), ChartError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let registered = *REGISTERED.get_or_init(|| {
        plotters::style::register_font("sans-serif", FontStyle::Normal, SANS_FONT).is_ok()
    });

    if registered {
        Ok(())
    } else {
        Err(ChartError::Font)
    }
}

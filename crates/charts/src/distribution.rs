//! Remaining Useful Life Histogram

use feature_store::RulDistribution;
use plotters::coord::Shift;
use plotters::prelude::*;

const BAR_FILL: RGBColor = RGBColor(76, 114, 176);

/// Draw histogram bars with the density curve on top
pub fn draw_rul_distribution<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    distribution: &RulDistribution,
    x_desc: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let (lo, hi) = distribution.range().unwrap_or((0.0, 1.0));
    let peak_density = distribution
        .density
        .iter()
        .map(|&(_, d)| d)
        .fold(0.0, f64::max);
    let y_max = (distribution.max_count() as f64).max(peak_density).max(1.0) * 1.1;

    let mut chart = ChartBuilder::on(root)
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..hi, 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc("Count")
        .draw()?;

    chart.draw_series(distribution.bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.lower, 0.0), (bin.upper, bin.count as f64)],
            BAR_FILL.mix(0.6).filled(),
        )
    }))?;

    chart.draw_series(distribution.bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.lower, 0.0), (bin.upper, bin.count as f64)],
            WHITE.stroke_width(1),
        )
    }))?;

    if !distribution.density.is_empty() {
        chart.draw_series(LineSeries::new(
            distribution.density.iter().copied(),
            BAR_FILL.stroke_width(2),
        ))?;
    }

    root.present()?;
    Ok(())
}

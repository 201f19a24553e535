//! Failure Count by Operating Mode Chart

use feature_store::FailureBreakdown;
use plotters::coord::Shift;
use plotters::prelude::*;

/// Bar fill used for failure counts
pub const SALMON: RGBColor = RGBColor(250, 128, 114);

/// Draw failure counts as horizontal bars, smallest at the bottom. A breakdown
/// without modes draws empty axes.
pub fn draw_failure_breakdown<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    breakdown: &FailureBreakdown,
    title: &str,
    x_desc: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let segments = breakdown.counts.len().max(1);
    let x_max = (breakdown.max_count() * 1.1).max(1.0);
    let longest_label = breakdown
        .counts
        .iter()
        .map(|c| c.mode.chars().count())
        .max()
        .unwrap_or(0);
    let label_area = (longest_label as u32 * 8 + 20).clamp(60, 320);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(label_area)
        .build_cartesian_2d(0f64..x_max, (0..segments).into_segmented())?;

    let mode_label = |value: &SegmentValue<usize>| match value {
        SegmentValue::CenterOf(i) => breakdown
            .counts
            .get(*i)
            .map(|c| c.mode.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(segments)
        .y_label_formatter(&mode_label)
        .x_desc(x_desc)
        .draw()?;

    chart.draw_series(breakdown.counts.iter().enumerate().map(|(i, c)| {
        let mut bar = Rectangle::new(
            [(0.0, SegmentValue::Exact(i)), (c.count, SegmentValue::Exact(i + 1))],
            SALMON.filled(),
        );
        bar.set_margin(4, 4, 0, 0);
        bar
    }))?;

    root.present()?;
    Ok(())
}

//! Report Content

use crate::layout::{Block, TableBlock};
use chrono::{DateTime, Utc};
use feature_store::{DescribeTable, STATISTIC_LABELS};

pub const REPORT_TITLE: &str = "Predictive Maintenance Report";

pub const EXECUTIVE_SUMMARY_HEADING: &str = "1. Executive Summary";
pub const DATASET_SUMMARY_HEADING: &str = "2. Dataset Summary";
pub const FAILURE_ANALYSIS_HEADING: &str = "3. Failure Analysis";
pub const CONCLUSION_HEADING: &str = "4. Conclusion";

const EXECUTIVE_SUMMARY: &str = "This report outlines the results of predictive maintenance \
analysis using machine learning models. Sensor data from farming equipment was analyzed to \
estimate failure risks and predict remaining useful life (RUL). The findings enable proactive \
maintenance and reduce equipment downtime.";

const CONCLUSION: &str = "The models successfully predicted high-risk scenarios and estimated \
remaining useful life. The system can be deployed in production pipelines or integrated into \
dashboards for live equipment monitoring.";

/// Quarter inch
const SECTION_GAP: f32 = 18.0;
/// Chart size in points (5in x 3in)
pub const CHART_WIDTH: f32 = 360.0;
pub const CHART_HEIGHT: f32 = 216.0;

/// Index of the failure chart in the painter's image list
pub const FAILURE_CHART_IMAGE: usize = 0;

/// Render a statistic the way a float prints in a data-frame dump: whole
/// numbers keep one decimal, `NaN` stays `NaN`.
pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// One row per numeric column, one cell per statistic
pub fn statistics_table(stats: &DescribeTable) -> TableBlock {
    let header = std::iter::once("column".to_string())
        .chain(STATISTIC_LABELS.iter().map(|label| label.to_string()))
        .collect();

    let rows = stats
        .columns
        .iter()
        .map(|summary| {
            std::iter::once(summary.name.clone())
                .chain(summary.values().iter().map(|&v| format_stat(v)))
                .collect()
        })
        .collect();

    TableBlock { header, rows }
}

/// Fixed document structure around the computed statistics
pub fn build_story(stats: &DescribeTable, generated_at: DateTime<Utc>) -> Vec<Block> {
    vec![
        Block::Title(REPORT_TITLE.to_string()),
        Block::Note(format!("Generated {}", generated_at.format("%Y-%m-%d %H:%M UTC"))),
        Block::Spacer(SECTION_GAP),
        Block::Heading(EXECUTIVE_SUMMARY_HEADING.to_string()),
        Block::Paragraph(EXECUTIVE_SUMMARY.to_string()),
        Block::Spacer(SECTION_GAP),
        Block::Heading(DATASET_SUMMARY_HEADING.to_string()),
        Block::Table(statistics_table(stats)),
        Block::Spacer(SECTION_GAP),
        Block::Heading(FAILURE_ANALYSIS_HEADING.to_string()),
        Block::Image {
            index: FAILURE_CHART_IMAGE,
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
        },
        Block::Spacer(SECTION_GAP),
        Block::Heading(CONCLUSION_HEADING.to_string()),
        Block::Paragraph(CONCLUSION.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_store::{FeatureTable, NumericColumn};

    #[test]
    fn test_format_stat() {
        assert_eq!(format_stat(3.0), "3.0");
        assert_eq!(format_stat(12.35), "12.35");
        assert_eq!(format_stat(-0.5), "-0.5");
        assert_eq!(format_stat(f64::NAN), "NaN");
    }

    #[test]
    fn test_statistics_table_shape() {
        let table = FeatureTable::from_columns(
            None,
            vec![
                NumericColumn::new("temperature", vec![1.0, 2.0, 3.0]),
                NumericColumn::new("failure_label", vec![0.0, 1.0, 0.0]),
            ],
        )
        .unwrap();
        let block = statistics_table(&table.describe().rounded(2));

        assert_eq!(block.header.len(), 9);
        assert_eq!(block.header[0], "column");
        assert_eq!(block.header[5], "25%");
        assert_eq!(block.rows.len(), 2);
        assert_eq!(block.rows[0][0], "temperature");
        assert_eq!(block.rows[0][1], "3.0");
        assert_eq!(block.rows[0][2], "2.0");
        assert_eq!(block.rows[1][8], "1.0");
    }

    #[test]
    fn test_story_order() {
        let story = build_story(&DescribeTable::default(), Utc::now());
        let headings: Vec<_> = story
            .iter()
            .filter_map(|block| match block {
                Block::Title(t) | Block::Heading(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(
            headings,
            vec![
                REPORT_TITLE,
                EXECUTIVE_SUMMARY_HEADING,
                DATASET_SUMMARY_HEADING,
                FAILURE_ANALYSIS_HEADING,
                CONCLUSION_HEADING,
            ]
        );
    }
}

//! Maintenance Report
//!
//! Batch job that turns the feature table into a fixed-structure PDF: a
//! title, an executive summary, descriptive statistics for every numeric
//! column, the failure-by-operating-mode chart and a conclusion.

mod content;
mod layout;
mod pdf;

pub use content::{build_story, format_stat, statistics_table, REPORT_TITLE};
pub use layout::{layout, Block, DocumentLayout, Section, TableBlock};

use charts::{ChartConfig, ChartError};
use chrono::Utc;
use feature_store::{FeatureStoreError, FeatureTable, DEFAULT_DATA_PATH};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_FIGURES_DIR: &str = "reports/figures";
pub const DEFAULT_OUTPUT_PATH: &str = "reports/Predictive_Maintenance_Report.pdf";
pub const CHART_FILE_NAME: &str = "failure_modes.png";

/// Errors during report generation
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Store(#[from] FeatureStoreError),
    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(String),
}

/// Report input and output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Feature table CSV
    pub data_path: PathBuf,
    /// Directory receiving the chart image
    pub figures_dir: PathBuf,
    /// Destination of the PDF
    pub output_path: PathBuf,
    pub chart: ChartConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            figures_dir: PathBuf::from(DEFAULT_FIGURES_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            chart: ChartConfig::default(),
        }
    }
}

/// What a generation run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutline {
    pub pdf_path: PathBuf,
    pub chart_path: PathBuf,
    pub sections: Vec<Section>,
    pub page_count: usize,
    /// Rows of the statistics table
    pub table_rows: usize,
}

pub struct ReportGenerator {
    config: ReportConfig,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Run the whole pipeline, overwriting the chart and the PDF
    pub fn generate(&self) -> Result<ReportOutline, ReportError> {
        info!("Generating report from {}", self.config.data_path.display());

        let table = FeatureTable::read_csv(&self.config.data_path)?;
        let breakdown = table.failure_breakdown()?;

        let chart_path = self.config.figures_dir.join(CHART_FILE_NAME);
        let chart = charts::failure_chart_png(&breakdown, &self.config.chart, &chart_path)?;

        let stats = table.describe().rounded(2);
        let story = build_story(&stats, Utc::now());
        let document = layout(&story);

        if let Some(parent) = self.config.output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        pdf::write_pdf(&document, &[chart], REPORT_TITLE, &self.config.output_path)?;

        Ok(ReportOutline {
            pdf_path: self.config.output_path.clone(),
            chart_path,
            sections: document.sections,
            page_count: document.pages.len(),
            table_rows: document.table_rows,
        })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }
}

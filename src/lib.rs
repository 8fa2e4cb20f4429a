//! VASILI PLOT - static chart rendering for VASILI ping logs.
//!
//! Reads the five-field CSV the VASILI logger produces (timestamp,
//! type, target, latency, status), derives jitter and packet-loss
//! views per probed path, and renders one dark-themed PNG next to the
//! input file.

pub mod output;
pub mod record;
pub mod series;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::output::ChartData;
use crate::record::{Sample, Status};
use crate::series::LinkSummary;

pub use record::{load_samples, split_by_kind};

#[derive(Debug, Error)]
pub enum VasiliError {
    #[error("input file '{}' not found", .0.display())]
    InputNotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: invalid timestamp '{value}': {source}")]
    Timestamp {
        row: usize,
        value: String,
        source: chrono::ParseError,
    },
}

/// What a render run produced, for console reporting.
#[derive(Debug)]
pub struct RenderReport {
    pub plot_path: PathBuf,
    pub samples: usize,
    pub internet: LinkSummary,
    pub gateway: LinkSummary,
}

/// Load -> split -> derive -> render -> save.
pub fn render_log(input: &Path) -> anyhow::Result<RenderReport> {
    let samples = record::load_samples(input)?;
    let sample_count = samples.len();
    let parts = record::split_by_kind(samples);

    let internet = series::jitter_series(&parts.internet);
    let gateway = series::jitter_series(&parts.gateway);
    let internet_loss = series::loss_events(&parts.internet);
    let gateway_loss = series::loss_events(&parts.gateway);
    let marker_level_ms = series::loss_marker_level(&internet);

    let report = RenderReport {
        plot_path: output::output_path_for(input),
        samples: sample_count,
        internet: series::summarize(&internet, internet_loss.len()),
        gateway: series::summarize(&gateway, gateway_loss.len()),
    };

    let data = ChartData {
        internet_target: first_ok_target(&parts.internet),
        gateway_target: first_ok_target(&parts.gateway),
        internet,
        gateway,
        internet_loss,
        gateway_loss,
        marker_level_ms,
    };

    output::render_chart(&data, &report.plot_path, &input.display().to_string())?;
    Ok(report)
}

fn first_ok_target(samples: &[Sample]) -> Option<String> {
    samples
        .iter()
        .find(|sample| sample.status == Some(Status::Ok))
        .map(|sample| sample.target.clone())
}

use std::ops::Range;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use plotters::prelude::*;

use crate::series::OkPoint;

/// 16x8 in at 100 dpi, like the original renderer.
pub const PLOT_SIZE: (u32, u32) = (1600, 800);

const INTERNET_LATENCY: RGBColor = RGBColor(0x00, 0xff, 0x00);
const INTERNET_JITTER: RGBColor = RGBColor(0xff, 0xff, 0x00);
const GATEWAY_LATENCY: RGBColor = RGBColor(0x00, 0xcc, 0xff);
const GATEWAY_JITTER: RGBColor = RGBColor(0xff, 0x00, 0xff);
const INTERNET_LOSS: RGBColor = RGBColor(0xff, 0x00, 0x00);
const GATEWAY_LOSS: RGBColor = RGBColor(0xff, 0x00, 0xff);

/// Everything the chart draws, already derived per kind.
#[derive(Debug)]
pub struct ChartData {
    pub internet: Vec<OkPoint>,
    pub gateway: Vec<OkPoint>,
    pub internet_loss: Vec<NaiveDateTime>,
    pub gateway_loss: Vec<NaiveDateTime>,
    pub internet_target: Option<String>,
    pub gateway_target: Option<String>,
    pub marker_level_ms: f64,
}

/// A final `.csv` extension becomes `.png`; any other name keeps its
/// suffix and gets `.png` appended.
pub fn output_path_for(input: &Path) -> PathBuf {
    match input.extension() {
        Some(ext) if ext == "csv" => input.with_extension("png"),
        _ => {
            let mut name = input.as_os_str().to_os_string();
            name.push(".png");
            PathBuf::from(name)
        }
    }
}

fn time_range(data: &ChartData) -> Range<NaiveDateTime> {
    let mut min: Option<NaiveDateTime> = None;
    let mut max: Option<NaiveDateTime> = None;
    let mut consider = |ts: NaiveDateTime| {
        min = Some(match min {
            Some(current) => current.min(ts),
            None => ts,
        });
        max = Some(match max {
            Some(current) => current.max(ts),
            None => ts,
        });
    };

    for point in data.internet.iter().chain(&data.gateway) {
        consider(point.timestamp);
    }
    for ts in data.internet_loss.iter().chain(&data.gateway_loss) {
        consider(*ts);
    }

    match (min, max) {
        (Some(start), Some(end)) if start < end => start..end,
        (Some(only), Some(_)) => only - Duration::seconds(1)..only + Duration::seconds(1),
        _ => NaiveDateTime::UNIX_EPOCH..NaiveDateTime::UNIX_EPOCH + Duration::hours(1),
    }
}

fn value_range(data: &ChartData) -> Range<f64> {
    let mut top = 0.0_f64;
    for point in data.internet.iter().chain(&data.gateway) {
        top = top.max(point.latency_ms).max(point.jitter_ms);
    }
    if !data.internet_loss.is_empty() || !data.gateway_loss.is_empty() {
        top = top.max(data.marker_level_ms);
    }
    if top <= 0.0 {
        top = 100.0;
    }
    0.0..top * 1.05
}

/// Renders the latency/jitter/loss chart to `path`. Series whose
/// source data is empty are not drawn at all.
pub fn render_chart(data: &ChartData, path: &Path, source_name: &str) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&BLACK)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("VASILI Network Analysis - {source_name}"),
            ("sans-serif", 34).into_font().color(&WHITE),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(RangedDateTime::from(time_range(data)), value_range(data))?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Latency / Jitter (ms)")
        .axis_style(WHITE.mix(0.8))
        .label_style(("sans-serif", 18).into_font().color(&WHITE))
        .light_line_style(WHITE.mix(0.08))
        .bold_line_style(WHITE.mix(0.2))
        .x_label_formatter(&|ts: &NaiveDateTime| ts.format("%H:%M:%S").to_string())
        .draw()?;

    if !data.internet.is_empty() {
        let target = data.internet_target.as_deref().unwrap_or("?");
        chart
            .draw_series(LineSeries::new(
                data.internet.iter().map(|p| (p.timestamp, p.latency_ms)),
                INTERNET_LATENCY.mix(0.9).stroke_width(1),
            ))?
            .label(format!("Internet Ping ({target})"))
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 25, y)], INTERNET_LATENCY.stroke_width(3))
            });

        chart
            .draw_series(LineSeries::new(
                data.internet.iter().map(|p| (p.timestamp, p.jitter_ms)),
                INTERNET_JITTER.mix(0.6).stroke_width(1),
            ))?
            .label("Internet Jitter")
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 25, y)], INTERNET_JITTER.stroke_width(3))
            });
    }

    if !data.gateway.is_empty() {
        let target = data.gateway_target.as_deref().unwrap_or("?");
        chart
            .draw_series(LineSeries::new(
                data.gateway.iter().map(|p| (p.timestamp, p.latency_ms)),
                GATEWAY_LATENCY.mix(0.9).stroke_width(1),
            ))?
            .label(format!("Gateway Ping ({target})"))
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 25, y)], GATEWAY_LATENCY.stroke_width(3))
            });

        chart
            .draw_series(LineSeries::new(
                data.gateway.iter().map(|p| (p.timestamp, p.jitter_ms)),
                GATEWAY_JITTER.mix(0.6).stroke_width(1),
            ))?
            .label("Gateway Jitter")
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 25, y)], GATEWAY_JITTER.stroke_width(3))
            });
    }

    if !data.internet_loss.is_empty() {
        chart
            .draw_series(data.internet_loss.iter().map(|ts| {
                Cross::new((*ts, data.marker_level_ms), 8, INTERNET_LOSS.stroke_width(2))
            }))?
            .label("Internet Loss")
            .legend(|(x, y)| Cross::new((x, y), 5, INTERNET_LOSS.stroke_width(2)));
    }

    if !data.gateway_loss.is_empty() {
        chart
            .draw_series(data.gateway_loss.iter().map(|ts| {
                Cross::new((*ts, data.marker_level_ms), 8, GATEWAY_LOSS.stroke_width(2))
            }))?
            .label("Gateway Loss")
            .legend(|(x, y)| Cross::new((x, y), 5, GATEWAY_LOSS.stroke_width(2)));
    }

    let any_series = !data.internet.is_empty()
        || !data.gateway.is_empty()
        || !data.internet_loss.is_empty()
        || !data.gateway_loss.is_empty();
    if any_series {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .border_style(WHITE.mix(0.4))
            .background_style(BLACK.mix(0.7))
            .label_font(("sans-serif", 18).into_font().color(&WHITE))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

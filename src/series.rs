use chrono::NaiveDateTime;

use crate::record::{Sample, Status};

/// A successful ping with its derived jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OkPoint {
    pub timestamp: NaiveDateTime,
    pub latency_ms: f64,
    pub jitter_ms: f64,
}

/// OK-filtered view of one kind-partition with first-order jitter.
///
/// Jitter is the absolute difference to the previous *successful*
/// sample of the same kind; TIMEOUT rows are skipped, not zero-filled.
/// The first successful sample carries jitter 0.
pub fn jitter_series(samples: &[Sample]) -> Vec<OkPoint> {
    let mut points = Vec::new();
    let mut previous: Option<f64> = None;

    for sample in samples {
        if sample.status != Some(Status::Ok) {
            continue;
        }
        let latency_ms = match sample.latency_ms {
            Some(value) => value,
            None => continue,
        };

        let jitter_ms = match previous {
            Some(prev) => (latency_ms - prev).abs(),
            None => 0.0,
        };
        points.push(OkPoint {
            timestamp: sample.timestamp,
            latency_ms,
            jitter_ms,
        });
        previous = Some(latency_ms);
    }

    points
}

/// Timestamps of the TIMEOUT samples of one kind-partition, in order.
pub fn loss_events(samples: &[Sample]) -> Vec<NaiveDateTime> {
    samples
        .iter()
        .filter(|sample| sample.status == Some(Status::Timeout))
        .map(|sample| sample.timestamp)
        .collect()
}

/// Y level for loss markers: maximum internet OK latency, floored at
/// 50 ms; 100 ms when no internet ping ever succeeded.
pub fn loss_marker_level(internet_ok: &[OkPoint]) -> f64 {
    let max = internet_ok
        .iter()
        .map(|point| point.latency_ms)
        .fold(f64::NEG_INFINITY, f64::max);

    if internet_ok.is_empty() {
        100.0
    } else if max < 50.0 {
        50.0
    } else {
        max
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LatencySpread {
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
}

/// Per-kind counters for the console report.
#[derive(Debug, Clone)]
pub struct LinkSummary {
    pub ok: usize,
    pub lost: usize,
    pub latency: Option<LatencySpread>,
}

impl LinkSummary {
    pub fn total(&self) -> usize {
        self.ok + self.lost
    }

    pub fn loss_percent(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.lost as f64 * 100.0 / self.total() as f64
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

pub fn summarize(ok_points: &[OkPoint], lost: usize) -> LinkSummary {
    let latency = if ok_points.is_empty() {
        None
    } else {
        let mut min_ms = f64::INFINITY;
        let mut max_ms = f64::NEG_INFINITY;
        let mut sum_ms = 0.0;
        for point in ok_points {
            min_ms = min_ms.min(point.latency_ms);
            max_ms = max_ms.max(point.latency_ms);
            sum_ms += point.latency_ms;
        }
        Some(LatencySpread {
            min_ms,
            avg_ms: sum_ms / ok_points.len() as f64,
            max_ms,
        })
    };

    LinkSummary {
        ok: ok_points.len(),
        lost,
        latency,
    }
}

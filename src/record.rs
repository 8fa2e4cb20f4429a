use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::VasiliError;

/// Timestamp format written by the VASILI logger. `%.f` also accepts
/// stamps without a fractional part.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Which path a sample probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Internet,
    Gateway,
}

impl Kind {
    /// Older logger builds labeled gateway rows `Router`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Internet" => Some(Kind::Internet),
            "Gateway" | "Router" => Some(Kind::Gateway),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Timeout,
}

impl Status {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "OK" => Some(Status::Ok),
            "TIMEOUT" => Some(Status::Timeout),
            _ => None,
        }
    }
}

/// One log row. Unrecognized kind/status labels are kept as `None` and
/// fall out of every derived view.
#[derive(Debug, Clone)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub kind: Option<Kind>,
    pub target: String,
    pub latency_ms: Option<f64>,
    pub status: Option<Status>,
}

/// Raw CSV row, fields in file order. The log carries no header.
#[derive(Debug, Deserialize)]
struct RawRecord {
    timestamp: String,
    kind: String,
    target: String,
    latency_ms: Option<f64>,
    status: String,
}

impl Sample {
    fn from_raw(raw: RawRecord, row: usize) -> Result<Self, VasiliError> {
        let timestamp = NaiveDateTime::parse_from_str(&raw.timestamp, TIMESTAMP_FORMAT)
            .map_err(|source| VasiliError::Timestamp {
                row,
                value: raw.timestamp.clone(),
                source,
            })?;

        Ok(Sample {
            timestamp,
            kind: Kind::from_label(&raw.kind),
            target: raw.target,
            latency_ms: raw.latency_ms,
            status: Status::from_label(&raw.status),
        })
    }
}

/// Reads the whole log into memory, in file order.
pub fn load_samples(path: &Path) -> Result<Vec<Sample>, VasiliError> {
    let file = File::open(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            VasiliError::InputNotFound(path.to_path_buf())
        } else {
            VasiliError::Io(err)
        }
    })?;
    read_samples(BufReader::new(file))
}

pub fn read_samples<R: Read>(reader: R) -> Result<Vec<Sample>, VasiliError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (idx, row) in csv_reader.deserialize::<RawRecord>().enumerate() {
        samples.push(Sample::from_raw(row?, idx + 1)?);
    }
    Ok(samples)
}

/// The two kind-partitions, each in original file order.
#[derive(Debug, Default)]
pub struct Partitions {
    pub internet: Vec<Sample>,
    pub gateway: Vec<Sample>,
}

pub fn split_by_kind(samples: Vec<Sample>) -> Partitions {
    let mut parts = Partitions::default();
    for sample in samples {
        match sample.kind {
            Some(Kind::Internet) => parts.internet.push(sample),
            Some(Kind::Gateway) => parts.gateway.push(sample),
            None => {}
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
2024-03-01 10:00:00.000,Internet,8.8.8.8,12.4,OK
2024-03-01 10:00:00.250,Gateway,192.168.1.1,1.8,OK
2024-03-01 10:00:00.500,Internet,8.8.8.8,,TIMEOUT
2024-03-01 10:00:00.750,Router,192.168.1.1,2.1,OK
2024-03-01 10:00:01.000,Satellite,10.0.0.1,55.0,OK
";

    #[test]
    fn parses_rows_in_file_order() {
        let samples = read_samples(LOG.as_bytes()).unwrap();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].kind, Some(Kind::Internet));
        assert_eq!(samples[0].target, "8.8.8.8");
        assert_eq!(samples[0].latency_ms, Some(12.4));
        assert_eq!(samples[0].status, Some(Status::Ok));
        assert!(samples.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn timeout_row_has_no_latency() {
        let samples = read_samples(LOG.as_bytes()).unwrap();
        assert_eq!(samples[2].status, Some(Status::Timeout));
        assert_eq!(samples[2].latency_ms, None);
    }

    #[test]
    fn router_label_counts_as_gateway() {
        assert_eq!(Kind::from_label("Router"), Some(Kind::Gateway));
        assert_eq!(Kind::from_label("Gateway"), Some(Kind::Gateway));
        assert_eq!(Kind::from_label("Internet"), Some(Kind::Internet));
    }

    #[test]
    fn unknown_labels_drop_to_none() {
        let samples = read_samples(LOG.as_bytes()).unwrap();
        assert_eq!(samples[4].kind, None);
        assert_eq!(Status::from_label("ok"), None);
        assert_eq!(Status::from_label("LOST"), None);
    }

    #[test]
    fn split_is_order_preserving_and_exhaustive() {
        let samples = read_samples(LOG.as_bytes()).unwrap();
        let total = samples.len();
        let parts = split_by_kind(samples);

        assert_eq!(parts.internet.len(), 2);
        assert_eq!(parts.gateway.len(), 2);
        // one unrecognized kind lands in neither partition
        assert_eq!(parts.internet.len() + parts.gateway.len(), total - 1);

        assert!(parts
            .internet
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
        assert!(parts
            .gateway
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn whole_second_timestamps_parse() {
        let samples =
            read_samples("2024-03-01 10:00:00,Internet,8.8.8.8,9.9,OK\n".as_bytes()).unwrap();
        assert_eq!(samples[0].latency_ms, Some(9.9));
    }

    #[test]
    fn malformed_timestamp_reports_row() {
        let log = "2024-03-01 10:00:00.000,Internet,8.8.8.8,12.4,OK\nnot-a-time,Internet,8.8.8.8,1.0,OK\n";
        let err = read_samples(log.as_bytes()).unwrap_err();
        match err {
            VasiliError::Timestamp { row, ref value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "not-a-time");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_maps_to_input_not_found() {
        let err = load_samples(Path::new("nope.csv")).unwrap_err();
        assert!(matches!(err, VasiliError::InputNotFound(_)));
        assert!(err.to_string().contains("nope.csv"));
    }
}

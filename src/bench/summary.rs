//! End-of-run aggregation per (codec, level).

use std::collections::BTreeMap;

use super::result::BenchmarkResult;
use crate::displayout;

/// Averages over every result sharing one (algorithm, level) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub algorithm: String,
    pub level: i32,
    pub samples: usize,
    pub verified: usize,
    pub mean_ratio: f64,
    /// Mean over samples with a defined speed; `None` if there were none.
    pub mean_compression_speed_mbs: Option<f64>,
    pub mean_decompression_speed_mbs: Option<f64>,
}

#[derive(Default)]
struct Accumulator {
    samples: usize,
    verified: usize,
    ratio_sum: f64,
    c_speed: Mean,
    d_speed: Mean,
}

#[derive(Default)]
struct Mean {
    sum: f64,
    n: usize,
}

impl Mean {
    fn add(&mut self, v: Option<f64>) {
        if let Some(v) = v {
            self.sum += v;
            self.n += 1;
        }
    }

    fn get(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

/// Groups `results` by (algorithm, level), sorted by name then level.
pub fn summarize(results: &[BenchmarkResult]) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(&str, i32), Accumulator> = BTreeMap::new();
    for r in results {
        let acc = groups.entry((r.algorithm.as_str(), r.level)).or_default();
        acc.samples += 1;
        acc.verified += usize::from(r.verified);
        acc.ratio_sum += r.compression_ratio;
        acc.c_speed.add(r.compression_speed_mbs);
        acc.d_speed.add(r.decompression_speed_mbs);
    }
    groups
        .into_iter()
        .map(|((algorithm, level), acc)| SummaryRow {
            algorithm: algorithm.to_owned(),
            level,
            samples: acc.samples,
            verified: acc.verified,
            mean_ratio: acc.ratio_sum / acc.samples as f64,
            mean_compression_speed_mbs: acc.c_speed.get(),
            mean_decompression_speed_mbs: acc.d_speed.get(),
        })
        .collect()
}

fn speed_cell(v: Option<f64>) -> String {
    v.map(|s| format!("{s:.1}")).unwrap_or_else(|| "-".to_owned())
}

/// Prints the summary table to stdout.
pub fn print_summary(rows: &[SummaryRow]) {
    if rows.is_empty() {
        return;
    }
    displayout!(
        "{:<10} {:>5} {:>7} {:>8} {:>12} {:>12} {:>9}\n",
        "codec",
        "level",
        "runs",
        "ratio",
        "comp MB/s",
        "decomp MB/s",
        "verified"
    );
    for row in rows {
        displayout!(
            "{:<10} {:>5} {:>7} {:>8.4} {:>12} {:>12} {:>9}\n",
            row.algorithm,
            row.level,
            row.samples,
            row.mean_ratio,
            speed_cell(row.mean_compression_speed_mbs),
            speed_cell(row.mean_decompression_speed_mbs),
            format!("{}/{}", row.verified, row.samples)
        );
    }
}

use std::time::{Duration, Instant};
use tracing::info;

/// Times one pipeline stage and logs its throughput when finished.
pub struct StageTimer {
    stage: &'static str,
    start: Instant,
}

impl StageTimer {
    pub fn start(stage: &'static str) -> Self {
        Self { stage, start: Instant::now() }
    }

    pub fn finish(self, items: usize) -> Duration {
        let took = self.start.elapsed();
        info!("{}: {} items in {:.2?}", self.stage, items, took);
        took
    }
}

/// Whole rupiah with `.` grouping, e.g. `Rp 160.000`.
pub fn fmt_rupiah(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("Rp {}", amount);
    }
    let whole = amount.round();
    let sign = if whole < 0.0 { "-" } else { "" };
    format!("{}Rp {}", sign, group_digits(&format!("{:.0}", whole.abs()), '.'))
}

/// Row counts with the same `.` grouping as prices.
pub fn fmt_count(n: i64) -> String {
    let sign = if n < 0 { "-" } else { "" };
    format!("{}{}", sign, group_digits(&n.unsigned_abs().to_string(), '.'))
}

fn group_digits(digits: &str, sep: char) -> String {
    let lead = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}

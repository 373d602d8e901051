//! CPU time buckets and the two-sample utilisation rate.
//!
//! A single `/proc/stat` line only holds counters accumulated since boot.
//! Utilisation over an interval needs two samples of the same scope; the
//! caller keeps the earlier one and passes both to [`cpu_percent_between`].

use crate::error::Result;
use crate::reader::FieldSequence;
use crate::schema::cpu_line;
use serde::Serialize;

/// Time accounting buckets of one `cpu`/`cpuN` line, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CpuSample {
    pub user: f64,
    pub nice: f64,
    pub system: f64,
    pub idle: f64,
    pub iowait: f64,
    pub irq: f64,
    pub softirq: f64,
    pub steal: f64,
    pub guest: f64,
    pub guest_nice: f64,
}

impl CpuSample {
    /// Builds a sample from a tokenized `cpu` line.
    pub fn from_fields(fields: &FieldSequence) -> Result<Self> {
        cpu_line::SCHEMA.check(fields)?;
        let at = |idx| fields.parse_at::<f64>(cpu_line::SCHEMA.name, idx);
        Ok(Self {
            user: at(cpu_line::USER)?,
            nice: at(cpu_line::NICE)?,
            system: at(cpu_line::SYSTEM)?,
            idle: at(cpu_line::IDLE)?,
            iowait: at(cpu_line::IOWAIT)?,
            irq: at(cpu_line::IRQ)?,
            softirq: at(cpu_line::SOFTIRQ)?,
            steal: at(cpu_line::STEAL)?,
            guest: at(cpu_line::GUEST)?,
            guest_nice: at(cpu_line::GUEST_NICE)?,
        })
    }

    /// Ticks spent doing work.
    pub fn active(&self) -> f64 {
        self.user
            + self.nice
            + self.system
            + self.irq
            + self.softirq
            + self.steal
            + self.guest
            + self.guest_nice
    }

    /// Calculate non-active time (idle + iowait).
    /// This includes both true idle time and time spent waiting for I/O operations.
    pub fn idle_total(&self) -> f64 {
        self.idle + self.iowait
    }
}

/// Percent of the interval between two samples spent active.
///
/// Returns `None` when no ticks elapsed between the samples. Pairs passed
/// out of order produce out-of-range values; they are not clamped.
pub fn cpu_percent_between(earlier: &CpuSample, later: &CpuSample) -> Option<f64> {
    let active = later.active() - earlier.active();
    let idle = later.idle_total() - earlier.idle_total();
    let total = active + idle;
    if total == 0.0 || !total.is_finite() {
        return None;
    }
    Some(100.0 * active / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SamplerError;

    fn sample(line: &str) -> CpuSample {
        CpuSample::from_fields(&FieldSequence::from_line(line)).expect("valid cpu line")
    }

    #[test]
    fn test_from_fields_maps_buckets() {
        let s = sample("cpu0 1 2 3 4 5 6 7 8 9 10");
        assert_eq!(s.user, 1.0);
        assert_eq!(s.idle, 4.0);
        assert_eq!(s.guest_nice, 10.0);
        assert_eq!(s.active(), 1.0 + 2.0 + 3.0 + 6.0 + 7.0 + 8.0 + 9.0 + 10.0);
        assert_eq!(s.idle_total(), 9.0);
    }

    #[test]
    fn test_from_fields_short_line() {
        let result = CpuSample::from_fields(&FieldSequence::from_line("cpu 1 2 3 4"));
        assert!(matches!(result, Err(SamplerError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_from_fields_absent_line() {
        let result = CpuSample::from_fields(&FieldSequence::default());
        assert!(matches!(
            result,
            Err(SamplerError::SchemaMismatch { found: 0, .. })
        ));
    }

    #[test]
    fn test_cpu_percent_between() {
        let earlier = sample("cpu 100 0 100 700 100 0 0 0 0 0");
        // +150 active, +50 idle, +0 iowait
        let later = sample("cpu 200 0 150 750 100 0 0 0 0 0");
        let pct = cpu_percent_between(&earlier, &later).expect("non-degenerate");
        assert!((pct - 75.0).abs() < 1e-9, "got {}", pct);
    }

    #[test]
    fn test_cpu_percent_between_equal_samples_is_degenerate() {
        let s = sample("cpu 10 20 30 40 50 60 70 80 90 100");
        assert_eq!(cpu_percent_between(&s, &s), None);
    }

    #[test]
    fn test_cpu_percent_between_stays_in_range_for_monotone_pairs() {
        let earlier = sample("cpu 5 1 2 100 3 0 0 0 0 0");
        let increments: [[u64; 10]; 5] = [
            [0, 0, 0, 10, 0, 0, 0, 0, 0, 0],
            [10, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [1, 2, 3, 4, 5, 6, 7, 8, 9, 10],
            [1000, 0, 500, 1, 0, 20, 30, 0, 0, 0],
            [0, 0, 0, 0, 99, 0, 0, 0, 0, 0],
        ];
        for inc in increments {
            let later = CpuSample {
                user: earlier.user + inc[0] as f64,
                nice: earlier.nice + inc[1] as f64,
                system: earlier.system + inc[2] as f64,
                idle: earlier.idle + inc[3] as f64,
                iowait: earlier.iowait + inc[4] as f64,
                irq: earlier.irq + inc[5] as f64,
                softirq: earlier.softirq + inc[6] as f64,
                steal: earlier.steal + inc[7] as f64,
                guest: earlier.guest + inc[8] as f64,
                guest_nice: earlier.guest_nice + inc[9] as f64,
            };
            let pct = cpu_percent_between(&earlier, &later).expect("ticks elapsed");
            assert!((0.0..=100.0).contains(&pct), "{:?} -> {}", inc, pct);
        }
    }

    #[test]
    fn test_cpu_percent_between_out_of_order_is_not_clamped() {
        let a = sample("cpu 100 0 0 100 0 0 0 0 0 0");
        let b = sample("cpu 200 0 0 100 0 0 0 0 0 0");
        let c = sample("cpu 150 0 0 300 0 0 0 0 0 0");
        // Swapped ordering: active goes down, idle goes up
        let pct = cpu_percent_between(&b, &c).expect("non-degenerate");
        assert!(pct < 0.0);
        assert_eq!(cpu_percent_between(&a, &b), Some(100.0));
    }
}

//! Running statistics over evaluated records.
//!
//! The fold is order independent: counts commute, sums are kept exactly
//! and rounded once, and min/max are seeded by the first observation.
//! Rates and averages are only produced by [`RunningStatistics::finalize`],
//! which returns `None` for an empty run instead of dividing by zero.

use crate::rules::EvaluatedRecord;

/// Correctly rounded running sum of `f64` values (Shewchuk partials).
///
/// [`ExactSum::value`] is the exact sum rounded once, so it is the same for
/// every order in which the values arrive. Infinite and NaN inputs, and sums
/// beyond the `f64` range, saturate to the IEEE result.
#[derive(Debug, Clone, Default)]
pub struct ExactSum {
    /// Non-overlapping partials in increasing magnitude.
    partials: Vec<f64>,
    /// Accumulated non-finite contributions; `0.0` while everything is finite.
    special: f64,
}

impl ExactSum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        if !value.is_finite() {
            self.special += value;
            return;
        }

        let mut x = value;
        let mut kept = 0;
        for j in 0..self.partials.len() {
            let mut y = self.partials[j];
            if x.abs() < y.abs() {
                std::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            if !hi.is_finite() {
                self.special += hi;
                self.partials.clear();
                return;
            }
            let lo = y - (hi - x);
            if lo != 0.0 {
                self.partials[kept] = lo;
                kept += 1;
            }
            x = hi;
        }
        self.partials.truncate(kept);
        if x != 0.0 {
            self.partials.push(x);
        }
    }

    pub fn merge(&mut self, other: &ExactSum) {
        for &p in &other.partials {
            self.add(p);
        }
        self.special += other.special;
    }

    /// The sum, rounded half-to-even.
    pub fn value(&self) -> f64 {
        if !self.special.is_finite() {
            return self.special;
        }
        let Some((&top, rest)) = self.partials.split_last() else {
            return 0.0;
        };

        let mut hi = top;
        let mut lo = 0.0;
        let mut n = rest.len();
        while n > 0 {
            n -= 1;
            let x = hi;
            let y = rest[n];
            hi = x + y;
            lo = y - (hi - x);
            if lo != 0.0 {
                break;
            }
        }
        // Half-way case: the discarded partials decide the rounding direction.
        if n > 0 && ((lo < 0.0 && rest[n - 1] < 0.0) || (lo > 0.0 && rest[n - 1] > 0.0)) {
            let y = lo * 2.0;
            let x = hi + y;
            if y == x - hi {
                hi = x;
            }
        }
        hi
    }
}

impl PartialEq for ExactSum {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl Extend<f64> for ExactSum {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

/// Sum, min, and max of one tracked quantity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantityStats {
    pub sum: ExactSum,
    /// `None` until the first observation.
    pub bounds: Option<(f64, f64)>,
}

impl QuantityStats {
    pub fn observe(&mut self, value: f64) {
        self.sum.add(value);
        self.bounds = Some(match self.bounds {
            None => (value, value),
            Some((min, max)) => (
                if value < min { value } else { min },
                if value > max { value } else { max },
            ),
        });
    }

    pub fn merge(&mut self, other: &QuantityStats) {
        self.sum.merge(&other.sum);
        self.bounds = match (self.bounds, other.bounds) {
            (None, b) | (b, None) => b,
            (Some((a_min, a_max)), Some((b_min, b_max))) => Some((
                if b_min < a_min { b_min } else { a_min },
                if b_max > a_max { b_max } else { a_max },
            )),
        };
    }

    pub fn total(&self) -> f64 {
        self.sum.value()
    }

    pub fn min(&self) -> Option<f64> {
        self.bounds.map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<f64> {
        self.bounds.map(|(_, max)| max)
    }
}

/// Counts and per-quantity accumulators, updated one record at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningStatistics {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub matched: usize,
    pub voltage: QuantityStats,
    pub current: QuantityStats,
    pub power: QuantityStats,
}

impl RunningStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the running totals.
    pub fn observe(&mut self, evaluated: &EvaluatedRecord) {
        self.total += 1;
        if evaluated.overall_pass {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        if evaluated.matches_expected {
            self.matched += 1;
        }
        self.voltage.observe(evaluated.record.voltage);
        self.current.observe(evaluated.record.current);
        self.power.observe(evaluated.power);
    }

    /// Combine two partial folds.
    pub fn merge(&mut self, other: &RunningStatistics) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.matched += other.matched;
        self.voltage.merge(&other.voltage);
        self.current.merge(&other.current);
        self.power.merge(&other.power);
    }

    /// Fold a whole sequence, in order.
    pub fn fold<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a EvaluatedRecord>,
    {
        let mut stats = Self::new();
        for r in records {
            stats.observe(r);
        }
        stats
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Compute rates and averages. `None` when nothing was observed.
    pub fn finalize(&self) -> Option<Summary> {
        if self.total == 0 {
            return None;
        }
        let n = self.total as f64;
        Some(Summary {
            total: self.total,
            passed: self.passed,
            failed: self.failed,
            matched: self.matched,
            pass_rate: self.passed as f64 * 100.0 / n,
            accuracy_rate: self.matched as f64 * 100.0 / n,
            voltage: QuantitySummary::from_stats(&self.voltage, n)?,
            current: QuantitySummary::from_stats(&self.current, n)?,
            power: QuantitySummary::from_stats(&self.power, n)?,
        })
    }
}

impl<'a> FromIterator<&'a EvaluatedRecord> for RunningStatistics {
    fn from_iter<T: IntoIterator<Item = &'a EvaluatedRecord>>(iter: T) -> Self {
        Self::fold(iter)
    }
}

/// Average and range of one quantity after the pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantitySummary {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl QuantitySummary {
    fn from_stats(stats: &QuantityStats, n: f64) -> Option<Self> {
        let (min, max) = stats.bounds?;
        Some(Self {
            average: stats.total() / n,
            min,
            max,
        })
    }
}

/// Finalized statistics for a non-empty run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub matched: usize,
    /// Percentage of records whose verdict is PASS.
    pub pass_rate: f64,
    /// Percentage of records whose verdict matches the expected label.
    pub accuracy_rate: f64,
    pub voltage: QuantitySummary,
    pub current: QuantitySummary,
    pub power: QuantitySummary,
}

impl Summary {
    pub fn fail_rate(&self) -> f64 {
        100.0 - self.pass_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::rules::{Limits, evaluate};
    use proptest::prelude::*;

    fn eval(voltage: f64, current: f64, expected: &str) -> EvaluatedRecord {
        let record = Record {
            id: "T".to_string(),
            voltage,
            current,
            expected_result: expected.to_string(),
            ..Record::default()
        };
        evaluate(&record, &Limits::default())
    }

    #[test]
    fn test_empty_has_no_summary() {
        let stats = RunningStatistics::new();
        assert!(stats.is_empty());
        assert!(stats.finalize().is_none());
        assert_eq!(stats.voltage.min(), None);
    }

    #[test]
    fn test_counts_and_rates() {
        let records = vec![
            eval(1.8, 0.5, "PASS"),
            eval(1.75, 0.25, "PASS"),
            eval(1.5, 0.5, "PASS"),
            eval(2.0, 2.0, "FAIL"),
        ];
        let stats: RunningStatistics = records.iter().collect();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.passed, 2);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.matched, 3);

        let summary = stats.finalize().unwrap();
        assert_eq!(summary.pass_rate, 50.0);
        assert_eq!(summary.fail_rate(), 50.0);
        assert_eq!(summary.accuracy_rate, 75.0);
        assert_eq!(summary.voltage.min, 1.5);
        assert_eq!(summary.voltage.max, 2.0);
        assert_eq!(summary.current.min, 0.25);
        assert_eq!(summary.current.max, 2.0);
        assert_eq!(summary.power.max, 4.0);
        assert!((summary.voltage.average - 1.7625).abs() < 1e-12);
    }

    #[test]
    fn test_first_record_seeds_bounds() {
        let stats = RunningStatistics::fold(&[eval(1.8, 0.5, "PASS")]);
        assert_eq!(stats.voltage.bounds, Some((1.8, 1.8)));
        let summary = stats.finalize().unwrap();
        assert_eq!(summary.voltage.min, summary.voltage.max);
        assert_eq!(summary.pass_rate, 100.0);
    }

    #[test]
    fn test_merge_matches_single_fold() {
        let records = vec![
            eval(1.75, 0.5, "PASS"),
            eval(1.5, 0.25, "FAIL"),
            eval(1.875, 1.25, "FAIL"),
        ];
        let whole = RunningStatistics::fold(&records);
        let mut left = RunningStatistics::fold(&records[..1]);
        let right = RunningStatistics::fold(&records[1..]);
        left.merge(&right);
        assert_eq!(left, whole);

        let mut empty = RunningStatistics::new();
        empty.merge(&whole);
        assert_eq!(empty, whole);
    }

    #[test]
    fn test_exact_sum_rounds_once() {
        let mut sum = ExactSum::new();
        sum.extend([0.1, 0.2, 0.3]);
        assert_eq!(sum.value(), 0.6);

        let mut cancel = ExactSum::new();
        cancel.extend([1e100, 1.0, -1e100]);
        assert_eq!(cancel.value(), 1.0);

        assert_eq!(ExactSum::new().value(), 0.0);
    }

    #[test]
    fn test_exact_sum_non_finite() {
        let mut sum = ExactSum::new();
        sum.extend([1.0, f64::INFINITY, 2.0]);
        assert_eq!(sum.value(), f64::INFINITY);
        sum.add(f64::NEG_INFINITY);
        assert!(sum.value().is_nan());

        let mut overflow = ExactSum::new();
        overflow.extend([f64::MAX, f64::MAX]);
        assert_eq!(overflow.value(), f64::INFINITY);
    }

    #[test]
    fn test_permutation_gives_identical_statistics() {
        let forward_records = vec![
            eval(0.1, 0.5, "FAIL"),
            eval(0.2, 0.5, "FAIL"),
            eval(0.3, 0.5, "FAIL"),
        ];
        let mut reversed_records = forward_records.clone();
        reversed_records.reverse();

        let forward = RunningStatistics::fold(&forward_records);
        let reversed = RunningStatistics::fold(&reversed_records);
        assert_eq!(forward, reversed);
        assert_eq!(forward.voltage.total(), reversed.voltage.total());
        assert_eq!(forward.power.total(), reversed.power.total());
        assert_eq!(forward.voltage.total(), 0.6);
    }

    // Finite values small enough that no product or sum overflows.
    fn finite() -> impl Strategy<Value = f64> {
        use prop::num::f64::{NEGATIVE, NORMAL, POSITIVE, SUBNORMAL, ZERO};
        (POSITIVE | NEGATIVE | NORMAL | SUBNORMAL | ZERO)
            .prop_filter("magnitude below 1e150", |x| x.abs() < 1e150)
    }

    proptest! {
        #[test]
        fn test_pass_plus_fail_is_total(
            inputs in prop::collection::vec((finite(), finite()), 1..50)
        ) {
            let records: Vec<_> = inputs.iter().map(|&(v, c)| eval(v, c, "PASS")).collect();
            let stats = RunningStatistics::fold(&records);
            prop_assert_eq!(stats.passed + stats.failed, stats.total);
            prop_assert!(stats.matched <= stats.total);
            let (min, max) = stats.voltage.bounds.unwrap();
            for r in &records {
                prop_assert!(min <= r.record.voltage && r.record.voltage <= max);
            }
        }

        #[test]
        fn test_fold_is_order_independent(
            inputs in prop::collection::vec((finite(), finite()), 1..50),
            split in 0usize..50
        ) {
            let records: Vec<_> = inputs.iter().map(|&(v, c)| eval(v, c, "PASS")).collect();
            let mut reversed = records.clone();
            reversed.reverse();
            let mut rotated = records.clone();
            rotated.rotate_left(records.len() / 2);

            let forward = RunningStatistics::fold(&records);
            prop_assert_eq!(&forward, &RunningStatistics::fold(&reversed));
            prop_assert_eq!(&forward, &RunningStatistics::fold(&rotated));
            prop_assert_eq!(forward.voltage.total(), RunningStatistics::fold(&reversed).voltage.total());

            let split = split.min(records.len());
            let mut merged = RunningStatistics::fold(&records[split..]);
            merged.merge(&RunningStatistics::fold(&records[..split]));
            prop_assert_eq!(&forward, &merged);
        }
    }
}

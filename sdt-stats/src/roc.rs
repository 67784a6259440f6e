//! ROC aggregation over experimental conditions.
//!
//! A [`RocAggregator`] collects one [`ConditionMetrics`] per condition, orders
//! them by false-alarm rate into ROC points, and integrates the resulting
//! curve with the composite trapezoidal rule.
//!
//! The curve is integrated exactly as the observed points define it: no
//! `(0, 0)` / `(1, 1)` endpoints are added, tied false-alarm rates are kept,
//! and the result is not clamped.

use std::cmp::Ordering;

use sdt_core::{Result, SdtError, Summarizable};
use tracing::{debug, warn};

use crate::condition::ConditionMetrics;
use crate::plot::{RocPlot, RocRenderer};

/// A single point on the ROC curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RocPoint {
    /// False-alarm rate (x axis).
    pub false_alarm_rate: f64,
    /// Hit rate (y axis).
    pub hit_rate: f64,
    /// Insertion index of the condition this point came from.
    pub condition: usize,
}

/// One stored condition with its optional label.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Condition {
    pub metrics: ConditionMetrics,
    pub label: Option<String>,
}

/// Ordered collection of conditions forming one ROC analysis.
///
/// Starts empty and only grows. Insertion order is kept for storage but has
/// no effect on [`sorted_roc_points`](Self::sorted_roc_points) or
/// [`compute_auc`](Self::compute_auc) beyond ordering ties.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RocAggregator {
    conditions: Vec<Condition>,
}

impl RocAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty aggregator with room for `capacity` conditions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            conditions: Vec::with_capacity(capacity),
        }
    }

    /// Append a condition with an optional label.
    pub fn add_condition(&mut self, metrics: ConditionMetrics, label: Option<&str>) {
        debug!(
            index = self.conditions.len(),
            label = label.unwrap_or(""),
            hit_rate = metrics.hit_rate(),
            false_alarm_rate = metrics.false_alarm_rate(),
            "adding condition"
        );
        self.conditions.push(Condition {
            metrics,
            label: label.map(str::to_owned),
        });
    }

    /// Validate raw counts and append them as a new condition.
    ///
    /// # Errors
    ///
    /// Returns [`SdtError::InvalidInput`] if any count is negative. The
    /// aggregator is left unchanged.
    pub fn add_counts(
        &mut self,
        hits: i64,
        misses: i64,
        false_alarms: i64,
        correct_rejections: i64,
        label: Option<&str>,
    ) -> Result<()> {
        let metrics = ConditionMetrics::new(hits, misses, false_alarms, correct_rejections)?;
        self.add_condition(metrics, label);
        Ok(())
    }

    /// Number of stored conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether no condition has been added yet.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Stored conditions in insertion order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.conditions.iter().map(|c| c.label.as_deref())
    }

    /// ROC points sorted by ascending false-alarm rate.
    ///
    /// Conditions with equal false-alarm rates keep their insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`SdtError::EmptyCollection`] if no condition has been added.
    pub fn roc_points(&self) -> Result<Vec<RocPoint>> {
        if self.conditions.is_empty() {
            return Err(SdtError::EmptyCollection(
                "roc_points: add at least one condition first".into(),
            ));
        }

        // Decorate with the insertion index, sort on (rate, index), undecorate.
        let mut points = self.rates();
        points.sort_by(|a, b| {
            a.false_alarm_rate
                .partial_cmp(&b.false_alarm_rate)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.condition.cmp(&b.condition))
        });
        Ok(points)
    }

    /// False-alarm rates and hit rates, sorted by ascending false-alarm rate.
    ///
    /// Both vectors have one entry per condition.
    ///
    /// # Errors
    ///
    /// Returns [`SdtError::EmptyCollection`] if no condition has been added.
    ///
    /// # Example
    ///
    /// ```
    /// use sdt_stats::roc::RocAggregator;
    ///
    /// let mut exp = RocAggregator::new();
    /// exp.add_counts(40, 10, 20, 30, Some("A")).unwrap();
    /// exp.add_counts(30, 20, 10, 40, Some("B")).unwrap();
    ///
    /// let (fa, hit) = exp.sorted_roc_points().unwrap();
    /// assert_eq!(fa, vec![0.2, 0.4]);
    /// assert_eq!(hit, vec![0.6, 0.8]);
    /// ```
    pub fn sorted_roc_points(&self) -> Result<(Vec<f64>, Vec<f64>)> {
        let points = self.roc_points()?;
        Ok(points
            .iter()
            .map(|p| (p.false_alarm_rate, p.hit_rate))
            .unzip())
    }

    /// Area under the ROC curve by the composite trapezoidal rule.
    ///
    /// `AUC = Σ (x[i+1] − x[i]) × (y[i+1] + y[i]) / 2` over the sorted points.
    ///
    /// # Errors
    ///
    /// Returns [`SdtError::EmptyCollection`] with no conditions and
    /// [`SdtError::InsufficientData`] with exactly one.
    pub fn compute_auc(&self) -> Result<f64> {
        if self.conditions.is_empty() {
            return Err(SdtError::EmptyCollection(
                "compute_auc: add at least two conditions first".into(),
            ));
        }
        if self.conditions.len() < 2 {
            return Err(SdtError::InsufficientData(format!(
                "compute_auc: need at least 2 conditions, have {}",
                self.conditions.len()
            )));
        }

        let (x, y) = self.sorted_roc_points()?;
        let auc = trapezoidal_auc(&x, &y);

        debug!(conditions = x.len(), auc, "computed AUC");
        if auc < 0.5 {
            warn!(auc, "AUC below chance; check response coding");
        }
        Ok(auc)
    }

    /// Hand the sorted ROC points to `renderer`, with the chance diagonal.
    ///
    /// `show` asks the renderer to emit the chart immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SdtError::EmptyCollection`] if no condition has been added,
    /// or whatever error the renderer reports.
    pub fn plot_roc_curve<R: RocRenderer + ?Sized>(&self, renderer: &mut R, show: bool) -> Result<()> {
        let (false_alarm_rates, hit_rates) = self.sorted_roc_points()?;
        let plot = RocPlot::new(&false_alarm_rates, &hit_rates)?;
        renderer.render(&plot, show)
    }

    /// Unsorted points, one per condition, in insertion order.
    fn rates(&self) -> Vec<RocPoint> {
        let point = |(i, c): (usize, &Condition)| RocPoint {
            false_alarm_rate: c.metrics.false_alarm_rate(),
            hit_rate: c.metrics.hit_rate(),
            condition: i,
        };

        #[cfg(feature = "parallel")]
        let points = {
            use rayon::prelude::*;
            self.conditions.par_iter().enumerate().map(point).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let points = self.conditions.iter().enumerate().map(point).collect();

        points
    }
}

impl Summarizable for RocAggregator {
    fn summary(&self) -> String {
        // Integrate directly so that display never logs.
        match self.sorted_roc_points() {
            Ok((x, y)) if x.len() >= 2 => format!(
                "RocAggregator: {} conditions, AUC={:.4}",
                self.len(),
                trapezoidal_auc(&x, &y)
            ),
            _ => format!("RocAggregator: {} conditions", self.len()),
        }
    }
}

impl Extend<(ConditionMetrics, Option<String>)> for RocAggregator {
    fn extend<I: IntoIterator<Item = (ConditionMetrics, Option<String>)>>(&mut self, iter: I) {
        for (metrics, label) in iter {
            self.add_condition(metrics, label.as_deref());
        }
    }
}

impl FromIterator<ConditionMetrics> for RocAggregator {
    fn from_iter<I: IntoIterator<Item = ConditionMetrics>>(iter: I) -> Self {
        let mut agg = Self::new();
        agg.extend(iter.into_iter().map(|m| (m, None)));
        agg
    }
}

/// Signed trapezoidal sum between consecutive (x, y) points.
fn trapezoidal_auc(x: &[f64], y: &[f64]) -> f64 {
    let mut auc = 0.0;
    for i in 1..x.len() {
        auc += (x[i] - x[i - 1]) * (y[i] + y[i - 1]) / 2.0;
    }
    auc
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;

    fn agg(counts: &[(i64, i64, i64, i64)]) -> RocAggregator {
        let mut a = RocAggregator::new();
        for (i, &(h, m, fa, cr)) in counts.iter().enumerate() {
            a.add_counts(h, m, fa, cr, Some(format!("c{}", i).as_str())).unwrap();
        }
        a
    }

    /// Deterministic LCG, same recurrence as the benches.
    fn lcg_counts(n: usize, seed: u64) -> Vec<(i64, i64, i64, i64)> {
        let mut state = seed;
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) % 6) as i64
        };
        (0..n).map(|_| (next(), next(), next(), next())).collect()
    }

    // ── Adding conditions ───────────────────────────────────────

    #[test]
    fn add_condition_single() {
        let mut a = RocAggregator::new();
        assert!(a.is_empty());
        a.add_condition(ConditionMetrics::new(40, 10, 20, 30).unwrap(), Some("Condition A"));
        assert_eq!(a.len(), 1);
        assert!(!a.is_empty());
        assert_eq!(a.labels().collect::<Vec<_>>(), vec![Some("Condition A")]);
    }

    #[test]
    fn add_condition_multiple_keeps_order() {
        let mut a = RocAggregator::with_capacity(3);
        a.add_condition(ConditionMetrics::new(40, 10, 20, 30).unwrap(), Some("A"));
        a.add_condition(ConditionMetrics::new(30, 20, 10, 40).unwrap(), None);
        assert_eq!(a.len(), 2);
        assert_eq!(a.labels().collect::<Vec<_>>(), vec![Some("A"), None]);
        assert_eq!(a.conditions()[1].metrics, ConditionMetrics::new(30, 20, 10, 40).unwrap());
    }

    #[test]
    fn add_counts_negative_leaves_state_unchanged() {
        let mut a = agg(&[(1, 1, 1, 1)]);
        let err = a.add_counts(-1, 0, 0, 0, Some("bad")).unwrap_err();
        assert!(matches!(err, SdtError::InvalidInput(_)));
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn collect_from_metrics() {
        let a: RocAggregator = [(1, 0, 0, 1), (1, 1, 0, 0)]
            .iter()
            .map(|&(h, m, fa, cr)| ConditionMetrics::new(h, m, fa, cr).unwrap())
            .collect();
        assert_eq!(a.len(), 2);
        assert!(a.labels().all(|l| l.is_none()));
    }

    // ── Sorted points ───────────────────────────────────────────

    #[test]
    fn sorted_points_ascending() {
        let a = agg(&[(40, 10, 20, 30), (30, 20, 10, 40)]);
        let (fa, hit) = a.sorted_roc_points().unwrap();
        assert_eq!(fa.len(), 2);
        assert_eq!(hit.len(), 2);
        assert!(fa.windows(2).all(|w| w[0] <= w[1]));
        assert!((fa[0] - 0.2).abs() < 1e-12);
        assert!((hit[0] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn sorted_points_non_decreasing_sweep() {
        for seed in 0..20 {
            let a = agg(&lcg_counts(15, seed));
            let (fa, hit) = a.sorted_roc_points().unwrap();
            assert_eq!(fa.len(), 15);
            assert_eq!(hit.len(), 15);
            assert!(fa.windows(2).all(|w| w[0] <= w[1]));
            assert!(fa.iter().chain(hit.iter()).all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn sorted_points_ties_keep_insertion_order() {
        // Conditions 0, 1 and 3 share FA = 0.5; condition 2 sits at FA = 0.
        let a = agg(&[(9, 1, 5, 5), (1, 9, 5, 5), (0, 10, 0, 10), (5, 5, 1, 1)]);
        let points = a.roc_points().unwrap();
        let order: Vec<usize> = points.iter().map(|p| p.condition).collect();
        assert_eq!(order, vec![2, 0, 1, 3]);

        let (_, hit) = a.sorted_roc_points().unwrap();
        assert_eq!(hit, vec![0.0, 0.9, 0.1, 0.5]);
    }

    #[test]
    fn sorted_points_single_condition() {
        let a = agg(&[(3, 1, 1, 3)]);
        let (fa, hit) = a.sorted_roc_points().unwrap();
        assert_eq!(fa, vec![0.25]);
        assert_eq!(hit, vec![0.75]);
    }

    #[test]
    fn sorted_points_empty_error() {
        let a = RocAggregator::new();
        assert!(matches!(a.sorted_roc_points(), Err(SdtError::EmptyCollection(_))));
        assert!(matches!(a.roc_points(), Err(SdtError::EmptyCollection(_))));
    }

    // ── AUC ─────────────────────────────────────────────────────

    #[test]
    fn auc_diagonal_endpoints() {
        // (0,1,0,1) → (0,0); (1,0,1,0) → (1,1)
        let a = agg(&[(0, 1, 0, 1), (1, 0, 1, 0)]);
        assert!((a.compute_auc().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn auc_perfect_separation() {
        // (0,0), (0,1), (1,1)
        let a = agg(&[(0, 1, 0, 1), (1, 0, 0, 1), (1, 0, 1, 0)]);
        assert!((a.compute_auc().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn auc_vertical_segment_is_zero() {
        // (1,0,0,1) → (0,1); (1,1,0,0) → (0,0.5): both at FA = 0
        let a = agg(&[(1, 0, 0, 1), (1, 1, 0, 0)]);
        assert!(a.compute_auc().unwrap().abs() < 1e-12);
    }

    #[test]
    fn auc_partial_span() {
        // (1,0,1,0) → (1,1); (1,1,0,0) → (0,0.5): 1 × (1 + 0.5) / 2
        let a = agg(&[(1, 0, 1, 0), (1, 1, 0, 0)]);
        assert!((a.compute_auc().unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn auc_observed_span_only() {
        // (0.2, 0.6) and (0.4, 0.8): 0.2 × 1.4 / 2, no endpoint extrapolation
        let a = agg(&[(40, 10, 20, 30), (30, 20, 10, 40)]);
        assert!((a.compute_auc().unwrap() - 0.14).abs() < 1e-12);
    }

    #[test]
    fn auc_below_chance_not_adjusted() {
        // (0,0), (0.5,0), (1,1): 0.5 × (0 + 1) / 2
        let a = agg(&[(0, 1, 0, 1), (0, 2, 1, 1), (1, 0, 1, 0)]);
        assert!((a.compute_auc().unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn auc_invariant_to_insertion_order() {
        // Distinct false-alarm rates i/10, hit counts from the LCG.
        for seed in 0..20 {
            let counts: Vec<_> = lcg_counts(8, seed)
                .into_iter()
                .enumerate()
                .map(|(i, (h, m, _, _))| (h, m, i as i64, 10 - i as i64))
                .collect();
            let forward = agg(&counts).compute_auc().unwrap();
            let mut reversed = counts.clone();
            reversed.reverse();
            let backward = agg(&reversed).compute_auc().unwrap();
            let mut rotated = counts.clone();
            rotated.rotate_left(3);
            let shifted = agg(&rotated).compute_auc().unwrap();
            assert!((forward - backward).abs() < 1e-12, "seed {}", seed);
            assert!((forward - shifted).abs() < 1e-12, "seed {}", seed);
        }
    }

    #[test]
    fn auc_ties_follow_insertion_order() {
        // Two points at FA = 0; the later one connects to (1, 1).
        let a = agg(&[(2, 8, 0, 10), (8, 2, 0, 10), (1, 0, 1, 0)]);
        assert!((a.compute_auc().unwrap() - 0.9).abs() < 1e-12);
        let b = agg(&[(8, 2, 0, 10), (2, 8, 0, 10), (1, 0, 1, 0)]);
        assert!((b.compute_auc().unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn auc_empty_error() {
        let a = RocAggregator::new();
        assert!(matches!(a.compute_auc(), Err(SdtError::EmptyCollection(_))));
    }

    #[test]
    fn auc_single_condition_error() {
        let a = agg(&[(3, 1, 1, 3)]);
        assert!(matches!(a.compute_auc(), Err(SdtError::InsufficientData(_))));
        assert!(a.sorted_roc_points().is_ok());
    }

    #[test]
    fn trapezoid_known() {
        let x = [0.0, 0.5, 1.0];
        let y = [0.0, 1.0, 1.0];
        assert!((trapezoidal_auc(&x, &y) - 0.75).abs() < 1e-12);
        assert_eq!(trapezoidal_auc(&[0.3], &[0.9]), 0.0);
    }

    // ── Summary ─────────────────────────────────────────────────

    /// Counts WARN events emitted while installed.
    struct WarnCounter(Arc<AtomicUsize>);

    impl tracing::Subscriber for WarnCounter {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

        fn event(&self, event: &tracing::Event<'_>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, AtomicOrdering::SeqCst);
            }
        }

        fn enter(&self, _: &tracing::span::Id) {}

        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[test]
    fn summary_does_not_log_below_chance() {
        // Same below-chance curve as above: AUC = 0.25
        let a = agg(&[(0, 1, 0, 1), (0, 2, 1, 1), (1, 0, 1, 0)]);
        let warnings = Arc::new(AtomicUsize::new(0));

        tracing::subscriber::with_default(WarnCounter(Arc::clone(&warnings)), || {
            assert_eq!(a.summary(), "RocAggregator: 3 conditions, AUC=0.2500");
        });
        assert_eq!(warnings.load(AtomicOrdering::SeqCst), 0);

        tracing::subscriber::with_default(WarnCounter(Arc::clone(&warnings)), || {
            assert!((a.compute_auc().unwrap() - 0.25).abs() < 1e-12);
        });
        assert_eq!(warnings.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn summary_with_and_without_auc() {
        assert_eq!(RocAggregator::new().summary(), "RocAggregator: 0 conditions");
        let a = agg(&[(3, 1, 1, 3)]);
        assert_eq!(a.summary(), "RocAggregator: 1 conditions");
        let a = agg(&[(0, 1, 0, 1), (1, 0, 1, 0)]);
        assert_eq!(a.summary(), "RocAggregator: 2 conditions, AUC=0.5000");
    }
}

//! Per-condition signal detection metrics.
//!
//! [`OutcomeCounts`] holds the 2×2 table of one experimental condition and
//! [`ConditionMetrics`] derives the rates and SDT indices from it:
//!
//! ```text
//!                  "yes"           "no"
//! Signal present   hits            misses
//! Signal absent    false alarms    correct rejections
//! ```
//!
//! Every metric is a pure function of the counts. Rates with an empty
//! denominator are reported as `0.0`, and the probit-based indices never
//! evaluate Φ⁻¹ at `0`: a rate of exactly zero contributes `0` instead.

use sdt_core::{Result, SdtError, Summarizable};

use crate::distribution::probit;

// ── Outcome counts ─────────────────────────────────────────────────────────

/// Raw 2×2 outcome counts for one condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutcomeCounts {
    hits: u64,
    misses: u64,
    false_alarms: u64,
    correct_rejections: u64,
}

impl OutcomeCounts {
    /// Build a count table from signed integers.
    ///
    /// # Errors
    ///
    /// Returns [`SdtError::InvalidInput`] if any count is negative.
    pub fn new(hits: i64, misses: i64, false_alarms: i64, correct_rejections: i64) -> Result<Self> {
        Ok(Self {
            hits: non_negative("hits", hits)?,
            misses: non_negative("misses", misses)?,
            false_alarms: non_negative("false_alarms", false_alarms)?,
            correct_rejections: non_negative("correct_rejections", correct_rejections)?,
        })
    }

    /// Build a count table from unsigned integers. Cannot fail.
    pub fn from_unsigned(hits: u64, misses: u64, false_alarms: u64, correct_rejections: u64) -> Self {
        Self {
            hits,
            misses,
            false_alarms,
            correct_rejections,
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn false_alarms(&self) -> u64 {
        self.false_alarms
    }

    pub fn correct_rejections(&self) -> u64 {
        self.correct_rejections
    }

    /// Number of signal-present trials (hits + misses).
    ///
    /// Widened so that any pair of `u64` counts sums without overflow.
    pub fn signal_trials(&self) -> u128 {
        u128::from(self.hits) + u128::from(self.misses)
    }

    /// Number of signal-absent trials (false alarms + correct rejections).
    pub fn noise_trials(&self) -> u128 {
        u128::from(self.false_alarms) + u128::from(self.correct_rejections)
    }

    /// Total number of trials.
    pub fn total(&self) -> u128 {
        self.signal_trials() + self.noise_trials()
    }
}

fn non_negative(field: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| {
        SdtError::InvalidInput(format!(
            "OutcomeCounts: {} must be non-negative, got {}",
            field, value
        ))
    })
}

/// `num / den`, or `0.0` when no trials of that kind were recorded.
fn rate(num: u64, den: u128) -> f64 {
    if den == 0 {
        return 0.0;
    }
    num as f64 / den as f64
}

/// Φ⁻¹ with the zero clamp: a rate of exactly `0` contributes `0`.
fn clamped_probit(p: f64) -> f64 {
    if p == 0.0 {
        0.0
    } else {
        probit(p)
    }
}

// ── Condition metrics ──────────────────────────────────────────────────────

/// Hit rate, false-alarm rate, d′ and criterion computed in one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SdtIndices {
    /// Hit rate H.
    pub hit_rate: f64,
    /// False-alarm rate FA.
    pub false_alarm_rate: f64,
    /// Sensitivity d′.
    pub d_prime: f64,
    /// Criterion C.
    pub criterion: f64,
}

impl Summarizable for SdtIndices {
    fn summary(&self) -> String {
        format!(
            "H={:.4}, FA={:.4}, d'={:.4}, C={:.4}",
            self.hit_rate, self.false_alarm_rate, self.d_prime, self.criterion,
        )
    }
}

/// SDT metrics for one experimental condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionMetrics {
    counts: OutcomeCounts,
}

impl ConditionMetrics {
    /// Validate raw signed counts and wrap them.
    ///
    /// # Errors
    ///
    /// Returns [`SdtError::InvalidInput`] if any count is negative; no value
    /// is constructed in that case.
    ///
    /// # Example
    ///
    /// ```
    /// use sdt_stats::condition::ConditionMetrics;
    ///
    /// let m = ConditionMetrics::new(40, 10, 20, 30).unwrap();
    /// assert!((m.hit_rate() - 0.8).abs() < 1e-12);
    /// assert!((m.false_alarm_rate() - 0.4).abs() < 1e-12);
    /// assert!(ConditionMetrics::new(-1, 10, 20, 30).is_err());
    /// ```
    pub fn new(hits: i64, misses: i64, false_alarms: i64, correct_rejections: i64) -> Result<Self> {
        OutcomeCounts::new(hits, misses, false_alarms, correct_rejections).map(Self::from_counts)
    }

    /// Wrap already validated counts.
    pub fn from_counts(counts: OutcomeCounts) -> Self {
        Self { counts }
    }

    /// The wrapped counts.
    pub fn counts(&self) -> &OutcomeCounts {
        &self.counts
    }

    /// `hits / (hits + misses)`, or `0.0` with no signal trials.
    pub fn hit_rate(&self) -> f64 {
        rate(self.counts.hits, self.counts.signal_trials())
    }

    /// `false_alarms / (false_alarms + correct_rejections)`, or `0.0` with no
    /// noise trials.
    pub fn false_alarm_rate(&self) -> f64 {
        rate(self.counts.false_alarms, self.counts.noise_trials())
    }

    /// Sensitivity d′ = Φ⁻¹(H) − Φ⁻¹(FA).
    ///
    /// Boundary cases, checked in order:
    ///
    /// 1. `H == 1` gives `+inf`.
    /// 2. `FA == 1` gives `-inf`.
    /// 3. `H == 0` and `FA == 0` gives `-inf`.
    ///
    /// Otherwise a rate of exactly `0` contributes `0` in place of Φ⁻¹(0).
    pub fn sensitivity(&self) -> f64 {
        let h = self.hit_rate();
        let fa = self.false_alarm_rate();

        if h == 1.0 {
            return f64::INFINITY;
        }
        if fa == 1.0 {
            return f64::NEG_INFINITY;
        }
        if h == 0.0 && fa == 0.0 {
            return f64::NEG_INFINITY;
        }
        clamped_probit(h) - clamped_probit(fa)
    }

    /// Alias for [`sensitivity`](Self::sensitivity).
    pub fn d_prime(&self) -> f64 {
        self.sensitivity()
    }

    /// Criterion C = −0.5 × (Φ⁻¹(H) + Φ⁻¹(FA)).
    ///
    /// The pairs `(H=1, FA=0)`, `(H=0, FA=1)` and `(H=0, FA=0)` report `0`.
    /// Elsewhere a zero rate contributes `0`, and a rate of one contributes
    /// `+inf`, so C is `-inf` whenever a non-degenerate pair hits `1`.
    pub fn bias(&self) -> f64 {
        let h = self.hit_rate();
        let fa = self.false_alarm_rate();

        let degenerate = (h == 1.0 && fa == 0.0) || (h == 0.0 && fa == 1.0) || (h == 0.0 && fa == 0.0);
        if degenerate {
            return 0.0;
        }
        -0.5 * (clamped_probit(h) + clamped_probit(fa))
    }

    /// Alias for [`bias`](Self::bias).
    pub fn criterion(&self) -> f64 {
        self.bias()
    }

    /// All four metrics at once.
    pub fn indices(&self) -> SdtIndices {
        SdtIndices {
            hit_rate: self.hit_rate(),
            false_alarm_rate: self.false_alarm_rate(),
            d_prime: self.sensitivity(),
            criterion: self.bias(),
        }
    }
}

impl From<OutcomeCounts> for ConditionMetrics {
    fn from(counts: OutcomeCounts) -> Self {
        Self::from_counts(counts)
    }
}

impl Summarizable for ConditionMetrics {
    fn summary(&self) -> String {
        let c = &self.counts;
        format!(
            "hits={}, misses={}, fa={}, cr={}: {}",
            c.hits,
            c.misses,
            c.false_alarms,
            c.correct_rejections,
            self.indices().summary(),
        )
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

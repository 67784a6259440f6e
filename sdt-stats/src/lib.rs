//! Signal detection theory metrics and ROC analysis.
//!
//! - **Probit**: The standard-normal inverse CDF
//! - **Condition metrics**: Hit rate, false-alarm rate, d′ and criterion from 2×2 counts
//! - **ROC aggregation**: Conditions ordered into ROC points, trapezoidal AUC
//! - **Plotting**: Renderer hook and an SVG renderer for ROC curves
//!
//! ```
//! use sdt_stats::{ConditionMetrics, RocAggregator};
//!
//! let mut exp = RocAggregator::new();
//! exp.add_condition(ConditionMetrics::new(0, 1, 0, 1).unwrap(), Some("never yes"));
//! exp.add_condition(ConditionMetrics::new(1, 0, 1, 0).unwrap(), Some("always yes"));
//! assert!((exp.compute_auc().unwrap() - 0.5).abs() < 1e-12);
//! ```

pub mod condition;
pub mod distribution;
pub mod plot;
pub mod roc;

pub use condition::{ConditionMetrics, OutcomeCounts, SdtIndices};
pub use distribution::probit;
pub use plot::{RocPlot, RocRenderer, SvgRenderer, SvgStyle};
pub use roc::{Condition, RocAggregator, RocPoint};

// self
use crate::obs::{GuardOp, GuardOutcome};

/// Records a guard decision via the global metrics recorder (when enabled).
pub fn record_guard_outcome(op: GuardOp, outcome: GuardOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"storefront_guard_decision_total",
			"op" => op.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, outcome);
	}
}

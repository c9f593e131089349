// self
use crate::{
	_prelude::*,
	obs::{Operation, OperationOutcome},
};

/// Counter incremented for every attempt, success and failure.
pub const REQUEST_TOTAL: &str = "buildkite_token_request_total";
/// Histogram of settled call latencies, in seconds.
pub const REQUEST_DURATION_SECONDS: &str = "buildkite_token_request_duration_seconds";

/// Bumps [`REQUEST_TOTAL`] for `operation` + `outcome` on the installed recorder.
pub fn record_operation_outcome(operation: Operation, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		REQUEST_TOTAL,
		"operation" => operation.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (operation, outcome);
}

/// Records how long a settled call took under [`REQUEST_DURATION_SECONDS`].
///
/// Only terminal outcomes carry a latency; [`OperationOutcome::Attempt`] is ignored.
pub fn record_operation_duration(
	operation: Operation,
	outcome: OperationOutcome,
	elapsed: Duration,
) {
	if outcome == OperationOutcome::Attempt {
		return;
	}

	#[cfg(feature = "metrics")]
	metrics::histogram!(
		REQUEST_DURATION_SECONDS,
		"operation" => operation.as_str(),
		"outcome" => outcome.as_str()
	)
	.record(elapsed.as_secs_f64());

	#[cfg(not(feature = "metrics"))]
	let _ = (operation, elapsed);
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
	// crates.io
	use metrics_util::debugging::{DebugValue, DebuggingRecorder};
	// self
	use super::*;

	#[test]
	fn attempts_carry_no_latency() {
		let recorder = DebuggingRecorder::new();
		let snapshotter = recorder.snapshotter();

		metrics::with_local_recorder(&recorder, || {
			record_operation_duration(
				Operation::TokenScopes,
				OperationOutcome::Attempt,
				Duration::from_millis(5),
			);
			record_operation_duration(
				Operation::TokenScopes,
				OperationOutcome::Success,
				Duration::from_millis(250),
			);
		});

		let histograms = snapshotter
			.snapshot()
			.into_vec()
			.into_iter()
			.filter(|(key, ..)| key.key().name() == REQUEST_DURATION_SECONDS)
			.collect::<Vec<_>>();

		assert_eq!(histograms.len(), 1);

		let (key, _, _, value) = &histograms[0];

		assert!(
			key.key().labels().any(|label| label.key() == "outcome" && label.value() == "success")
		);

		match value {
			DebugValue::Histogram(samples) => {
				assert_eq!(samples.len(), 1);
				assert!((samples[0].into_inner() - 0.25).abs() < f64::EPSILON);
			},
			other => panic!("Unexpected metric value: {other:?}."),
		}
	}
}

// self
use crate::{
	_prelude::*,
	http::{HttpRequest, HttpResponse},
	obs::{Operation, OperationOutcome},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// Span wrapping one access-token API call.
///
/// The span is opened with the `operation` and `stage` fields; `outcome` stays empty until
/// [`OperationSpan::record_outcome`] fills it once the call settles.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Opens a `buildkite_token.request` span for `operation`.
	pub fn new(operation: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"buildkite_token.request",
				operation = operation.as_str(),
				stage,
				outcome = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, stage);

			Self {}
		}
	}

	/// Fills the span's `outcome` field.
	pub fn record_outcome(&self, outcome: OperationOutcome) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("outcome", outcome.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = outcome;
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a DEBUG event describing an outgoing request.
///
/// Header values flagged as sensitive (the injected `Authorization` header) print as
/// `Sensitive`, so the token never reaches the log sink.
pub fn log_outgoing_request(request: &HttpRequest) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			method = %request.method(),
			uri = %request.uri(),
			headers = ?request.headers(),
			body_len = request.body().len(),
			"Sending access-token API request."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = request;
	}
}

/// Emits a DEBUG event describing the response to a logged request.
pub fn log_incoming_response(response: &HttpResponse) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			status = %response.status(),
			body_len = response.body().len(),
			"Received access-token API response."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = response;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn logging_helpers_accept_requests_without_subscriber() {
		let request = ::http::Request::builder()
			.uri("https://api.buildkite.com/v2/access-token")
			.body(Vec::new())
			.expect("Request should build.");
		let response =
			::http::Response::builder().status(204).body(Vec::new()).expect("Response should build.");

		log_outgoing_request(&request);
		log_incoming_response(&response);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = OperationSpan::new(Operation::TokenScopes, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		span.record_outcome(OperationOutcome::Success);

		assert_eq!(value, 42);
	}
}

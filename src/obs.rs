//! Optional observability helpers for access-token operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `buildkite_token.request` with the
//!   `operation` and `stage` fields (and the settled `outcome`), plus DEBUG events for requests logged by
//!   [`AuthTransport`](crate::http::AuthTransport) in debug mode.
//! - Enable `metrics` to increment the `buildkite_token_request_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`, and to observe call latency
//!   in the `buildkite_token_request_duration_seconds` histogram.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// API operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// `GET /access-token`.
	TokenScopes,
	/// `DELETE /access-token`.
	RevokeToken,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::TokenScopes => "token_scopes",
			Operation::RevokeToken => "revoke_token",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

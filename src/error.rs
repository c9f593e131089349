//! Client-level error types shared across configuration, transports, and API calls.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The access-token endpoint answered with a body that is not the expected JSON object.
	#[error("Access-token endpoint returned malformed JSON (HTTP {status}).")]
	ResponseParse {
		/// Structured parsing failure, including the JSON path that failed.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}

/// Configuration and validation failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// API token is empty.
	#[error("API token cannot be empty.")]
	EmptyToken,
	/// API token cannot be encoded into an `Authorization` header.
	#[error("API token contains characters that are not valid in an HTTP header.")]
	InvalidToken {
		/// Underlying header encoding failure.
		#[source]
		source: ::http::header::InvalidHeaderValue,
	},
	/// API host cannot be parsed or cannot act as a base URL.
	#[error("API host is invalid: {host}.")]
	InvalidHost {
		/// Host value that failed validation.
		host: String,
		/// Underlying parsing failure, when the value did not parse at all.
		#[source]
		source: Option<url::ParseError>,
	},
	/// API host does not use HTTPS and is not a loopback address.
	#[error("API host must use HTTPS: {url}.")]
	InsecureHost {
		/// Host URL that failed validation.
		url: String,
	},
	/// Required environment variable is not set.
	#[error("Environment variable `{var}` is not set.")]
	MissingEnv {
		/// Name of the missing variable.
		var: &'static str,
	},
	/// Environment variable holds a value that cannot be interpreted.
	#[error("Environment variable `{var}` has an invalid value: {value}.")]
	InvalidEnv {
		/// Name of the offending variable.
		var: &'static str,
		/// Raw value that failed to parse.
		value: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] ::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the access-token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request did not complete within the configured timeout.
	#[error("Request timed out while calling the access-token endpoint.")]
	Timeout,
	/// Request could not be converted into the transport's native representation.
	#[error("Request could not be prepared for the transport.")]
	Request {
		/// Transport-specific conversion failure.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the access-token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() {
			return Self::Timeout;
		}
		if e.is_builder() {
			return Self::Request { source: Box::new(e) };
		}

		Self::network(e)
	}
}

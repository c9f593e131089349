//! Transport primitives for access-token API calls.
//!
//! The module exposes [`HttpTransport`], the client's only dependency on an HTTP stack, along
//! with two implementations:
//!
//! - [`ReqwestTransport`] executes requests with a shared [`ReqwestClient`].
//! - [`AuthTransport`] decorates any other transport: it injects the bearer `Authorization`
//!   header and, in debug mode, logs every outgoing request and its response.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use ::http::{
	HeaderValue,
	header::{AUTHORIZATION, HeaderMap},
};
// self
use crate::{_prelude::*, auth::ApiToken, error::ConfigError, obs};
#[cfg(feature = "reqwest")] use crate::{config::ClientConfig, error::TransportError};

/// Transport-neutral request type handed to [`HttpTransport::execute`].
pub type HttpRequest = ::http::Request<Vec<u8>>;
/// Transport-neutral response type returned by [`HttpTransport::execute`].
pub type HttpResponse = ::http::Response<Vec<u8>>;
/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing access-token API requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared behind an
/// `Arc` by every clone of the client, and the futures they return must be `Send` so operations
/// can hop executors. Decorators such as [`AuthTransport`] implement the trait by delegating to
/// an inner transport, so layers compose without the client knowing about them.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the transport.
	type Error: 'static + Send + Sync + StdError;

	/// Sends `request` and resolves to the full response, body included.
	///
	/// Non-success HTTP statuses are responses, not errors; only failures to obtain a response
	/// surface through [`Self::Error`].
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::Error>;
}
impl<T> HttpTransport for Arc<T>
where
	T: ?Sized + HttpTransport,
{
	type Error = T::Error;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::Error> {
		(**self).execute(request)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a reqwest client honoring the timeout and user agent from `config`.
	pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder().user_agent(config.user_agent.as_str());

		if let Some(timeout) = config.timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	type Error = TransportError;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::Error> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = reqwest::Request::try_from(request)
				.map_err(|e| TransportError::Request { source: Box::new(e) })?;
			let response = client.execute(request).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();
			let mut response_new = HttpResponse::new(body);

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Transport decorator that authenticates every request with a bearer token.
///
/// The `Authorization` header value is built once and flagged as sensitive, so it renders as
/// `Sensitive` in any `Debug` output (including the debug log). Any `Authorization` header
/// already present on a request is replaced.
#[derive(Clone)]
pub struct AuthTransport<T>
where
	T: HttpTransport,
{
	authorization: HeaderValue,
	debug: bool,
	inner: T,
}
impl<T> AuthTransport<T>
where
	T: HttpTransport,
{
	/// Wraps `inner` so every request carries `Authorization: Bearer <token>`.
	pub fn new(inner: T, token: &ApiToken) -> Result<Self, ConfigError> {
		Ok(Self { authorization: bearer_header(token)?, debug: false, inner })
	}

	/// Enables or disables request/response logging at DEBUG level.
	pub fn with_debug(mut self, debug: bool) -> Self {
		self.debug = debug;

		self
	}

	/// Returns true when request logging is enabled.
	pub fn debug(&self) -> bool {
		self.debug
	}

	/// Returns the wrapped transport.
	pub fn inner(&self) -> &T {
		&self.inner
	}

	fn authorize(&self, headers: &mut HeaderMap) {
		headers.insert(AUTHORIZATION, self.authorization.clone());
	}
}
impl<T> Debug for AuthTransport<T>
where
	T: HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthTransport")
			.field("authorization", &self.authorization)
			.field("debug", &self.debug)
			.finish_non_exhaustive()
	}
}
impl<T> HttpTransport for AuthTransport<T>
where
	T: HttpTransport,
{
	type Error = T::Error;

	fn execute(&self, mut request: HttpRequest) -> TransportFuture<'_, Self::Error> {
		self.authorize(request.headers_mut());

		if !self.debug {
			return self.inner.execute(request);
		}

		obs::log_outgoing_request(&request);

		let response = self.inner.execute(request);

		Box::pin(async move {
			let response = response.await?;

			obs::log_incoming_response(&response);

			Ok(response)
		})
	}
}

fn bearer_header(token: &ApiToken) -> Result<HeaderValue, ConfigError> {
	if token.is_empty() {
		return Err(ConfigError::EmptyToken);
	}

	let mut value = HeaderValue::try_from(format!("Bearer {}", token.expose()))
		.map_err(|source| ConfigError::InvalidToken { source })?;

	value.set_sensitive(true);

	Ok(value)
}

#[cfg(test)]
mod tests {
	// crates.io
	use parking_lot::Mutex;
	// self
	use super::*;
	use crate::error::TransportError;

	#[derive(Default)]
	struct RecordingTransport {
		seen: Mutex<Vec<HeaderMap>>,
	}
	impl HttpTransport for RecordingTransport {
		type Error = TransportError;

		fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::Error> {
			self.seen.lock().push(request.headers().clone());

			Box::pin(async move {
				::http::Response::builder()
					.status(204)
					.body(Vec::new())
					.map_err(|e| TransportError::Request { source: Box::new(e) })
			})
		}
	}

	fn request(headers: &[(&'static str, &'static str)]) -> HttpRequest {
		let mut builder =
			::http::Request::builder().uri("https://api.buildkite.com/v2/access-token");

		for (name, value) in headers {
			builder = builder.header(*name, *value);
		}

		builder.body(Vec::new()).expect("Test request should build.")
	}

	#[tokio::test]
	async fn injects_bearer_header() {
		let inner = Arc::new(RecordingTransport::default());
		let transport = AuthTransport::new(Arc::clone(&inner), &ApiToken::new("token"))
			.expect("Token should produce a valid header.");
		let response =
			transport.execute(request(&[])).await.expect("Recording transport should respond.");

		assert_eq!(response.status(), 204);

		let seen = inner.seen.lock();

		assert_eq!(seen.len(), 1);
		assert_eq!(seen[0].get(AUTHORIZATION).map(|v| v.as_bytes()), Some(&b"Bearer token"[..]));
	}

	#[tokio::test]
	async fn replaces_existing_authorization_and_keeps_other_headers() {
		let inner = Arc::new(RecordingTransport::default());
		let transport = AuthTransport::new(Arc::clone(&inner), &ApiToken::new("fresh"))
			.expect("Token should produce a valid header.")
			.with_debug(true);

		transport
			.execute(request(&[("authorization", "Bearer stale"), ("accept", "application/json")]))
			.await
			.expect("Recording transport should respond.");

		let seen = inner.seen.lock();
		let values = seen[0].get_all(AUTHORIZATION).iter().collect::<Vec<_>>();

		assert_eq!(values.len(), 1);
		assert_eq!(values[0].as_bytes(), b"Bearer fresh");
		assert!(values[0].is_sensitive());
		assert_eq!(
			seen[0].get("accept").map(|v| v.as_bytes()),
			Some(&b"application/json"[..])
		);
	}

	#[test]
	fn rejects_unusable_tokens() {
		let inner = Arc::new(RecordingTransport::default());
		let err = AuthTransport::new(Arc::clone(&inner), &ApiToken::new(""))
			.expect_err("Empty tokens must be rejected.");

		assert!(matches!(err, ConfigError::EmptyToken));

		let err = AuthTransport::new(inner, &ApiToken::new("line\nbreak"))
			.expect_err("Tokens with control characters must be rejected.");

		assert!(matches!(err, ConfigError::InvalidToken { .. }));
	}

	#[test]
	fn debug_output_redacts_token() {
		let transport =
			AuthTransport::new(Arc::new(RecordingTransport::default()), &ApiToken::new("hidden"))
				.expect("Token should produce a valid header.");
		let rendered = format!("{transport:?}");

		assert!(!rendered.contains("hidden"), "Debug output leaked the token: {rendered}.");
		assert!(rendered.contains("Sensitive"));
	}
}

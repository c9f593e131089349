//! Access-token API client.
//!
//! [`Client`] speaks to a single Buildkite REST endpoint, `{host}/access-token`, and exposes its
//! two operations: [`Client::token_scopes`] inspects the token presented by the transport and
//! [`Client::revoke_token`] revokes it. Authentication is the transport's job; the default
//! reqwest stack built by [`Client::new`] wraps the HTTP client in an
//! [`AuthTransport`](crate::http::AuthTransport).

mod response;

pub use response::*;

// std
use std::time::Instant;
// crates.io
use ::http::{Method, header::ACCEPT};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{HttpRequest, HttpTransport},
	obs::{self, Operation, OperationOutcome, OperationSpan},
};
#[cfg(feature = "reqwest")]
use crate::{
	auth::ApiToken,
	config::ClientConfig,
	http::{AuthTransport, ReqwestTransport},
};

/// Path of the access-token resource, relative to the API host.
pub const TOKEN_PATH: &str = "/access-token";
/// Buildkite REST API v2 base URL.
pub const DEFAULT_HOST: &str = "https://api.buildkite.com/v2";

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default authenticated reqwest stack.
pub type ReqwestApiClient = Client<AuthTransport<ReqwestTransport>>;

/// Client for the access-token API.
///
/// The transport is shared behind an `Arc`, so clones are cheap and reuse the same connection
/// pool.
pub struct Client<T>
where
	T: HttpTransport,
{
	/// API base URL the access-token path is appended to.
	pub host: Url,
	endpoint: Url,
	transport: Arc<T>,
}
impl<T> Client<T>
where
	T: HttpTransport,
	Error: From<T::Error>,
{
	/// Creates a client that sends every request through `transport`.
	///
	/// The transport is used as-is; wrap it in an [`AuthTransport`](crate::http::AuthTransport)
	/// to authenticate requests.
	pub fn with_transport(host: Url, transport: T) -> Result<Self> {
		let endpoint = access_token_url(&host)?;

		Ok(Self { host, endpoint, transport: Arc::new(transport) })
	}

	/// Fully resolved URL of the access-token resource.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Returns the transport shared by this client.
	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Fetches the UUID and scopes of the token presented by the transport.
	///
	/// The body is decoded whatever the HTTP status: an unauthenticated call resolves to a
	/// [`TokenResponse`] carrying only the API's `message`. Bodies that are not the expected
	/// JSON object fail with [`Error::ResponseParse`].
	pub async fn token_scopes(&self) -> Result<TokenResponse> {
		observe(Operation::TokenScopes, "token_scopes", async move {
			let request = self.request(Method::GET)?;
			let response = self.transport.execute(request).await?;

			TokenResponse::decode(&response)
		})
		.await
	}

	/// Revokes the token presented by the transport.
	///
	/// The returned [`TokenResponse`] carries the HTTP status line (e.g. `204 No Content`) as its
	/// `message`. The status itself is not checked, so a rejected revocation surfaces as
	/// `401 Unauthorized` rather than an error.
	pub async fn revoke_token(&self) -> Result<TokenResponse> {
		observe(Operation::RevokeToken, "revoke_token", async move {
			let request = self.request(Method::DELETE)?;
			let response = self.transport.execute(request).await?;

			Ok(TokenResponse::from_status(response.status()))
		})
		.await
	}

	fn request(&self, method: Method) -> Result<HttpRequest> {
		::http::Request::builder()
			.method(method)
			.uri(self.endpoint.as_str())
			.header(ACCEPT, "application/json")
			.body(Vec::new())
			.map_err(|e| ConfigError::from(e).into())
	}
}
#[cfg(feature = "reqwest")]
impl Client<AuthTransport<ReqwestTransport>> {
	/// Creates a client for the default Buildkite host authenticated with `token`.
	///
	/// Set `debug` to log every outgoing request and its response at DEBUG level.
	pub fn new(token: impl Into<ApiToken>, debug: bool) -> Result<Self> {
		Self::from_config(ClientConfig::builder(token).debug(debug).build()?)
	}

	/// Creates a client from a validated [`ClientConfig`].
	pub fn from_config(config: ClientConfig) -> Result<Self> {
		let transport = AuthTransport::new(ReqwestTransport::from_config(&config)?, &config.token)?
			.with_debug(config.debug);

		Self::with_transport(config.host, transport)
	}

	/// Creates a client from `BUILDKITE_*` environment variables.
	///
	/// See [`ClientConfig::from_lookup`] for the variables that are read.
	pub fn from_env() -> Result<Self> {
		Self::from_config(ClientConfig::from_env()?)
	}
}
impl<T> Clone for Client<T>
where
	T: HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			host: self.host.clone(),
			endpoint: self.endpoint.clone(),
			transport: Arc::clone(&self.transport),
		}
	}
}
impl<T> Debug for Client<T>
where
	T: HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("host", &self.host.as_str())
			.field("endpoint", &self.endpoint.as_str())
			.finish_non_exhaustive()
	}
}

/// Appends [`TOKEN_PATH`] to `host`, keeping any path prefix such as `/v2`.
pub fn access_token_url(host: &Url) -> Result<Url, ConfigError> {
	if host.cannot_be_a_base() {
		return Err(ConfigError::InvalidHost { host: host.to_string(), source: None });
	}

	let mut url = host.clone();
	let path = format!("{}{TOKEN_PATH}", host.path().trim_end_matches('/'));

	url.set_path(&path);

	Ok(url)
}

async fn observe<Fut, R>(operation: Operation, stage: &'static str, fut: Fut) -> Result<R>
where
	Fut: Future<Output = Result<R>>,
{
	let span = OperationSpan::new(operation, stage);
	let started = Instant::now();

	obs::record_operation_outcome(operation, OperationOutcome::Attempt);

	let result = span.instrument(fut).await;
	let outcome =
		if result.is_ok() { OperationOutcome::Success } else { OperationOutcome::Failure };

	span.record_outcome(outcome);
	obs::record_operation_outcome(operation, outcome);
	obs::record_operation_duration(operation, outcome, started.elapsed());

	result
}

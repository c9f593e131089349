//! Client configuration: a validated [`ClientConfig`] assembled through a builder or loaded from
//! `BUILDKITE_*` environment variables.

// crates.io
use url::Host;
// self
use crate::{_prelude::*, auth::ApiToken, client::DEFAULT_HOST, error::ConfigError};

/// Environment variable holding the API token (required).
pub const ENV_API_TOKEN: &str = "BUILDKITE_API_TOKEN";
/// Environment variable overriding the API host.
pub const ENV_API_HOST: &str = "BUILDKITE_API_HOST";
/// Environment variable toggling request logging.
pub const ENV_DEBUG: &str = "BUILDKITE_DEBUG";
/// Environment variable setting the request timeout in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "BUILDKITE_TIMEOUT_SECS";
/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("buildkite-token/", env!("CARGO_PKG_VERSION"));

/// Validated settings consumed by [`Client::from_config`](crate::client::Client::from_config).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// API base URL; the access-token path is appended to it.
	pub host: Url,
	/// Bearer token presented on every request.
	pub token: ApiToken,
	/// Logs outgoing requests and their responses at DEBUG level when set.
	pub debug: bool,
	/// Optional end-to-end request timeout.
	pub timeout: Option<Duration>,
	/// Value of the `User-Agent` header.
	pub user_agent: String,
}
impl ClientConfig {
	/// Creates a new builder for the provided token.
	pub fn builder(token: impl Into<ApiToken>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(token)
	}

	/// Loads the configuration from the process environment.
	///
	/// See [`ClientConfig::from_lookup`] for the variables that are read.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|var| std::env::var(var).ok())
	}

	/// Loads the configuration through an arbitrary variable lookup.
	///
	/// - [`ENV_API_TOKEN`] is required.
	/// - [`ENV_API_HOST`] defaults to [`DEFAULT_HOST`].
	/// - [`ENV_DEBUG`] accepts `1/true/yes/on` or `0/false/no/off`, case-insensitively.
	/// - [`ENV_TIMEOUT_SECS`] must be an unsigned integer.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let token = lookup(ENV_API_TOKEN).ok_or(ConfigError::MissingEnv { var: ENV_API_TOKEN })?;
		let mut builder = Self::builder(token);

		if let Some(host) = lookup(ENV_API_HOST) {
			builder = builder.host_str(host);
		}
		if let Some(raw) = lookup(ENV_DEBUG) {
			builder = builder.debug(parse_flag(ENV_DEBUG, &raw)?);
		}
		if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
			let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
				var: ENV_TIMEOUT_SECS,
				value: raw.clone(),
			})?;

			builder = builder.timeout(Duration::from_secs(secs));
		}

		builder.build()
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Token being configured.
	pub token: ApiToken,
	/// Raw host override; parsed and validated by [`build`](Self::build).
	pub host: Option<String>,
	/// Request logging toggle.
	pub debug: bool,
	/// Optional request timeout.
	pub timeout: Option<Duration>,
	/// Optional user agent override.
	pub user_agent: Option<String>,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the provided token.
	pub fn new(token: impl Into<ApiToken>) -> Self {
		Self { token: token.into(), host: None, debug: false, timeout: None, user_agent: None }
	}

	/// Sets the API host.
	pub fn host(mut self, url: Url) -> Self {
		self.host = Some(url.into());

		self
	}

	/// Sets the API host from a string, deferring parsing to [`build`](Self::build).
	pub fn host_str(mut self, url: impl Into<String>) -> Self {
		self.host = Some(url.into());

		self
	}

	/// Enables or disables request logging.
	pub fn debug(mut self, debug: bool) -> Self {
		self.debug = debug;

		self
	}

	/// Sets the request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Overrides the `User-Agent` header.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		if self.token.is_empty() {
			return Err(ConfigError::EmptyToken);
		}

		let host = validate_host(self.host.as_deref().unwrap_or(DEFAULT_HOST))?;

		Ok(ClientConfig {
			host,
			token: self.token,
			debug: self.debug,
			timeout: self.timeout,
			user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
		})
	}
}

/// Parses `raw` as an API host, requiring HTTPS for anything but loopback addresses.
pub fn validate_host(raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw.trim())
		.map_err(|source| ConfigError::InvalidHost { host: raw.to_owned(), source: Some(source) })?;

	if url.cannot_be_a_base() || url.host().is_none() {
		return Err(ConfigError::InvalidHost { host: raw.to_owned(), source: None });
	}

	match url.scheme() {
		"https" => Ok(url),
		"http" if is_loopback(&url) => Ok(url),
		_ => Err(ConfigError::InsecureHost { url: url.into() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => ip.is_loopback(),
		Some(Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidEnv { var, value: raw.to_owned() }),
	}
}

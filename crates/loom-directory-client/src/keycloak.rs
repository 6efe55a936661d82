// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Keycloak admin REST client with client-credentials token caching.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use loom_common_config::SecretString;
use loom_common_http::{retry, RetryConfig};
use loom_directory_core::{Group, UserRecord};
use reqwest::header::LOCATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, trace};
use url::Url;

use crate::client::DirectoryClient;
use crate::error::DirectoryError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct KeycloakConfig {
	pub base_url: Url,
	pub realm: String,
	pub client_id: String,
	pub client_secret: SecretString,
	pub timeout: Duration,
	pub retry_config: RetryConfig,
}

impl KeycloakConfig {
	pub fn new(
		base_url: Url,
		realm: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: SecretString,
	) -> Self {
		Self {
			base_url,
			realm: realm.into(),
			client_id: client_id.into(),
			client_secret,
			timeout: DEFAULT_TIMEOUT,
			retry_config: RetryConfig::default(),
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
		self.retry_config = retry_config;
		self
	}
}

struct CachedToken {
	token: String,
	expires_at: Instant,
}

impl CachedToken {
	fn new(token: String, valid_for: Duration) -> Self {
		Self {
			token,
			expires_at: Instant::now() + valid_for,
		}
	}

	fn is_valid(&self, margin: Duration) -> bool {
		Instant::now() + margin < self.expires_at
	}
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	access_token: String,
	expires_in: u64,
}

#[derive(Debug, Serialize)]
struct CredentialRepresentation<'a> {
	#[serde(rename = "type")]
	kind: &'static str,
	value: &'a str,
	temporary: bool,
}

/// Client for the Keycloak admin API of a single realm.
///
/// Idempotent calls go through the shared retry policy. User creation is sent
/// once. A 401 from an admin endpoint drops the cached token and the call is
/// repeated with a fresh one.
#[derive(Clone)]
pub struct KeycloakClient {
	http_client: Client,
	config: KeycloakConfig,
	token_cache: Arc<Mutex<Option<CachedToken>>>,
}

impl KeycloakClient {
	pub fn new(config: KeycloakConfig) -> Result<Self, DirectoryError> {
		if config.base_url.cannot_be_a_base() {
			return Err(DirectoryError::Config(format!(
				"directory URL cannot carry a path: {}",
				config.base_url
			)));
		}

		let http_client = loom_common_http::builder()
			.timeout(config.timeout)
			.build()
			.map_err(|e| DirectoryError::Config(format!("failed to create HTTP client: {e}")))?;

		info!(
			base_url = %config.base_url,
			realm = %config.realm,
			client_id = %config.client_id,
			"created Keycloak client"
		);

		Ok(Self {
			http_client,
			config,
			token_cache: Arc::new(Mutex::new(None)),
		})
	}

	fn url(&self, segments: &[&str]) -> Result<Url, DirectoryError> {
		let mut url = self.config.base_url.clone();
		url
			.path_segments_mut()
			.map_err(|_| DirectoryError::Config("directory URL cannot carry a path".to_string()))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	fn admin_url(&self, segments: &[&str]) -> Result<Url, DirectoryError> {
		let mut all = vec!["admin", "realms", self.config.realm.as_str()];
		all.extend_from_slice(segments);
		self.url(&all)
	}

	async fn access_token(&self) -> Result<String, DirectoryError> {
		let mut cache = self.token_cache.lock().await;
		if let Some(cached) = cache.as_ref() {
			if cached.is_valid(TOKEN_REFRESH_MARGIN) {
				trace!("using cached directory token");
				return Ok(cached.token.clone());
			}
		}

		debug!("fetching directory access token");
		let (token, valid_for) = self.fetch_token().await?;
		*cache = Some(CachedToken::new(token.clone(), valid_for));
		Ok(token)
	}

	async fn invalidate_token(&self) {
		let mut cache = self.token_cache.lock().await;
		if cache.take().is_some() {
			info!("invalidated directory token cache");
		}
	}

	async fn fetch_token(&self) -> Result<(String, Duration), DirectoryError> {
		let url = self.url(&[
			"realms",
			self.config.realm.as_str(),
			"protocol",
			"openid-connect",
			"token",
		])?;

		let response = self
			.http_client
			.post(url)
			.form(&[
				("grant_type", "client_credentials"),
				("client_id", self.config.client_id.as_str()),
				("client_secret", self.config.client_secret.expose().as_str()),
			])
			.send()
			.await
			.map_err(map_send_error)?;

		let status = response.status();
		if !status.is_success() {
			error!(status = status.as_u16(), "directory token request failed");
			if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
				return Err(DirectoryError::Unauthorized);
			}
			let body = response.text().await.unwrap_or_default();
			return Err(DirectoryError::Api {
				status: status.as_u16(),
				message: body,
			});
		}

		let token: TokenResponse = parse_json(response).await?;
		Ok((token.access_token, Duration::from_secs(token.expires_in)))
	}

	async fn send<F>(&self, method: Method, url: Url, customize: F) -> Result<Response, DirectoryError>
	where
		F: Fn(RequestBuilder) -> RequestBuilder + Send + Sync,
	{
		let token = self.access_token().await?;
		let response = self
			.send_once(method.clone(), url.clone(), &token, &customize)
			.await?;
		if response.status() != StatusCode::UNAUTHORIZED {
			return check_status(response).await;
		}

		info!("directory rejected access token, refreshing");
		self.invalidate_token().await;
		let token = self.access_token().await?;
		let response = self.send_once(method, url, &token, &customize).await?;
		check_status(response).await
	}

	async fn send_once<F>(
		&self,
		method: Method,
		url: Url,
		token: &str,
		customize: &F,
	) -> Result<Response, DirectoryError>
	where
		F: Fn(RequestBuilder) -> RequestBuilder + Send + Sync,
	{
		debug!(%method, %url, "sending directory request");
		customize(self.http_client.request(method, url).bearer_auth(token))
			.send()
			.await
			.map_err(map_send_error)
	}

	async fn get_json<T: DeserializeOwned>(
		&self,
		url: &Url,
		query: &[(String, String)],
	) -> Result<T, DirectoryError> {
		let response = self.send(Method::GET, url.clone(), |r| r.query(query)).await?;
		parse_json(response).await
	}

	async fn put_json<B>(&self, url: &Url, body: &B) -> Result<(), DirectoryError>
	where
		B: Serialize + Sync + ?Sized,
	{
		self.send(Method::PUT, url.clone(), |r| r.json(body)).await?;
		Ok(())
	}

	async fn send_empty(&self, method: Method, url: &Url) -> Result<(), DirectoryError> {
		self.send(method, url.clone(), |r| r).await?;
		Ok(())
	}
}

#[async_trait]
impl DirectoryClient for KeycloakClient {
	#[instrument(skip(self))]
	async fn list_users(
		&self,
		query: &[(String, String)],
	) -> Result<Vec<UserRecord>, DirectoryError> {
		let url = self.admin_url(&["users"])?;
		retry(&self.config.retry_config, || self.get_json(&url, query)).await
	}

	#[instrument(skip(self))]
	async fn get_user(&self, user_id: &str) -> Result<UserRecord, DirectoryError> {
		let url = self.admin_url(&["users", user_id])?;
		retry(&self.config.retry_config, || self.get_json(&url, &[])).await
	}

	#[instrument(skip(self, user))]
	async fn create_user(&self, user: &UserRecord) -> Result<String, DirectoryError> {
		let url = self.admin_url(&["users"])?;
		let response = self.send(Method::POST, url, |r| r.json(user)).await?;

		let location = response
			.headers()
			.get(LOCATION)
			.and_then(|v| v.to_str().ok())
			.ok_or_else(|| {
				DirectoryError::InvalidResponse("user created without a Location header".to_string())
			})?;
		let user_id = id_from_location(location).ok_or_else(|| {
			DirectoryError::InvalidResponse(format!("unrecognised Location header: {location}"))
		})?;

		info!(user_id = %user_id, "directory user created");
		Ok(user_id)
	}

	#[instrument(skip(self, fields))]
	async fn update_user(&self, user_id: &str, fields: &UserRecord) -> Result<(), DirectoryError> {
		let url = self.admin_url(&["users", user_id])?;
		retry(&self.config.retry_config, || self.put_json(&url, fields)).await
	}

	#[instrument(skip(self))]
	async fn list_groups(&self) -> Result<Vec<Group>, DirectoryError> {
		let url = self.admin_url(&["groups"])?;
		let query = [("briefRepresentation".to_string(), "true".to_string())];
		retry(&self.config.retry_config, || self.get_json(&url, &query)).await
	}

	#[instrument(skip(self))]
	async fn list_user_groups(&self, user_id: &str) -> Result<Vec<Group>, DirectoryError> {
		let url = self.admin_url(&["users", user_id, "groups"])?;
		retry(&self.config.retry_config, || self.get_json(&url, &[])).await
	}

	#[instrument(skip(self))]
	async fn add_membership(&self, user_id: &str, group_id: &str) -> Result<(), DirectoryError> {
		let url = self.admin_url(&["users", user_id, "groups", group_id])?;
		retry(&self.config.retry_config, || {
			self.send_empty(Method::PUT, &url)
		})
		.await
	}

	#[instrument(skip(self))]
	async fn remove_membership(
		&self,
		user_id: &str,
		group_id: &str,
	) -> Result<(), DirectoryError> {
		let url = self.admin_url(&["users", user_id, "groups", group_id])?;
		retry(&self.config.retry_config, || {
			self.send_empty(Method::DELETE, &url)
		})
		.await
	}

	#[instrument(skip(self, password))]
	async fn reset_password(&self, user_id: &str, password: &str) -> Result<(), DirectoryError> {
		let url = self.admin_url(&["users", user_id, "reset-password"])?;
		let credential = CredentialRepresentation {
			kind: "password",
			value: password,
			temporary: true,
		};
		retry(&self.config.retry_config, || self.put_json(&url, &credential)).await
	}
}

fn map_send_error(e: reqwest::Error) -> DirectoryError {
	if e.is_timeout() {
		error!("directory request timed out");
		return DirectoryError::Timeout;
	}
	error!(error = %e, "network error during directory request");
	DirectoryError::Network(e)
}

async fn check_status(response: Response) -> Result<Response, DirectoryError> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}

	match status {
		StatusCode::NOT_FOUND => Err(DirectoryError::NotFound),
		StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
			error!(status = status.as_u16(), "directory refused the service account");
			Err(DirectoryError::Unauthorized)
		}
		_ => {
			let body = response.text().await.unwrap_or_default();
			error!(status = status.as_u16(), body = %body, "directory API error");
			Err(DirectoryError::Api {
				status: status.as_u16(),
				message: body,
			})
		}
	}
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, DirectoryError> {
	response.json().await.map_err(|e| {
		error!(error = %e, "failed to parse directory response");
		DirectoryError::InvalidResponse(format!("JSON parse error: {e}"))
	})
}

/// The created user's id is the last path segment of the `Location` header.
fn id_from_location(location: &str) -> Option<String> {
	let url = Url::parse(location).ok()?;
	url
		.path_segments()?
		.filter(|segment| !segment.is_empty())
		.last()
		.map(str::to_string)
}

#[cfg(test)]
mod tests {
	use super::*;
	use loom_common_config::Secret;

	fn client(base: &str) -> KeycloakClient {
		let config = KeycloakConfig::new(
			Url::parse(base).unwrap(),
			"campus",
			"loom",
			Secret::new("s3cret".to_string()),
		);
		KeycloakClient::new(config).unwrap()
	}

	#[test]
	fn id_is_taken_from_location() {
		assert_eq!(
			id_from_location("https://sso.example.org/admin/realms/campus/users/8f0e-11"),
			Some("8f0e-11".to_string())
		);
		assert_eq!(
			id_from_location("https://sso.example.org/admin/realms/campus/users/8f0e-11/"),
			Some("8f0e-11".to_string())
		);
		assert_eq!(id_from_location("not a url"), None);
	}

	#[test]
	fn admin_urls_are_realm_scoped() {
		let client = client("https://sso.example.org/auth/");
		let url = client.admin_url(&["users", "u1", "groups", "g1"]).unwrap();
		assert_eq!(
			url.as_str(),
			"https://sso.example.org/auth/admin/realms/campus/users/u1/groups/g1"
		);
	}

	#[test]
	fn path_segments_are_escaped() {
		let client = client("https://sso.example.org");
		let url = client.admin_url(&["users", "a/b"]).unwrap();
		assert_eq!(
			url.as_str(),
			"https://sso.example.org/admin/realms/campus/users/a%2Fb"
		);
	}

	#[test]
	fn config_debug_redacts_secret() {
		let config = KeycloakConfig::new(
			Url::parse("https://sso.example.org").unwrap(),
			"campus",
			"loom",
			Secret::new("s3cret".to_string()),
		);
		assert!(!format!("{config:?}").contains("s3cret"));
	}

	#[test]
	fn cached_token_honours_margin() {
		let token = CachedToken::new("t".to_string(), Duration::from_secs(10));
		assert!(token.is_valid(Duration::from_secs(1)));
		assert!(!token.is_valid(Duration::from_secs(30)));
	}
}

use std::env;
use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::transport::{MEMBER_LOOKUP_LIMIT, MESSAGE_FETCH_LIMIT, Transport};
use crate::types::{Channel, Community, DirectMessageChannel, Member, Message, Presence, User};

const DEFAULT_API_URL: &str = "https://discord.com/api/v10/";
const TOKEN_VAR: &str = "CHATLINE_TOKEN";
const USER_AGENT: &str = concat!("chatline/", env!("CARGO_PKG_VERSION"));

const CHANNEL_TEXT: u8 = 0;
const CHANNEL_DM: u8 = 1;
const CHANNEL_GROUP_DM: u8 = 3;
const CHANNEL_ANNOUNCEMENT: u8 = 5;

/// REST client for a Discord-compatible chat API.
#[derive(Debug, Clone)]
pub struct RestClient {
    token: String,
    client: ReqwestClient,
    base_url: Url,
    timeout: Option<Duration>,
}

impl RestClient {
    /// Create a new client.
    ///
    /// The token can be provided directly or read from the CHATLINE_TOKEN
    /// environment variable.  Requests carry no timeout.
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_options(token, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        token: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let token = match token {
            Some(token) => token,
            None => env::var(TOKEN_VAR).map_err(|_| {
                Error::authentication(
                    "token not provided and CHATLINE_TOKEN environment variable not set",
                )
            })?,
        };

        let mut base_url = base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url)?;

        let mut builder = ReqwestClient::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            token,
            client,
            base_url,
            timeout,
        })
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let authorization = HeaderValue::from_str(&self.token)
            .map_err(|_| Error::authentication("token contains characters not valid in a header"))?;
        headers.insert(header::AUTHORIZATION, authorization);
        Ok(headers)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        let url = self.endpoint(path)?;
        tracing::debug!(%method, %url, "request");
        CLIENT_REQUESTS.click();
        let start = Instant::now();

        let mut request = self
            .client
            .request(method, url)
            .headers(self.default_headers()?);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            CLIENT_REQUEST_ERRORS.click();
            if e.is_timeout() {
                Error::timeout(
                    format!("Request timed out: {}", e),
                    self.timeout.map(|t| t.as_secs_f64()),
                )
            } else if e.is_connect() {
                Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
            } else {
                Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
            }
        })?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    async fn get<R: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<R> {
        let response = self.execute(Method::GET, path, query, None).await?;
        response.json::<R>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<f64>().ok());

        match response.text().await {
            Ok(body) => error_from_body(status_code, &body, retry_after),
            Err(e) => Error::http_client(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            ),
        }
    }
}

/// Maps a failed response onto an [`Error`] variant.
///
/// The platform's JSON error body (`message`, `code`, `retry_after`) is used
/// when present; otherwise the raw body becomes the message.
fn error_from_body(status_code: u16, body: &str, retry_after: Option<f64>) -> Error {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        code: Option<u64>,
        retry_after: Option<f64>,
    }

    let parsed = serde_json::from_str::<ErrorBody>(body).ok();
    let code = parsed.as_ref().and_then(|e| e.code);
    let retry_after = parsed
        .as_ref()
        .and_then(|e| e.retry_after)
        .or(retry_after);
    let message = parsed
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.to_string());

    match status_code {
        400 => Error::bad_request(message),
        401 => Error::authentication(message),
        403 => Error::permission(message),
        404 => Error::not_found(message, None, None),
        408 => Error::timeout(message, None),
        429 => Error::rate_limit(message, retry_after),
        500..=599 => Error::server(status_code, message),
        _ => Error::api(status_code, code, message),
    }
}

#[derive(Deserialize)]
struct ChannelRecord {
    id: String,
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    position: Option<i64>,
    #[serde(default)]
    recipients: Vec<User>,
}

#[async_trait::async_trait]
impl Transport for RestClient {
    async fn current_user(&self) -> Result<User> {
        self.get("users/@me", &[]).await
    }

    async fn list_communities(&self) -> Result<Vec<Community>> {
        self.get("users/@me/guilds", &[]).await
    }

    async fn list_channels(&self, community_id: &str) -> Result<Vec<Channel>> {
        let mut records: Vec<ChannelRecord> = self
            .get(&format!("guilds/{community_id}/channels"), &[])
            .await?;
        records.retain(|r| r.kind == CHANNEL_TEXT || r.kind == CHANNEL_ANNOUNCEMENT);
        records.sort_by_key(|r| r.position.unwrap_or(i64::MAX));
        Ok(records
            .into_iter()
            .map(|r| Channel::community(r.id, r.name.unwrap_or_default()))
            .collect())
    }

    async fn list_members(&self, community_id: &str, limit: u16) -> Result<Vec<Member>> {
        let limit = limit.clamp(1, MEMBER_LOOKUP_LIMIT);
        self.get(
            &format!("guilds/{community_id}/members"),
            &[("limit", limit.to_string())],
        )
        .await
    }

    async fn list_direct_message_channels(&self) -> Result<Vec<DirectMessageChannel>> {
        let records: Vec<ChannelRecord> = self.get("users/@me/channels", &[]).await?;
        Ok(records
            .into_iter()
            .filter(|r| r.kind == CHANNEL_DM || r.kind == CHANNEL_GROUP_DM)
            .map(|r| DirectMessageChannel::new(r.id, r.recipients))
            .collect())
    }

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<()> {
        let body = serde_json::json!({ "content": text });
        self.execute(
            Method::POST,
            &format!("channels/{channel_id}/messages"),
            &[],
            Some(body),
        )
        .await?;
        Ok(())
    }

    async fn set_presence(&self, presence: &Presence) -> Result<()> {
        let body = serde_json::to_value(presence)?;
        self.execute(Method::PATCH, "users/@me/settings", &[], Some(body))
            .await?;
        Ok(())
    }

    async fn fetch_messages(
        &self,
        channel_id: &str,
        after: Option<&str>,
        limit: u8,
    ) -> Result<Vec<Message>> {
        let mut query = vec![("limit", limit.clamp(1, MESSAGE_FETCH_LIMIT).to_string())];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }
        self.get(&format!("channels/{channel_id}/messages"), &query)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: Option<&str>) -> RestClient {
        RestClient::with_options(
            Some("test-token".to_string()),
            base_url.map(String::from),
            None,
        )
        .unwrap()
    }

    #[test]
    fn endpoints_resolve_against_base() {
        let client = client(None);
        assert_eq!(
            client.endpoint("guilds/1/members").unwrap().as_str(),
            "https://discord.com/api/v10/guilds/1/members"
        );
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = client(Some("http://localhost:8080/api"));
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/api/");
        assert_eq!(
            client.endpoint("users/@me").unwrap().as_str(),
            "http://localhost:8080/api/users/@me"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = RestClient::with_options(
            Some("test-token".to_string()),
            Some("not a url".to_string()),
            None,
        );
        assert!(matches!(result, Err(Error::Url { .. })));
    }

    #[test]
    fn token_with_newline_is_rejected_at_request_time() {
        let client = RestClient::with_options(Some("bad\ntoken".to_string()), None, None).unwrap();
        assert!(client.default_headers().unwrap_err().is_authentication());
    }

    #[test]
    fn error_body_maps_status_codes() {
        let body = r#"{"message": "Missing Access", "code": 50001}"#;
        assert!(error_from_body(403, body, None).is_permission());
        assert!(error_from_body(404, body, None).is_not_found());
        assert!(error_from_body(401, body, None).is_authentication());
        assert_eq!(
            error_from_body(418, body, None).to_string(),
            "API error 418: Missing Access (code 50001)"
        );
    }

    #[test]
    fn rate_limit_prefers_body_retry_after() {
        let body = r#"{"message": "You are being rate limited.", "retry_after": 0.25, "global": false}"#;
        match error_from_body(429, body, Some(2.0)) {
            Error::RateLimit { retry_after, .. } => assert_eq!(retry_after, Some(0.25)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_json_body_becomes_message() {
        let err = error_from_body(502, "Bad Gateway", None);
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "Server error 502: Bad Gateway");
    }

    #[test]
    fn channel_records_parse() {
        let json = serde_json::json!([
            {"id": "1", "type": 0, "name": "general", "position": 2},
            {"id": "2", "type": 2, "name": "voice", "position": 0},
            {"id": "3", "type": 1, "recipients": [{"id": "9", "username": "alice"}]}
        ]);
        let records: Vec<ChannelRecord> = serde_json::from_value(json).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].kind, CHANNEL_TEXT);
        assert_eq!(records[2].recipients[0].username, "alice");
        assert!(records[2].name.is_none());
    }
}

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::core::moderation::{MessagePayload, MessageSender, MessageTs, PostedMessage, SendError};

pub const DEFAULT_SLACK_API_BASE_URL: &str = "https://slack.com/api";

/// Who the bot token belongs to, as reported by `auth.test`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub user_id: String,
    pub team: String,
}

/// Minimal Slack Web API client. Only the calls the bot needs.
pub struct SlackApiClient {
    client: Client,
    base_url: String,
}

impl SlackApiClient {
    pub fn new() -> Result<Self, SendError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        headers.insert(
            "User-Agent",
            HeaderValue::from_static("AtChannelBot/1.0"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SendError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: DEFAULT_SLACK_API_BASE_URL.to_string(),
        })
    }

    /// Point the client at another API root (a proxy, or a mock server in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Check that `token` is valid and find out which bot it belongs to.
    pub async fn auth_test(&self, token: &str) -> Result<BotIdentity, SendError> {
        let resp: ApiAuthTest = self.call("auth.test", token, &json!({})).await?;

        match (resp.user_id, resp.team) {
            (Some(user_id), Some(team)) => Ok(BotIdentity { user_id, team }),
            _ => Err(SendError::MalformedResponse(
                "auth.test response is missing user_id or team".to_string(),
            )),
        }
    }

    /// POST a JSON body to a Web API method and unwrap Slack's `ok`/`error` envelope.
    async fn call<B, T>(&self, method: &str, token: &str, body: &B) -> Result<T, SendError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        let auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| SendError::Transport(format!("invalid bot token: {}", e)))?;

        tracing::debug!(method, "Calling Slack API");

        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, auth)
            .json(body)
            .send()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_else(|_| "unknown".to_string());
            return Err(SendError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| SendError::MalformedResponse(e.to_string()))?;

        // Slack reports API errors with HTTP 200 and `ok: false`
        let envelope: ApiEnvelope = serde_json::from_value(value.clone())
            .map_err(|e| SendError::MalformedResponse(e.to_string()))?;
        if !envelope.ok {
            let code = envelope.error.unwrap_or_else(|| "unknown_error".to_string());
            tracing::warn!(method, error = %code, "Slack API call failed");
            return Err(SendError::Api(code));
        }

        serde_json::from_value(value).map_err(|e| SendError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl MessageSender for SlackApiClient {
    async fn post_message(&self, payload: &MessagePayload) -> Result<PostedMessage, SendError> {
        let resp: ApiPostMessage = self
            .call("chat.postMessage", &payload.token, payload)
            .await?;

        let ts = resp.ts.ok_or_else(|| {
            SendError::MalformedResponse("chat.postMessage response has no ts".to_string())
        })?;

        Ok(PostedMessage {
            channel: resp.channel.unwrap_or_else(|| payload.channel.clone()),
            ts: MessageTs::new(ts),
        })
    }
}

// ============================================================================
// API RESPONSE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    ok: bool,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPostMessage {
    channel: Option<String>,
    ts: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiAuthTest {
    user_id: Option<String>,
    team: Option<String>,
}

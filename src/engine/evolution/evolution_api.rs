// Evolution Client: Evolution API Calls
// EvolutionClient: get_information, get_connection_state, find_chats,
// find_messages(_raw), send_message, fetch_all_groups

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::config::{validate_base_url, EvolutionConfig};
use super::messages::filter_group_messages;
use crate::atoms::constants::{API_KEY_HEADER, FIND_MESSAGES_LIMIT};
use crate::atoms::error::{EvolutionError, EvolutionResult};
use crate::atoms::traits::GroupSource;
use crate::atoms::types::{Chat, ConnectionState, Group, Message, SendReceipt, ServiceInfo};

// ── Response envelopes ─────────────────────────────────────────────────

/// findMessages answers with a flat array on v1 and a paged object on v2.
#[derive(Deserialize)]
#[serde(untagged)]
enum MessagesResponse {
    List(Vec<Value>),
    Paged { messages: MessagePage },
}

#[derive(Deserialize)]
struct MessagePage {
    #[serde(default)]
    records: Vec<Value>,
}

impl MessagesResponse {
    fn into_records(self) -> Vec<Value> {
        match self {
            MessagesResponse::List(records) => records,
            MessagesResponse::Paged { messages } => messages.records,
        }
    }
}

// ── Client ─────────────────────────────────────────────────────────────

/// Stateless client for one Evolution API instance.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct EvolutionClient {
    client: reqwest::Client,
    config: EvolutionConfig,
}

impl EvolutionClient {
    /// Build a client with the `apikey` + JSON content-type headers and the
    /// configured timeout applied to every request.
    pub fn new(config: EvolutionConfig) -> EvolutionResult<Self> {
        config.validate()?;
        if config.uses_placeholder_key() {
            warn!("[evolution] No API key configured, sending the placeholder key");
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(config.effective_api_key())
            .map_err(|_| EvolutionError::config("API key contains characters not allowed in a header"))?;
        headers.insert(API_KEY_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(EvolutionClient { client, config })
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Same gateway, different instance.
    pub fn with_instance(&self, instance: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.config.instance_name = instance.into();
        next
    }

    /// Same instance and key, different gateway.
    pub fn with_base_url(&self, api_url: impl Into<String>) -> EvolutionResult<Self> {
        let api_url = api_url.into();
        validate_base_url(&api_url)?;
        let mut next = self.clone();
        next.config.api_url = api_url;
        Ok(next)
    }

    // ── Endpoints ──────────────────────────────────────────────────────

    fn base_url(&self) -> &str {
        self.config.api_url.trim_end_matches('/')
    }

    /// `{base}/{route}/{instance}`, rejecting an empty instance name.
    fn instance_url(&self, route: &str) -> EvolutionResult<String> {
        let instance = self.config.instance_name.trim();
        if instance.is_empty() {
            return Err(EvolutionError::config("instance name is empty"));
        }
        Ok(format!("{}/{}/{}", self.base_url(), route, urlencoding::encode(instance)))
    }

    // ── Operations ─────────────────────────────────────────────────────

    /// `GET /`: gateway version and banner.
    pub async fn get_information(&self) -> EvolutionResult<ServiceInfo> {
        let url = format!("{}/", self.base_url());
        send_json(self.client.get(&url), "service info").await
    }

    /// `GET /instance/connectionState/{instance}`
    pub async fn get_connection_state(&self) -> EvolutionResult<ConnectionState> {
        let url = self.instance_url("instance/connectionState")?;
        let state: ConnectionState = send_json(self.client.get(&url), "connectionState").await?;
        debug!(
            "[evolution] Instance '{}' state: {}",
            self.config.instance_name,
            state.state().unwrap_or("unknown")
        );
        Ok(state)
    }

    /// `GET /chat/findChats/{instance}`
    pub async fn find_chats(&self) -> EvolutionResult<Vec<Chat>> {
        let url = self.instance_url("chat/findChats")?;
        let chats: Vec<Chat> = send_json(self.client.get(&url), "findChats").await?;
        debug!("[evolution] Fetched {} chats", chats.len());
        Ok(chats)
    }

    /// Messages of one group: the server-side `remoteJid` match narrowed by
    /// [`filter_group_messages`].
    pub async fn find_messages(&self, group_id: &str) -> EvolutionResult<Vec<Message>> {
        let messages = self.find_messages_raw(group_id).await?;
        let filtered = filter_group_messages(messages, group_id);
        debug!("[evolution] Filtered to {} group messages for {}", filtered.len(), group_id);
        Ok(filtered)
    }

    /// `POST /chat/findMessages/{instance}` without the group filter.
    /// Records that do not decode (e.g. no `key`) are skipped.
    pub async fn find_messages_raw(&self, group_id: &str) -> EvolutionResult<Vec<Message>> {
        let url = self.instance_url("chat/findMessages")?;
        let body = json!({
            "where": {
                "key": {
                    "remoteJid": group_id,
                },
            },
            "limit": FIND_MESSAGES_LIMIT,
        });

        let response: MessagesResponse =
            send_json(self.client.post(&url).json(&body), "findMessages").await?;
        let messages = decode_records::<Message>(response.into_records(), "message");
        debug!("[evolution] Fetched {} messages for {}", messages.len(), group_id);
        Ok(messages)
    }

    /// `POST /message/sendText/{instance}`
    pub async fn send_message(&self, text: &str, number: &str) -> EvolutionResult<SendReceipt> {
        let url = self.instance_url("message/sendText")?;
        let body = json!({
            "number": number,
            "textMessage": {
                "text": text,
            },
        });

        let receipt: SendReceipt = send_json(self.client.post(&url).json(&body), "sendText").await?;
        info!(
            "[evolution] Sent {} chars to {} (id {})",
            text.chars().count(),
            number,
            receipt.message_id().unwrap_or("?")
        );
        Ok(receipt)
    }

    /// `GET /group/fetchAllGroups/{instance}?getParticipants=true`
    pub async fn fetch_all_groups(&self) -> EvolutionResult<Vec<Group>> {
        let url = self.instance_url("group/fetchAllGroups")?;
        let request = self.client.get(&url).query(&[("getParticipants", "true")]);
        let records: Vec<Value> = send_json(request, "fetchAllGroups").await?;
        let groups = decode_records::<Group>(records, "group");
        debug!("[evolution] Fetched {} groups", groups.len());
        Ok(groups)
    }
}

#[async_trait]
impl GroupSource for EvolutionClient {
    async fn fetch_all_groups(&self) -> EvolutionResult<Vec<Group>> {
        EvolutionClient::fetch_all_groups(self).await
    }
}

// ── Helpers ────────────────────────────────────────────────────────────

async fn send_json<T: DeserializeOwned>(request: RequestBuilder, what: &str) -> EvolutionResult<T> {
    let resp = request.send().await?;
    read_json(resp, what).await
}

/// Non-2xx → `Gateway`, undecodable body → `Decode`.
async fn read_json<T: DeserializeOwned>(resp: Response, what: &str) -> EvolutionResult<T> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        let err = EvolutionError::gateway(status.as_u16(), &text);
        warn!("[evolution] {} failed: {}", what, err);
        return Err(err);
    }

    Ok(serde_json::from_str(&text)?)
}

fn decode_records<T: DeserializeOwned>(records: Vec<Value>, kind: &str) -> Vec<T> {
    let total = records.len();
    let decoded: Vec<T> = records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("[evolution] Skipping undecodable {}: {}", kind, e);
                None
            }
        })
        .collect();
    if decoded.len() < total {
        debug!("[evolution] Decoded {} of {} {} records", decoded.len(), total, kind);
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> EvolutionClient {
        EvolutionClient::new(EvolutionConfig::default()).unwrap()
    }

    #[test]
    fn instance_urls_are_built_from_config() {
        let c = client().with_base_url("http://evo.local:8080/").unwrap();
        assert_eq!(
            c.instance_url("chat/findChats").unwrap(),
            "http://evo.local:8080/chat/findChats/carpool"
        );
    }

    #[test]
    fn instance_names_are_percent_encoded() {
        let c = client().with_instance("zona sul/2");
        assert_eq!(
            c.instance_url("instance/connectionState").unwrap(),
            "http://localhost:8080/instance/connectionState/zona%20sul%2F2"
        );
    }

    #[test]
    fn empty_instance_is_a_config_error() {
        let c = client().with_instance("  ");
        assert!(matches!(c.instance_url("chat/findChats"), Err(EvolutionError::Config(_))));
    }

    #[test]
    fn with_base_url_validates() {
        assert!(client().with_base_url("nope").is_err());
    }

    #[test]
    fn api_key_with_newline_is_rejected() {
        let config = EvolutionConfig { api_key: "abc\ndef".into(), ..EvolutionConfig::default() };
        assert!(matches!(EvolutionClient::new(config), Err(EvolutionError::Config(_))));
    }

    #[test]
    fn messages_response_accepts_both_layouts() {
        let flat: MessagesResponse = serde_json::from_value(json!([{"key": {}}])).unwrap();
        assert_eq!(flat.into_records().len(), 1);

        let paged: MessagesResponse = serde_json::from_value(json!({
            "messages": {"total": 2, "pages": 1, "currentPage": 1, "records": [{"key": {}}, {"key": {}}]}
        }))
        .unwrap();
        assert_eq!(paged.into_records().len(), 2);
    }

    #[test]
    fn undecodable_records_are_skipped() {
        let records = vec![
            json!({"key": {"remoteJid": "1@g.us", "id": "a"}}),
            json!({"pushName": "no key"}),
            json!("garbage"),
        ];
        let decoded = decode_records::<Message>(records, "message");
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].key.id, "a");
    }
}

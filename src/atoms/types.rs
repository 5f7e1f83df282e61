// ── Scout Atoms: Gateway Record Types ─────────────────────────────────────────
// Typed views over Evolution API JSON responses.
// Atoms layer rule: no I/O, no side effects, no imports from engine/.
//
// Every record is a read-only snapshot of one response. Optional fields are
// decoded leniently: a missing field, a null, or a value of the wrong JSON
// type all become `None` instead of failing the whole response.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ── Lenient decoding helpers ──────────────────────────────────────────────────

/// Decode an optional field, mapping wrong-typed values to `None`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Like [`lenient`] but falls back to `T::default()`.
pub(crate) fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

// ── Groups ────────────────────────────────────────────────────────────────────

/// A WhatsApp group as returned by `fetchAllGroups`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    /// Empty when the gateway omitted it; an empty subject never classifies.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub subject: String,
    #[serde(default, alias = "subject_owner", deserialize_with = "lenient")]
    pub subject_owner: Option<String>,
    #[serde(default, alias = "subject_time", deserialize_with = "lenient")]
    pub subject_time: Option<Epoch>,
    #[serde(default, alias = "picture_url", deserialize_with = "lenient")]
    pub picture_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub owner: Option<String>,
    /// Only populated when the request asked for `getParticipants=true`.
    #[serde(default, deserialize_with = "lenient")]
    pub participants: Option<Vec<Participant>>,
    #[serde(default, alias = "desc", deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub creation: Option<Epoch>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub restrict: bool,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub announce: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub size: Option<u32>,
}

impl Group {
    /// Participant count, preferring the expanded list over `size`.
    pub fn participant_count(&self) -> Option<usize> {
        self.participants
            .as_ref()
            .map(Vec::len)
            .or(self.size.map(|s| s as usize))
    }
}

/// A group member: either a bare JID or an `{ id, admin }` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Participant {
    Jid(String),
    Member {
        id: String,
        #[serde(default)]
        admin: Option<String>,
    },
}

impl Participant {
    pub fn id(&self) -> &str {
        match self {
            Participant::Jid(id) => id,
            Participant::Member { id, .. } => id,
        }
    }

    /// "admin" and "superadmin" both count.
    pub fn is_admin(&self) -> bool {
        matches!(self, Participant::Member { admin: Some(role), .. } if role.ends_with("admin"))
    }
}

/// Seconds since the epoch, sent either as a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Epoch {
    Seconds(i64),
    Text(String),
}

impl Epoch {
    pub fn as_secs(&self) -> Option<i64> {
        match self {
            Epoch::Seconds(s) => Some(*s),
            Epoch::Text(t) => t.trim().parse().ok(),
        }
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        self.as_secs().and_then(|s| DateTime::from_timestamp(s, 0))
    }
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// A stored message as returned by `findMessages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub key: MessageKey,
    #[serde(default, deserialize_with = "lenient")]
    pub push_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<MessageContent>,
    #[serde(default, deserialize_with = "lenient")]
    pub context_info: Option<ContextInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub message_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub message_timestamp: Option<MessageTimestamp>,
    #[serde(default, deserialize_with = "lenient")]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub message_context_info: Option<MessageContextInfo>,
}

impl Message {
    /// Plain text body, from `conversation` or `extendedTextMessage.text`.
    pub fn text(&self) -> Option<&str> {
        self.message.as_ref().and_then(MessageContent::text)
    }

    /// Group id carried by the sender-key distribution payload, if any.
    pub fn distribution_group_id(&self) -> Option<&str> {
        self.message
            .as_ref()?
            .sender_key_distribution_message
            .as_ref()?
            .group_id
            .as_deref()
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.message_timestamp.as_ref().and_then(MessageTimestamp::to_datetime)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKey {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub remote_jid: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub from_me: bool,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub participant: Option<String>,
}

/// The `message` block. Only two content kinds are modeled; every other key
/// (imageMessage, conversation, reactionMessage…) is kept verbatim in `other`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub extended_text_message: Option<ExtendedTextMessage>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub sender_key_distribution_message: Option<SenderKeyDistributionMessage>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Tagged view of the content kinds present in a [`MessageContent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageKind<'a> {
    ExtendedText(&'a ExtendedTextMessage),
    SenderKeyDistribution(&'a SenderKeyDistributionMessage),
    /// An unmodeled kind, by its JSON key.
    Other(&'a str),
}

impl MessageContent {
    pub fn kinds(&self) -> impl Iterator<Item = MessageKind<'_>> {
        self.extended_text_message
            .iter()
            .map(MessageKind::ExtendedText)
            .chain(
                self.sender_key_distribution_message
                    .iter()
                    .map(MessageKind::SenderKeyDistribution),
            )
            .chain(self.other.keys().map(|k| MessageKind::Other(k.as_str())))
    }

    pub fn text(&self) -> Option<&str> {
        self.other
            .get("conversation")
            .and_then(Value::as_str)
            .or_else(|| self.extended_text_message.as_ref().map(|m| m.text.as_str()))
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedTextMessage {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient")]
    pub matched_text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub preview_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub context_info: Option<ContextInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub invite_link_group_type_v2: Option<String>,
}

/// Encryption setup payload; its `groupId` is the only per-message group
/// correlation signal the gateway exposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderKeyDistributionMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub group_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub axolotl_sender_key_distribution_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub forwarding_score: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_forwarded: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub expiration: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub disappearing_mode: Option<DisappearingMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisappearingMode {
    #[serde(default, deserialize_with = "lenient")]
    pub initiator: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub trigger: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub initiated_by_me: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContextInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub device_list_metadata: Option<DeviceListMetadata>,
    #[serde(default, deserialize_with = "lenient")]
    pub device_list_metadata_version: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub message_secret: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListMetadata {
    #[serde(default, deserialize_with = "lenient")]
    pub sender_key_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sender_timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub recipient_key_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub recipient_timestamp: Option<String>,
}

/// `messageTimestamp`: a plain integer, or a protobuf Long split into
/// 32-bit halves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageTimestamp {
    Seconds(i64),
    Split {
        low: i64,
        high: i64,
        #[serde(default)]
        unsigned: bool,
    },
}

impl MessageTimestamp {
    pub fn as_secs(&self) -> i64 {
        match *self {
            MessageTimestamp::Seconds(s) => s,
            MessageTimestamp::Split { low, high, unsigned } => {
                let low = low as u32 as u64;
                if unsigned {
                    (((high as u32 as u64) << 32) | low) as i64
                } else {
                    ((high as i32 as i64) << 32) | low as i64
                }
            }
        }
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.as_secs(), 0)
    }
}

// ── Loosely-typed responses ──────────────────────────────────────────────────
// Shapes outside the filtering core; kept as JSON with a few accessors.

/// Response of `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceInfo(pub Value);

impl ServiceInfo {
    pub fn version(&self) -> Option<&str> {
        self.0["version"].as_str()
    }
}

/// Response of `GET /instance/connectionState/{instance}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionState(pub Value);

impl ConnectionState {
    /// v1 nests the state under `instance`, v2 puts it at the top level.
    pub fn state(&self) -> Option<&str> {
        self.0["instance"]["state"]
            .as_str()
            .or_else(|| self.0["state"].as_str())
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state(), Some("open") | Some("connected"))
    }
}

/// One entry of `GET /chat/findChats/{instance}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chat(pub Value);

impl Chat {
    pub fn id(&self) -> Option<&str> {
        self.0["remoteJid"].as_str().or_else(|| self.0["id"].as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.0["name"].as_str().or_else(|| self.0["pushName"].as_str())
    }

    pub fn is_group(&self) -> bool {
        self.id().is_some_and(|id| id.ends_with("@g.us"))
    }
}

/// Response of `POST /message/sendText/{instance}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SendReceipt(pub Value);

impl SendReceipt {
    pub fn message_id(&self) -> Option<&str> {
        self.0["key"]["id"].as_str()
    }

    pub fn status(&self) -> Option<&str> {
        self.0["status"].as_str()
    }
}

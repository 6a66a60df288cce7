use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::TagnetError;

/// Substring that flags a message as positive.
pub const POSITIVE_MARKER: &str = ":)";

/// Substring that flags a message as negative.
pub const NEGATIVE_MARKER: &str = ":(";

/// Leading token of a retweet in raw text lines.
pub const RETWEET_PREFIX: &str = "RT";

// --- Entities ---

/// A normalized (lower-cased) hashtag or screen name.
///
/// Identity is exact string equality after normalization, so `#Cats` and
/// `#cats` collapse into the same node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EntityId {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which entity family a graph is built from.
///
/// Each variant carries everything needed to find its entities: the list key
/// under a record's `entities` object, the name field on each entity object,
/// and the marker character used when scanning plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Hashtag,
    Mention,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Hashtag, EntityKind::Mention];

    /// Key of the entity list inside a record's `entities` object.
    pub fn collection_key(&self) -> &'static str {
        match self {
            EntityKind::Hashtag => "hashtags",
            EntityKind::Mention => "user_mentions",
        }
    }

    /// Field holding the entity's name on each entity object.
    pub fn name_field(&self) -> &'static str {
        match self {
            EntityKind::Hashtag => "text",
            EntityKind::Mention => "screen_name",
        }
    }

    /// Marker character preceding the entity in plain text.
    pub fn marker(&self) -> char {
        match self {
            EntityKind::Hashtag => '#',
            EntityKind::Mention => '@',
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_key())
    }
}

impl FromStr for EntityKind {
    type Err = TagnetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hashtag" | "hashtags" | "#" => Ok(EntityKind::Hashtag),
            "mention" | "mentions" | "user_mentions" | "@" => Ok(EntityKind::Mention),
            other => Err(TagnetError::UnknownKind(other.to_string())),
        }
    }
}

// --- Messages ---

/// A single post. Raw text lines and structured records both decode into this.
///
/// Unknown record fields are ignored, so full API payloads deserialize as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    /// A null flag reads as false.
    #[serde(default, deserialize_with = "null_as_false")]
    pub retweeted: bool,
    /// Entity lists keyed by kind (`hashtags`, `user_mentions`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Map<String, Value>>,
}

impl Message {
    /// Build a message from one raw text line. The retweet flag comes from a
    /// leading `RT` token.
    pub fn from_line(line: &str) -> Self {
        let text = line.trim_end_matches(['\r', '\n']);
        Self {
            retweeted: is_retweet_text(text),
            text: text.to_string(),
            entities: None,
        }
    }

    /// Decode one structured record.
    pub fn from_record(record: &Value) -> Result<Self, SkipReason> {
        Message::deserialize(record).map_err(|e| SkipReason::Decode {
            detail: e.to_string(),
        })
    }

    /// The entity objects of `kind`, or why they could not be found.
    pub fn entity_list(&self, kind: EntityKind) -> Result<&[Value], SkipReason> {
        let entities = self.entities.as_ref().ok_or(SkipReason::MissingEntities)?;
        match entities.get(kind.collection_key()) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(SkipReason::MissingEntityList { kind }),
        }
    }

    /// Per-message increments contributed to every entity in the message.
    pub fn signals(&self) -> MessageSignals {
        MessageSignals {
            retweet: self.retweeted,
            positive: self.text.contains(POSITIVE_MARKER),
            negative: self.text.contains(NEGATIVE_MARKER),
        }
    }
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// True when the text opens with a standalone `RT` token (`RT @x:`, `RT: ...`).
pub fn is_retweet_text(text: &str) -> bool {
    let Some(rest) = text.trim_start().strip_prefix(RETWEET_PREFIX) else {
        return false;
    };
    match rest.chars().next() {
        None => true,
        Some(c) => !(c.is_alphanumeric() || c == '_'),
    }
}

/// Binary per-message flags. Several smileys in one message still count once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageSignals {
    pub retweet: bool,
    pub positive: bool,
    pub negative: bool,
}

/// Why a message was left out of a pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("record did not decode: {detail}")]
    Decode { detail: String },

    #[error("record has no entities object")]
    MissingEntities,

    #[error("record has no {kind} list")]
    MissingEntityList { kind: EntityKind },

    #[error("{kind} entity is missing its {field} field")]
    MalformedEntity { kind: EntityKind, field: &'static str },
}

impl SkipReason {
    /// Stable label used when tallying skips.
    pub fn code(&self) -> &'static str {
        match self {
            SkipReason::Decode { .. } => "decode_failed",
            SkipReason::MissingEntities => "missing_entities",
            SkipReason::MissingEntityList { .. } => "missing_entity_list",
            SkipReason::MalformedEntity { .. } => "malformed_entity",
        }
    }
}

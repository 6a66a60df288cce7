//! Entity extraction: one message in, one deduplicated cluster out.

use std::collections::BTreeSet;

use regex::Regex;
use serde_json::Value;

use tagnet_common::{EntityId, EntityKind, Message, Result, SkipReason};

/// The distinct entities seen together in one message.
pub type Cluster = BTreeSet<EntityId>;

/// Where entities are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Scan the message text for word runs following `marker`.
    Text { marker: char },
    /// Read the kind's entity list from the record's `entities` object.
    Structured(EntityKind),
}

impl ExtractMode {
    /// Text scan using the kind's own marker (`#` or `@`).
    pub fn text_for(kind: EntityKind) -> Self {
        ExtractMode::Text {
            marker: kind.marker(),
        }
    }
}

pub struct Extractor {
    mode: ExtractMode,
    pattern: Option<Regex>,
}

impl Extractor {
    pub fn new(mode: ExtractMode) -> Result<Self> {
        let pattern = match mode {
            ExtractMode::Text { marker } => {
                let escaped = regex::escape(&marker.to_string());
                Some(Regex::new(&format!(r"{escaped}(\w+)"))?)
            }
            ExtractMode::Structured(_) => None,
        };
        Ok(Self { mode, pattern })
    }

    pub fn mode(&self) -> ExtractMode {
        self.mode
    }

    /// Extract the cluster for one message. A message without matches yields
    /// an empty cluster; only structurally broken records are skipped.
    pub fn extract(&self, message: &Message) -> std::result::Result<Cluster, SkipReason> {
        match (&self.mode, &self.pattern) {
            (ExtractMode::Structured(kind), _) => extract_structured(message, *kind),
            (ExtractMode::Text { .. }, Some(pattern)) => Ok(extract_text(pattern, &message.text)),
            (ExtractMode::Text { .. }, None) => Ok(Cluster::new()),
        }
    }
}

fn extract_text(pattern: &Regex, text: &str) -> Cluster {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| EntityId::new(m.as_str()))
        .collect()
}

fn extract_structured(
    message: &Message,
    kind: EntityKind,
) -> std::result::Result<Cluster, SkipReason> {
    let field = kind.name_field();
    let mut cluster = Cluster::new();
    for entity in message.entity_list(kind)? {
        match entity.get(field) {
            Some(Value::String(name)) if name.is_empty() => {}
            Some(Value::String(name)) => {
                cluster.insert(EntityId::new(name));
            }
            _ => return Err(SkipReason::MalformedEntity { kind, field }),
        }
    }
    Ok(cluster)
}

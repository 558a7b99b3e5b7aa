//! Discord webhook message types.
//!
//! Length caps are applied when a value is constructed, so a serialized
//! message always satisfies Discord's embed limits.

use serde::{Deserialize, Serialize};

/// Maximum number of characters in an embed title.
pub const EMBED_TITLE_LIMIT: usize = 256;

/// Maximum number of characters in an embed field value.
pub const FIELD_VALUE_LIMIT: usize = 1024;

/// Body of a Discord incoming-webhook POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordMessage {
    /// Plain text line shown above the embed
    pub content: String,
    /// Rich embeds, always exactly one for merge-request notifications
    pub embeds: Vec<Embed>,
    /// Mention parsing policy
    pub allowed_mentions: AllowedMentions,
}

impl DiscordMessage {
    /// Wrap a single embed with empty content and mentions suppressed.
    pub fn with_embed(embed: Embed) -> Self {
        Self {
            content: String::new(),
            embeds: vec![embed],
            allowed_mentions: AllowedMentions::none(),
        }
    }
}

/// A single Discord embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub fields: Vec<EmbedField>,
}

impl Embed {
    /// Create an embed, truncating the title to [`EMBED_TITLE_LIMIT`].
    pub fn new(title: &str) -> Self {
        Self {
            title: truncate_chars(title, EMBED_TITLE_LIMIT),
            url: None,
            fields: Vec::new(),
        }
    }

    /// Attach a link; empty links are dropped.
    pub fn url(mut self, url: &str) -> Self {
        self.url = (!url.is_empty()).then(|| url.to_string());
        self
    }

    pub fn field(mut self, field: EmbedField) -> Self {
        self.fields.push(field);
        self
    }
}

/// A named embed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    /// Inline fields share a row; block fields take the full width
    pub inline: bool,
}

impl EmbedField {
    pub fn inline(name: &str, value: &str) -> Self {
        Self::new(name, value, true)
    }

    pub fn block(name: &str, value: &str) -> Self {
        Self::new(name, value, false)
    }

    fn new(name: &str, value: &str, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value: truncate_chars(value, FIELD_VALUE_LIMIT),
            inline,
        }
    }
}

/// Discord `allowed_mentions` object.
///
/// An empty `parse` list stops `@everyone`, `@here` and role or user
/// mentions in forwarded text from pinging anyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedMentions {
    pub parse: Vec<String>,
}

impl AllowedMentions {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Keep at most `max` characters, never splitting a UTF-8 sequence.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

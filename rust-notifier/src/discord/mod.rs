//! Discord incoming-webhook support.
//!
//! This module provides:
//! - The outbound message types (a single embed per message)
//! - An async client that delivers a message with one bounded POST

pub mod client;
pub mod types;

pub use client::{DiscordClient, ForwardError};
pub use types::{
    AllowedMentions, DiscordMessage, Embed, EmbedField, EMBED_TITLE_LIMIT, FIELD_VALUE_LIMIT,
};

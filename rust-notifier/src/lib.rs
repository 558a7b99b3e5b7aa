//! MR Notifier - GitLab merge-request notifications for Discord.
//!
//! A single web service receives GitLab merge-request webhooks, renders
//! them as a Discord embed and posts the embed to a Discord incoming webhook.
//!
//! ## Architecture
//!
//! ```text
//! GitLab → web (auth, parse) → gitlab (map) → discord (forward) → Discord
//! ```

pub mod config;
pub mod discord;
pub mod gitlab;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use discord::{DiscordClient, DiscordMessage, ForwardError};
pub use gitlab::build_discord_message;
pub use web::{router, AppState};

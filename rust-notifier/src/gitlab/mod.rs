//! GitLab webhook payload handling.
//!
//! GitLab's webhook schema differs between versions and omits fields freely,
//! so payloads are kept as untyped JSON and read through [`lookup`] helpers.
//!
//! ## Processing Flow
//!
//! ```text
//! serde_json::Value → build_discord_message() → Option<DiscordMessage>
//! ```

pub mod lookup;
pub mod merge_request;

pub use lookup::{lookup, lookup_str};
pub use merge_request::{build_discord_message, MERGE_REQUEST_KIND};

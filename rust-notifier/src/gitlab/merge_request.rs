//! Merge-request event to Discord embed mapping.
//!
//! Every read degrades to a placeholder when the field is missing, empty or
//! of an unexpected type, so a recognised event always yields a complete
//! message.

use serde_json::Value;
use tracing::debug;

use super::lookup::{lookup, lookup_str};
use crate::discord::{DiscordMessage, Embed, EmbedField};

/// `object_kind` value GitLab sends for merge-request hooks.
pub const MERGE_REQUEST_KIND: &str = "merge_request";

/// Merge statuses reported as conflicted. `unchecked` means GitLab has not
/// determined mergeability yet and is shown as conflicted as well.
const CONFLICT_STATUSES: &[&str] = &["cannot_be_merged", "unchecked"];

/// Placeholder for an empty people list.
const EMPTY_LIST: &str = "—";

/// Build the Discord message for a GitLab webhook payload.
///
/// Returns `None` for anything that is not a merge-request event.
pub fn build_discord_message(event: &Value) -> Option<DiscordMessage> {
    if lookup_str(event, &["object_kind"]) != Some(MERGE_REQUEST_KIND) {
        return None;
    }

    // Empty strings read as absent: "" becomes the placeholder, never a
    // passthrough, since Discord rejects empty field values.
    let attr = |key: &str| lookup_str(event, &["object_attributes", key]);

    let action = attr("action").unwrap_or("update");
    let action_key = action.to_lowercase();

    let project =
        lookup_str(event, &["project", "path_with_namespace"]).unwrap_or("unknown/project");
    let iid = display_iid(lookup(event, &["object_attributes", "iid"]));
    let link = attr("url").or_else(|| attr("web_url")).unwrap_or("");

    let title = format!(
        "{} [{}] {} !{}",
        action_icon(&action_key),
        action.to_uppercase(),
        project,
        iid
    );

    let branch = format!(
        "`{}` → `{}`",
        attr("source_branch").unwrap_or("?"),
        attr("target_branch").unwrap_or("?")
    );
    let state = format!("`{}`", attr("state").unwrap_or("unknown"));
    let conflicts = if attr("merge_status").is_some_and(|s| CONFLICT_STATUSES.contains(&s)) {
        "❌ Yes"
    } else {
        "✅ No"
    };

    debug!(
        action = %action_key,
        project = %project,
        iid = %iid,
        has_link = !link.is_empty(),
        "merge_request_mapped"
    );

    let embed = Embed::new(&title)
        .url(link)
        .field(EmbedField::block("Title", attr("title").unwrap_or("(no title)")))
        .field(EmbedField::inline("Branch", &branch))
        .field(EmbedField::inline("State", &state))
        .field(EmbedField::inline(
            "Created",
            attr("created_at").unwrap_or("Unknown"),
        ))
        .field(EmbedField::inline("Conflicts", conflicts))
        .field(EmbedField::inline("Author", &display_author(event)))
        .field(EmbedField::block(
            "Assignees",
            &display_people(event.get("assignees")),
        ))
        .field(EmbedField::block(
            "Reviewers",
            &display_people(event.get("reviewers")),
        ));

    Some(DiscordMessage::with_embed(embed))
}

/// Decorative icon for a lower-cased action name.
fn action_icon(action: &str) -> &'static str {
    match action {
        "open" => "🆕",
        "merge" => "✅",
        "close" => "🛑",
        "reopen" => "♻️",
        "approved" => "👍",
        _ => "🔔",
    }
}

/// Render the merge-request IID, which GitLab sends as a number.
fn display_iid(iid: Option<&Value>) -> String {
    match iid {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => "?".to_string(),
    }
}

fn display_author(event: &Value) -> String {
    if let Some(username) = lookup_str(event, &["user", "username"]) {
        return format!("@{username}");
    }
    lookup_str(event, &["user", "name"])
        .unwrap_or("Unknown")
        .to_string()
}

/// Render an assignee or reviewer entry.
fn display_person(entry: &Value) -> String {
    if let Some(username) = lookup_str(entry, &["username"]) {
        return format!("@{username}");
    }
    lookup_str(entry, &["name"]).unwrap_or("unknown").to_string()
}

fn display_people(list: Option<&Value>) -> String {
    let people = match list.and_then(Value::as_array) {
        Some(entries) => entries.iter().map(display_person).collect::<Vec<_>>(),
        None => Vec::new(),
    };

    if people.is_empty() {
        EMPTY_LIST.to_string()
    } else {
        people.join(", ")
    }
}

use serde::{Deserialize, Deserializer, Serialize};

/// Default notes reference read by every command.
pub const DEFAULT_NOTES_REF: &str = "refs/notes/commits";

/// One commit as listed by the commit lister, with its note text if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCommit {
    pub sha: String,
    /// Author date, ISO 8601 (`git log --format=%aI`).
    pub date: String,
    pub author: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RawCommit {
    /// Day key (`YYYY-MM-DD`): the part of the author date before `T`.
    pub fn day(&self) -> &str {
        day_of(&self.date)
    }

    pub fn short_sha(&self) -> &str {
        short_sha(&self.sha)
    }
}

/// A commit in a pull-request range that carries a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitNote {
    pub sha: String,
    pub note: String,
}

/// Canonical authorship record summed over every prompt of a note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedNote {
    pub files: Vec<String>,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub accepted_lines: u64,
    pub overridden_lines: u64,
    pub model: Option<String>,
    pub tool: Option<String>,
    /// Note-embedded human author, distinct from the git author.
    pub author: Option<String>,
}

/// Agent identity recorded for a prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentId {
    #[serde(default, deserialize_with = "lenient_string")]
    pub tool: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    User,
    Assistant,
    ToolUse,
    #[default]
    #[serde(other)]
    Other,
}

/// One transcript entry of a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, rename = "type")]
    pub kind: MessageKind,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// One recorded AI interaction inside a note's `prompts` object.
///
/// Counts that are absent, null or non-numeric read as 0. An `agent_id`
/// that is not an object reads as absent, and transcript entries that are
/// not message objects are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    #[serde(default, deserialize_with = "lenient_object")]
    pub agent_id: Option<AgentId>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub human_author: Option<String>,
    #[serde(default, deserialize_with = "lenient_messages")]
    pub messages: Option<Vec<Message>>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_additions: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_deletions: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub accepted_lines: u64,
    /// Spelled `overriden_lines` on the wire.
    #[serde(
        default,
        rename = "overriden_lines",
        deserialize_with = "lenient_count"
    )]
    pub overridden_lines: u64,
}

impl PromptRecord {
    /// Model id, if present and non-empty.
    pub fn model(&self) -> Option<&str> {
        self.agent_id
            .as_ref()
            .and_then(|a| a.model.as_deref())
            .filter(|m| !m.is_empty())
    }

    /// Tool id, if present and non-empty.
    pub fn tool(&self) -> Option<&str> {
        self.agent_id
            .as_ref()
            .and_then(|a| a.tool.as_deref())
            .filter(|t| !t.is_empty())
    }

    pub fn human_author(&self) -> Option<&str> {
        self.human_author.as_deref().filter(|a| !a.is_empty())
    }

    pub fn messages(&self) -> &[Message] {
        self.messages.as_deref().unwrap_or_default()
    }
}

// ── Helpers ──

/// `part / whole * 100`, or 0 when `whole` is not positive. Never clamped.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// First seven characters of a commit hash.
pub fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

/// Day component of an ISO 8601 timestamp.
pub fn day_of(date: &str) -> &str {
    date.split('T').next().unwrap_or(date)
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        // Fractions round half up; negatives read as 0.
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| (f + 0.5).floor() as u64))
            .unwrap_or(0),
        _ => 0,
    })
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

fn lenient_messages<'de, D>(deserializer: D) -> Result<Option<Vec<Message>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_zero_is_zero() {
        assert_eq!(percent(5.0, 0.0), 0.0);
        assert_eq!(percent(0.0, 0.0), 0.0);
        assert_eq!(percent(80.0, 100.0), 80.0);
    }

    #[test]
    fn percent_is_not_clamped() {
        assert_eq!(percent(150.0, 100.0), 150.0);
    }

    #[test]
    fn short_sha_handles_short_input() {
        assert_eq!(short_sha("abcdef0123456789"), "abcdef0");
        assert_eq!(short_sha("abc"), "abc");
    }

    #[test]
    fn day_of_truncates_at_t() {
        assert_eq!(day_of("2024-03-05T10:11:12+02:00"), "2024-03-05");
        assert_eq!(day_of("2024-03-05"), "2024-03-05");
    }

    #[test]
    fn prompt_counts_tolerate_garbage() {
        let json = r#"{
            "total_additions": "12",
            "total_deletions": null,
            "accepted_lines": 7,
            "overriden_lines": 2.0,
            "agent_id": {"tool": "cursor", "model": 42},
            "human_author": ""
        }"#;
        let p: PromptRecord = serde_json::from_str(json).unwrap();
        assert_eq!(p.total_additions, 0);
        assert_eq!(p.total_deletions, 0);
        assert_eq!(p.accepted_lines, 7);
        assert_eq!(p.overridden_lines, 2);
        assert_eq!(p.tool(), Some("cursor"));
        assert_eq!(p.model(), None);
        assert_eq!(p.human_author(), None);
    }

    #[test]
    fn message_kinds_deserialize() {
        let json = r#"[
            {"type":"user","text":"hi","timestamp":"2024-01-01T00:00:00Z"},
            {"type":"tool_use","name":"Edit"},
            {"type":"thinking"}
        ]"#;
        let msgs: Vec<Message> = serde_json::from_str(json).unwrap();
        assert_eq!(msgs[0].kind, MessageKind::User);
        assert_eq!(msgs[1].kind, MessageKind::ToolUse);
        assert_eq!(msgs[1].name.as_deref(), Some("Edit"));
        assert_eq!(msgs[2].kind, MessageKind::Other);
    }

    #[test]
    fn fractional_counts_round_half_up() {
        let p: PromptRecord = serde_json::from_str(
            r#"{"total_additions": 2.5, "total_deletions": 2.4, "accepted_lines": -3}"#,
        )
        .unwrap();
        assert_eq!(p.total_additions, 3);
        assert_eq!(p.total_deletions, 2);
        assert_eq!(p.accepted_lines, 0);
    }

    #[test]
    fn odd_shapes_read_as_absent() {
        let p: PromptRecord = serde_json::from_str(
            r#"{"agent_id": "cursor", "messages": "none", "total_additions": 4}"#,
        )
        .unwrap();
        assert!(p.agent_id.is_none());
        assert!(p.messages().is_empty());
        assert_eq!(p.total_additions, 4);
    }

    #[test]
    fn bad_messages_are_skipped_one_by_one() {
        let p: PromptRecord = serde_json::from_str(
            r#"{"messages": [{"text": "hi"}, 7, {"type": 5}, {"type": "user", "text": "ok"}]}"#,
        )
        .unwrap();
        let msgs = p.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].kind, MessageKind::Other);
        assert_eq!(msgs[0].text.as_deref(), Some("hi"));
        assert_eq!(msgs[1].kind, MessageKind::User);
    }
}

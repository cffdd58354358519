//! AI authorship note parsing.
//!
//! A note is a free-form text blob: an attestation section listing touched
//! files, a `---` divider, then a JSON object whose `prompts` member maps
//! prompt ids to [`PromptRecord`]s.
//!
//! ```text
//! src/a.ts
//!   1f2e3d4 1-10,14
//! ---
//! {"prompts":{"1f2e3d4":{"total_additions":11,"accepted_lines":9}}}
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{ParsedNote, PromptRecord};

/// Lines made only of lowercase hex digits, whitespace and dashes: content
/// hashes, attestation entries and separators rather than file paths.
static HASH_OR_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9\s\-]+$").unwrap());

/// A note's file list plus its prompts in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePayload {
    pub files: Vec<String>,
    pub prompts: Vec<(String, PromptRecord)>,
}

impl NotePayload {
    /// Sum the counts of every prompt. Model, tool and author come from the
    /// first prompt that carries a non-empty value; later prompts never
    /// overwrite them.
    pub fn summarize(&self) -> ParsedNote {
        let mut parsed = ParsedNote {
            files: self.files.clone(),
            ..ParsedNote::default()
        };
        for (_, prompt) in &self.prompts {
            parsed.total_additions += prompt.total_additions;
            parsed.total_deletions += prompt.total_deletions;
            parsed.accepted_lines += prompt.accepted_lines;
            parsed.overridden_lines += prompt.overridden_lines;

            if parsed.model.is_none() {
                parsed.model = prompt.model().map(str::to_string);
            }
            if parsed.tool.is_none() {
                parsed.tool = prompt.tool().map(str::to_string);
            }
            if parsed.author.is_none() {
                parsed.author = prompt.human_author().map(str::to_string);
            }
        }
        parsed
    }

    pub fn prompt(&self, id: &str) -> Option<&PromptRecord> {
        self.prompts.iter().find(|(pid, _)| pid == id).map(|(_, p)| p)
    }
}

/// Parse a note into its canonical authorship record.
///
/// Returns `None` when the note carries no JSON object, the object has no
/// `prompts` member, or the JSON does not parse. Oddly shaped prompt fields
/// never discard the note.
pub fn parse_note(text: &str) -> Option<ParsedNote> {
    parse_payload(text).map(|p| p.summarize())
}

/// Parse a note keeping every prompt, in the order they appear in the JSON.
pub fn parse_payload(text: &str) -> Option<NotePayload> {
    let files = scan_file_paths(text);
    let json = json_span(text)?;
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    let serde_json::Value::Object(prompts) = value.get("prompts")? else {
        return None;
    };

    let mut records = Vec::with_capacity(prompts.len());
    for (id, raw) in prompts {
        let record: PromptRecord = serde_json::from_value(raw.clone()).unwrap_or_default();
        records.push((id.clone(), record));
    }
    Some(NotePayload {
        files,
        prompts: records,
    })
}

/// Collect file paths from the attestation section.
///
/// Scanning stops at the first `---` line or the first line starting with
/// `{`. Empty lines and lines that look like hashes or separators are
/// skipped; of every other line only the first whitespace-delimited token is
/// kept.
pub fn scan_file_paths(text: &str) -> Vec<String> {
    let mut files = Vec::new();
    for line in text.split('\n') {
        let line = line.trim();
        if line == "---" || line.starts_with('{') {
            break;
        }
        if line.is_empty() || HASH_OR_SEPARATOR.is_match(line) {
            continue;
        }
        if let Some(path) = line.split_whitespace().next() {
            files.push(path.to_string());
        }
    }
    files
}

/// The substring from the first `{` to the last `}`.
fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

// ── Attestations ──

/// A line or an inclusive range of lines in an attestation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRange {
    Single(u32),
    Range(u32, u32),
}

impl LineRange {
    pub fn start(&self) -> u32 {
        match self {
            LineRange::Single(line) => *line,
            LineRange::Range(start, _) => *start,
        }
    }
}

impl std::fmt::Display for LineRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineRange::Single(line) => write!(f, "{line}"),
            LineRange::Range(start, end) => write!(f, "{start}-{end}"),
        }
    }
}

/// Lines of one file attributed to one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationEntry {
    pub prompt_id: String,
    pub ranges: Vec<LineRange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttestation {
    pub path: String,
    pub entries: Vec<AttestationEntry>,
}

/// Parse the attestation section: an unindented file path followed by
/// indented `<prompt id> <ranges>` lines. Entries whose ranges do not parse
/// are dropped. Stops at the divider.
pub fn parse_attestations(text: &str) -> Vec<FileAttestation> {
    let mut out: Vec<FileAttestation> = Vec::new();
    for raw in text.lines() {
        let line = raw.trim_end();
        if line.trim() == "---" || line.trim_start().starts_with('{') {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            let Some(current) = out.last_mut() else {
                continue;
            };
            let mut parts = line.trim().splitn(2, char::is_whitespace);
            let (Some(id), Some(ranges)) = (parts.next(), parts.next()) else {
                continue;
            };
            if let Some(ranges) = parse_line_ranges(ranges.trim()) {
                current.entries.push(AttestationEntry {
                    prompt_id: id.to_string(),
                    ranges,
                });
            }
        } else {
            out.push(FileAttestation {
                path: unquote(line.trim()).to_string(),
                entries: Vec::new(),
            });
        }
    }
    out
}

fn unquote(path: &str) -> &str {
    path.strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(path)
}

/// Parse `1,4-9,12` into ranges. `None` if any part is malformed.
pub fn parse_line_ranges(input: &str) -> Option<Vec<LineRange>> {
    let mut ranges = Vec::new();
    for part in input.split(',').filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                ranges.push(LineRange::Range(start.parse().ok()?, end.parse().ok()?))
            }
            None => ranges.push(LineRange::Single(part.parse().ok()?)),
        }
    }
    (!ranges.is_empty()).then_some(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE: &str = "src/a.ts\n---\n{\"prompts\":{\"p1\":{\"total_additions\":100,\"accepted_lines\":80,\"agent_id\":{\"model\":\"m1\",\"tool\":\"t1\"},\"human_author\":\"alice\"}}}";

    #[test]
    fn parse_single_prompt_note() {
        let parsed = parse_note(SINGLE).unwrap();
        assert_eq!(parsed.files, vec!["src/a.ts"]);
        assert_eq!(parsed.total_additions, 100);
        assert_eq!(parsed.accepted_lines, 80);
        assert_eq!(parsed.model.as_deref(), Some("m1"));
        assert_eq!(parsed.tool.as_deref(), Some("t1"));
        assert_eq!(parsed.author.as_deref(), Some("alice"));
    }

    #[test]
    fn sums_counts_across_prompts() {
        let note = r#"{"prompts":{
            "a":{"total_additions":10,"total_deletions":1,"accepted_lines":5,"overriden_lines":2},
            "b":{"total_additions":20,"total_deletions":3,"accepted_lines":15,"overriden_lines":1}
        }}"#;
        let parsed = parse_note(note).unwrap();
        assert_eq!(parsed.total_additions, 30);
        assert_eq!(parsed.total_deletions, 4);
        assert_eq!(parsed.accepted_lines, 20);
        assert_eq!(parsed.overridden_lines, 3);
        assert!(parsed.files.is_empty());
    }

    #[test]
    fn first_model_wins_in_document_order() {
        let note = r#"{"prompts":{
            "zz":{"agent_id":{"model":"m1","tool":"t1"}},
            "aa":{"agent_id":{"model":"m2","tool":"t2"},"human_author":"bob"}
        }}"#;
        let parsed = parse_note(note).unwrap();
        assert_eq!(parsed.model.as_deref(), Some("m1"));
        assert_eq!(parsed.tool.as_deref(), Some("t1"));
        assert_eq!(parsed.author.as_deref(), Some("bob"));
    }

    #[test]
    fn first_model_wins_counter_ordering() {
        let note = r#"{"prompts":{
            "aa":{"agent_id":{"tool":"t1"}},
            "zz":{"agent_id":{"model":"m2"}},
            "mm":{"agent_id":{"model":"m3"}}
        }}"#;
        let parsed = parse_note(note).unwrap();
        assert_eq!(parsed.model.as_deref(), Some("m2"));
        assert_eq!(parsed.tool.as_deref(), Some("t1"));
    }

    #[test]
    fn empty_model_string_is_not_taken() {
        let note = r#"{"prompts":{
            "a":{"agent_id":{"model":""}},
            "b":{"agent_id":{"model":"m2"}}
        }}"#;
        assert_eq!(parse_note(note).unwrap().model.as_deref(), Some("m2"));
    }

    #[test]
    fn plain_text_note_is_not_authorship() {
        assert!(parse_note("just a human comment").is_none());
        assert!(parse_note("").is_none());
    }

    #[test]
    fn json_without_prompts_is_not_authorship() {
        assert!(parse_note(r#"{"schema_version":"3"}"#).is_none());
        assert!(parse_note(r#"{"prompts":null}"#).is_none());
    }

    #[test]
    fn malformed_json_yields_none() {
        assert!(parse_note("src/a.rs\n---\n{\"prompts\": {").is_none());
        assert!(parse_note("} backwards {").is_none());
    }

    #[test]
    fn message_without_type_keeps_note() {
        let note = r#"{"prompts":{"a":{"total_additions":5,"accepted_lines":3,"messages":[{"text":"hi"}]}}}"#;
        let parsed = parse_note(note).unwrap();
        assert_eq!(parsed.total_additions, 5);
        assert_eq!(parsed.accepted_lines, 3);
    }

    #[test]
    fn string_agent_id_keeps_counts() {
        let note = r#"{"prompts":{
            "a":{"agent_id":"cursor","total_additions":8},
            "b":{"agent_id":{"model":"m2"},"total_additions":2}
        }}"#;
        let parsed = parse_note(note).unwrap();
        assert_eq!(parsed.total_additions, 10);
        assert_eq!(parsed.model.as_deref(), Some("m2"));
        assert!(parsed.tool.is_none());
    }

    #[test]
    fn non_array_messages_keep_note() {
        let note = r#"{"prompts":{"a":{"messages":"none","accepted_lines":4}}}"#;
        let payload = parse_payload(note).unwrap();
        assert!(payload.prompts[0].1.messages().is_empty());
        assert_eq!(payload.summarize().accepted_lines, 4);
    }

    #[test]
    fn non_object_prompt_counts_as_empty() {
        let note = r#"{"prompts":{"a":42,"b":{"total_additions":6}}}"#;
        let parsed = parse_note(note).unwrap();
        assert_eq!(parsed.total_additions, 6);
    }

    #[test]
    fn empty_prompts_object_yields_zeroed_record() {
        let parsed = parse_note("a.rs\n{\"prompts\":{}}").unwrap();
        assert_eq!(parsed.files, vec!["a.rs"]);
        assert_eq!(parsed.total_additions, 0);
        assert!(parsed.model.is_none());
    }

    #[test]
    fn scan_skips_hashes_and_attestation_entries() {
        let note = "src/main.rs\n  1a2b3c4 1-10\n0123456789abcdef\n\n\"docs/x y.md\" 3\n---\nnot/a/file.rs\n{}";
        let files = scan_file_paths(note);
        assert_eq!(files, vec!["src/main.rs", "\"docs/x"]);
    }

    #[test]
    fn scan_stops_at_brace_line() {
        let files = scan_file_paths("a.rs\n{\"prompts\":{}}\nb.rs");
        assert_eq!(files, vec!["a.rs"]);
    }

    #[test]
    fn hex_looking_file_name_is_skipped() {
        // Known ambiguity of the heuristic: an all-hex name reads as a hash.
        assert!(scan_file_paths("deadbeef\nc0ffee.rs").contains(&"c0ffee.rs".to_string()));
        assert!(!scan_file_paths("deadbeef\nc0ffee.rs").contains(&"deadbeef".to_string()));
    }

    #[test]
    fn payload_keeps_prompt_order() {
        let payload = parse_payload(r#"{"prompts":{"z":{},"a":{},"m":{}}}"#).unwrap();
        let ids: Vec<&str> = payload.prompts.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
        assert!(payload.prompt("a").is_some());
        assert!(payload.prompt("q").is_none());
    }

    #[test]
    fn attestations_parse_files_and_ranges() {
        let note = "src/a.rs\n  p1 1-10,14\n  p2 20\n\"docs/read me.md\"\n  p1 3\n---\n{}";
        let att = parse_attestations(note);
        assert_eq!(att.len(), 2);
        assert_eq!(att[0].path, "src/a.rs");
        assert_eq!(
            att[0].entries[0].ranges,
            vec![LineRange::Range(1, 10), LineRange::Single(14)]
        );
        assert_eq!(att[0].entries[1].prompt_id, "p2");
        assert_eq!(att[1].path, "docs/read me.md");
        assert_eq!(att[1].entries[0].ranges[0].start(), 3);
    }

    #[test]
    fn malformed_ranges_are_dropped() {
        let att = parse_attestations("a.rs\n  p1 x-3\n  p2 4\n");
        assert_eq!(att[0].entries.len(), 1);
        assert_eq!(att[0].entries[0].prompt_id, "p2");
        assert_eq!(parse_line_ranges(""), None);
        assert_eq!(LineRange::Range(4, 9).to_string(), "4-9");
    }
}

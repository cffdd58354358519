pub mod metrics;
pub mod note;
pub mod types;

pub use metrics::{resolve_metrics, DiffStat, DiffStatSource, MetricSource, NoDiffStats, ResolvedMetrics};
pub use note::{
    parse_attestations, parse_note, parse_payload, scan_file_paths, AttestationEntry,
    FileAttestation, LineRange, NotePayload,
};
pub use types::*;

//! Transcript port
//!
//! The transcript is an append-only record of every rendered template block
//! and every generated reply, one record per ingest/generate boundary.

use std::io;

/// Port for persisting transcript records
///
/// Each call appends one record. Implementations add the record terminator.
pub trait TranscriptWriter: Send + Sync {
    fn append(&self, record: &str) -> io::Result<()>;
}

/// Transcript writer used when no transcript path is configured.
pub struct NoTranscript;

impl TranscriptWriter for NoTranscript {
    fn append(&self, _record: &str) -> io::Result<()> {
        Ok(())
    }
}

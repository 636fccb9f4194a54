//! Transcript file.
//!
//! An append-only sequence of raw records (rendered prompts and generated
//! replies), each followed by `\n`. Records are not otherwise framed, so a
//! record that itself contains newlines reads back as several lines.
//!
//! [`read_transcript`] tolerates what a crash in the middle of an append can
//! leave behind: a final record without its terminator, possibly ending in a
//! partial UTF-8 sequence.

use chatbot_application::ports::transcript::TranscriptWriter;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const RECORD_TERMINATOR: u8 = b'\n';

/// Append-only transcript writer backed by a file.
pub struct FileTranscript {
    file: Mutex<File>,
    path: PathBuf,
}

impl FileTranscript {
    /// Open `path` for appending, creating it owner-readable only if absent.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options.open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TranscriptWriter for FileTranscript {
    fn append(&self, record: &str) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("transcript lock poisoned"))?;
        let mut buf = Vec::with_capacity(record.len() + 1);
        buf.extend_from_slice(record.as_bytes());
        buf.push(RECORD_TERMINATOR);
        file.write_all(&buf)?;
        file.flush()
    }
}

/// Contents of a transcript file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptContents {
    /// Complete, terminated lines.
    pub lines: Vec<String>,
    /// Trailing text that was never terminated, if any.
    pub partial: Option<String>,
}

/// Read a transcript file back as lines.
pub fn read_transcript(path: impl AsRef<Path>) -> io::Result<TranscriptContents> {
    let bytes = std::fs::read(path)?;
    Ok(parse_transcript(&bytes))
}

fn parse_transcript(bytes: &[u8]) -> TranscriptContents {
    let (lines, tail) = match bytes.iter().rposition(|b| *b == RECORD_TERMINATOR) {
        Some(end) => (
            bytes[..end]
                .split(|b| *b == RECORD_TERMINATOR)
                .map(|line| String::from_utf8_lossy(line).into_owned())
                .collect(),
            &bytes[end + 1..],
        ),
        None => (Vec::new(), bytes),
    };

    let partial = (!tail.is_empty()).then(|| decode_truncated(tail));
    TranscriptContents { lines, partial }
}

/// Decode text that may end inside a multi-byte character.
fn decode_truncated(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) if e.error_len().is_none() => {
            String::from_utf8_lossy(&bytes[..e.valid_up_to()]).into_owned()
        }
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_are_newline_terminated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.txt");
        let transcript = FileTranscript::open(&path).unwrap();
        transcript.append("User: hi\n\nAssistant:").unwrap();
        transcript.append("Hello!").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "User: hi\n\nAssistant:\nHello!\n"
        );
        let contents = read_transcript(&path).unwrap();
        assert_eq!(contents.lines, vec!["User: hi", "", "Assistant:", "Hello!"]);
        assert_eq!(contents.partial, None);
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.txt");
        FileTranscript::open(&path).unwrap().append("one").unwrap();
        FileTranscript::open(&path).unwrap().append("two").unwrap();
        assert_eq!(read_transcript(&path).unwrap().lines, vec!["one", "two"]);
    }

    #[test]
    fn test_reader_tolerates_truncated_record() {
        let contents = parse_transcript(b"first\nsecond rec");
        assert_eq!(contents.lines, vec!["first"]);
        assert_eq!(contents.partial.as_deref(), Some("second rec"));
    }

    #[test]
    fn test_reader_tolerates_split_utf8() {
        // "答" is e7 ad 94; the write stopped after two of its bytes.
        let contents = parse_transcript(b"ok\n\xe7\xad");
        assert_eq!(contents.lines, vec!["ok"]);
        assert_eq!(contents.partial.as_deref(), Some(""));

        let contents = parse_transcript("ok\nab答".as_bytes());
        assert_eq!(contents.partial.as_deref(), Some("ab答"));
    }

    #[test]
    fn test_reader_edge_cases() {
        assert_eq!(parse_transcript(b""), TranscriptContents::default());
        assert_eq!(
            parse_transcript(b"only partial"),
            TranscriptContents {
                lines: Vec::new(),
                partial: Some("only partial".into()),
            }
        );
        assert_eq!(parse_transcript(b"\n").lines, vec![""]);
    }
}

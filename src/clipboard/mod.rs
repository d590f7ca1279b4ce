use std::io::{self, Write};
use std::process::{Command, Stdio};

use thiserror::Error;

const WL_COPY_COMMAND: &str = "wl-copy";

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("failed to run wl-copy command: {command}")]
    CommandIo {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write clipboard payload to wl-copy")]
    WritePayload {
        #[source]
        source: io::Error,
    },
    #[error("wl-copy stdin unavailable")]
    StdinUnavailable,
    #[error("wl-copy exited with non-zero status: {status}")]
    CommandFailed { status: String },
}

pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;

pub trait ClipboardBackend {
    fn copy_text(&self, text: &str) -> ClipboardResult<()>;
}

#[derive(Debug, Default)]
pub struct WlCopyBackend;

impl ClipboardBackend for WlCopyBackend {
    fn copy_text(&self, text: &str) -> ClipboardResult<()> {
        let mut child = Command::new(WL_COPY_COMMAND)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|err| ClipboardError::CommandIo {
                command: WL_COPY_COMMAND.to_string(),
                source: err,
            })?;

        {
            let stdin = child.stdin.as_mut().ok_or(ClipboardError::StdinUnavailable)?;
            stdin
                .write_all(text.as_bytes())
                .map_err(|source| ClipboardError::WritePayload { source })?;
        }

        let status = child.wait().map_err(|err| ClipboardError::CommandIo {
            command: WL_COPY_COMMAND.to_string(),
            source: err,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::CommandFailed {
                status: status.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingBackend {
        copied: RefCell<Vec<String>>,
    }

    impl ClipboardBackend for RecordingBackend {
        fn copy_text(&self, text: &str) -> ClipboardResult<()> {
            self.copied.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    struct FailingBackend;

    impl ClipboardBackend for FailingBackend {
        fn copy_text(&self, _text: &str) -> ClipboardResult<()> {
            Err(ClipboardError::CommandFailed {
                status: "exit status 1".to_string(),
            })
        }
    }

    #[test]
    fn copy_text_success_with_backend() {
        let backend = RecordingBackend {
            copied: RefCell::new(Vec::new()),
        };
        backend.copy_text(":root { --a: 1; }").unwrap();
        let copied = backend.copied.borrow();
        assert_eq!(copied.len(), 1);
        assert_eq!(copied[0], ":root { --a: 1; }");
    }

    #[test]
    fn command_error_contains_command_name() {
        let err = FailingBackend.copy_text("x").unwrap_err();
        assert!(format!("{err}").contains("wl-copy"));
    }
}

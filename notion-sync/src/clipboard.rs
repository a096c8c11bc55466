//! System clipboard access through the platform's copy command.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use notion_sync_core::contract::{BoxError, Clipboard};

/// Tried in order; the first one that exists is used.
const COPY_COMMANDS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("clip", &[]),
];

/// Pipes text into `pbcopy`, `wl-copy`, `xclip` or `clip`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), BoxError> {
        for (program, args) in COPY_COMMANDS {
            let mut child = match Command::new(program)
                .args(*args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(child) => child,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(text.as_bytes()).await?;
            }
            let status = child.wait().await?;
            if status.success() {
                tracing::debug!(program, "Copied link to clipboard");
                return Ok(());
            }
            return Err(format!("{program} exited with {status}").into());
        }
        Err("no clipboard command found (tried pbcopy, wl-copy, xclip, clip)".into())
    }
}

/// Clipboard that accepts and discards everything (`--no-clipboard`).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

#[async_trait]
impl Clipboard for NoClipboard {
    async fn write_text(&self, _text: &str) -> Result<(), BoxError> {
        Ok(())
    }
}

//! crates/promptt_client/src/clipboard.rs
//!
//! A `Clipboard` that pipes text into an external program (`pbcopy`, `xclip`, ...).

use async_trait::async_trait;
use promptt_core::ports::{Clipboard, PortError, PortResult};
use std::process::Stdio;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    /// Splits a command line on whitespace. Quoting is not supported.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait]
impl Clipboard for CommandClipboard {
    async fn write_text(&self, text: &str) -> PortResult<()> {
        debug!("Piping {} bytes into {}", text.len(), self.program);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PortError::Unexpected(format!("cannot run {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            // Dropping stdin closes the pipe so the program can finish.
        }

        let status = child
            .wait()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if !status.success() {
            return Err(PortError::Unexpected(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}

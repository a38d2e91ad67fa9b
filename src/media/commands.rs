use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SubburnError};

/// Upper bound on captured diagnostic bytes per stream. Long encodes can be
/// extremely verbose on stderr; only the tail is kept.
pub const MAX_CAPTURE_BYTES: usize = 64 * 1024;

/// Escape a caption file path for use inside an ffmpeg filter expression.
///
/// The filter graph parser treats backslash, colon and quote as control
/// characters, so a workspace path containing any of them would otherwise
/// corrupt the filter. Backslashes become forward slashes (valid on all
/// supported platforms), colons are escaped, and single quotes are closed,
/// escaped and reopened.
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace('\'', "'\\''")
        .replace(':', "\\:")
}

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
    expected_output: Option<PathBuf>,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
            expected_output: None,
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file; the command only succeeds if a non-empty file exists
    /// there after the tool exits
    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.expected_output = Some(path.as_ref().to_path_buf());
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Select only audio streams
    pub fn map_audio(self) -> Self {
        self.arg("-map").arg("a")
    }

    /// Set variable audio quality (0 = highest)
    pub fn audio_quality(self, quality: u32) -> Self {
        self.arg("-q:a").arg(quality.to_string())
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// Execute the command, returning captured stdout.
    ///
    /// Fails on missing binary, non-zero exit, expired timeout, or a missing
    /// or empty expected output file. Diagnostics carry the stderr tail.
    pub async fn execute(&self, timeout: Duration) -> Result<String> {
        debug!(
            "Executing media command: {} {:?}",
            self.binary_path, self.args
        );

        let mut child = Command::new(&self.binary_path)
            .args(&self.args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SubburnError::Tool(format!(
                    "{}: failed to start {}: {}",
                    self.description, self.binary_path, e
                ))
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let waited = tokio::time::timeout(timeout, async {
            let (out_tail, err_tail) = tokio::join!(read_tail(stdout), read_tail(stderr));
            let status = child.wait().await;
            (out_tail, err_tail, status)
        })
        .await;

        let (out_tail, err_tail, status) = match waited {
            Ok(result) => result,
            Err(_) => {
                let _ = child.kill().await;
                return Err(SubburnError::Tool(format!(
                    "{} timed out after {}s",
                    self.description,
                    timeout.as_secs()
                )));
            }
        };

        let status = status.map_err(|e| {
            SubburnError::Tool(format!("{}: failed to wait for tool: {}", self.description, e))
        })?;

        if !status.success() {
            return Err(SubburnError::Tool(format!(
                "{} failed ({}): {}",
                self.description,
                status,
                String::from_utf8_lossy(&err_tail).trim()
            )));
        }

        if let Some(expected) = &self.expected_output {
            let size = tokio::fs::metadata(expected)
                .await
                .map(|m| m.len())
                .unwrap_or(0);
            if size == 0 {
                return Err(SubburnError::Tool(format!(
                    "{} exited successfully but produced no output at {}",
                    self.description,
                    expected.display()
                )));
            }
        }

        Ok(String::from_utf8_lossy(&out_tail).into_owned())
    }
}

/// Read a child stream to EOF, keeping only the most recent
/// `MAX_CAPTURE_BYTES` bytes.
async fn read_tail<R: AsyncRead + Unpin>(reader: Option<R>) -> Vec<u8> {
    let mut tail = Vec::new();
    let Some(mut reader) = reader else {
        return tail;
    };

    let mut buf = [0u8; 8192];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                tail.extend_from_slice(&buf[..n]);
                if tail.len() > MAX_CAPTURE_BYTES {
                    let excess = tail.len() - MAX_CAPTURE_BYTES;
                    tail.drain(..excess);
                }
            }
        }
    }
    tail
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_escape_filter_path_plain() {
        let path = PathBuf::from("/tmp/job-1/captions.ass");
        assert_eq!(escape_filter_path(&path), "/tmp/job-1/captions.ass");
    }

    #[test]
    fn test_escape_filter_path_control_characters() {
        let path = PathBuf::from("C:\\temp\\o'clock.ass");
        assert_eq!(escape_filter_path(&path), "C\\:/temp/o'\\''clock.ass");
    }

    #[test]
    fn test_command_builder_collects_args() {
        let cmd = MediaCommand::new("ffmpeg", "Audio extraction")
            .overwrite()
            .input("in.mp4")
            .audio_quality(0)
            .map_audio()
            .output("out.mp3");

        assert_eq!(
            cmd.args,
            vec!["-y", "-i", "in.mp4", "-q:a", "0", "-map", "a", "out.mp3"]
        );
        assert_eq!(cmd.expected_output, Some(PathBuf::from("out.mp3")));
    }

    #[tokio::test]
    async fn test_execute_missing_binary_is_tool_error() {
        let cmd = MediaCommand::new("definitely-not-a-real-binary-4242", "Scale video");
        let err = cmd.execute(Duration::from_secs(5)).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Scale video"), "got: {}", message);
    }

    #[tokio::test]
    async fn test_execute_nonzero_exit_captures_stderr() {
        let cmd = MediaCommand::new("sh", "Burn captions")
            .arg("-c")
            .arg("echo 'filter parse failure' >&2; exit 1");
        let err = cmd.execute(Duration::from_secs(5)).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Burn captions"), "got: {}", message);
        assert!(message.contains("filter parse failure"), "got: {}", message);
    }

    #[tokio::test]
    async fn test_execute_missing_output_file_is_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let expected = dir.path().join("out.mp4");
        let cmd = MediaCommand::new("true", "Scale video").output(&expected);
        let err = cmd.execute(Duration::from_secs(5)).await.unwrap_err();
        assert!(err.to_string().contains("produced no output"));
    }

    #[tokio::test]
    async fn test_execute_success_with_nonempty_output() {
        let dir = tempfile::tempdir().unwrap();
        let expected = dir.path().join("out.mp4");
        let cmd = MediaCommand::new("sh", "Scale video")
            .arg("-c")
            .arg(format!("printf data > {}", expected.display()))
            .output(&expected);
        cmd.execute(Duration::from_secs(5)).await.unwrap();
    }

    #[tokio::test]
    async fn test_execute_timeout_kills_child() {
        let cmd = MediaCommand::new("sleep", "Scale video").arg("30");
        let err = cmd.execute(Duration::from_millis(200)).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}

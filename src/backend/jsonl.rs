use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context as _;

use crate::backend::{Backend, BackendCall, ChannelAllocator};
use crate::foundation::error::ViewerResult;
use crate::foundation::ids::ChannelId;
use crate::shapes::Shape;

/// Backend writing one JSON object per call, newline-delimited.
///
/// Each line is a serialized [`BackendCall`]; the log can be replayed into a real viewer.
#[derive(Debug)]
pub struct JsonLinesBackend<W: Write> {
    out: W,
    channels: ChannelAllocator,
    written: usize,
}

impl<W: Write> JsonLinesBackend<W> {
    /// Write calls to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            channels: ChannelAllocator::default(),
            written: 0,
        }
    }

    /// Number of calls written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered lines.
    pub fn flush(&mut self) -> ViewerResult<()> {
        self.out.flush().context("failed to flush backend log")?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> ViewerResult<W> {
        self.flush()?;
        Ok(self.out)
    }

    fn write_call(&mut self, call: &BackendCall) -> ViewerResult<()> {
        serde_json::to_writer(&mut self.out, call).context("failed to serialize backend call")?;
        self.out
            .write_all(b"\n")
            .context("failed to write backend log line")?;
        self.written += 1;
        tracing::trace!(channel = call.channel().0, "backend call written");
        Ok(())
    }
}

impl JsonLinesBackend<BufWriter<File>> {
    /// Create (or truncate) the log file at `path`, creating its parent directory.
    pub fn create(path: &Path) -> ViewerResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }
        let file = File::create(path)
            .with_context(|| format!("failed to create backend log '{}'", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Backend for JsonLinesBackend<W> {
    fn open_channel(
        &mut self,
        application_id: &str,
        recording_id: &str,
    ) -> ViewerResult<ChannelId> {
        let channel = self.channels.next();
        self.write_call(&BackendCall::OpenChannel {
            channel,
            application_id: application_id.to_string(),
            recording_id: recording_id.to_string(),
        })?;
        Ok(channel)
    }

    fn log_at(&mut self, channel: ChannelId, path: &str, shape: &Shape) -> ViewerResult<()> {
        self.write_call(&BackendCall::Log {
            channel,
            path: path.to_string(),
            shape: shape.clone(),
        })
    }

    fn log_file_at(
        &mut self,
        channel: ChannelId,
        file: &Path,
        path_prefix: &str,
    ) -> ViewerResult<()> {
        self.write_call(&BackendCall::LogFile {
            channel,
            file: file.to_path_buf(),
            path_prefix: path_prefix.to_string(),
        })
    }

    fn declare_visible_content(
        &mut self,
        channel: ChannelId,
        paths: &[String],
    ) -> ViewerResult<()> {
        self.write_call(&BackendCall::DeclareVisibleContent {
            channel,
            paths: paths.to_vec(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/jsonl.rs"]
mod tests;

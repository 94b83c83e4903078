//! Visualization backend contract and the recording implementations shipped with the crate.

mod jsonl;

use std::path::{Path, PathBuf};

use crate::foundation::error::ViewerResult;
use crate::foundation::ids::ChannelId;
use crate::shapes::Shape;

pub use jsonl::JsonLinesBackend;

/// Append-only logging surface of a 3-D viewer.
///
/// Ordering contract: calls on one channel are issued in the order the scene graph produced
/// them; `declare_visible_content` always replaces the previous declaration for that channel.
pub trait Backend {
    /// Open a recording channel for `recording_id` inside application `application_id`.
    fn open_channel(&mut self, application_id: &str, recording_id: &str) -> ViewerResult<ChannelId>;

    /// Log `shape` at the scene-relative `path` (`/a/b`).
    fn log_at(&mut self, channel: ChannelId, path: &str, shape: &Shape) -> ViewerResult<()>;

    /// Log a mesh file at `path_prefix`; the backend loads and decodes the file itself.
    fn log_file_at(
        &mut self,
        channel: ChannelId,
        file: &Path,
        path_prefix: &str,
    ) -> ViewerResult<()>;

    /// Replace the set of paths the channel's view displays.
    fn declare_visible_content(&mut self, channel: ChannelId, paths: &[String])
    -> ViewerResult<()>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn open_channel(
        &mut self,
        application_id: &str,
        recording_id: &str,
    ) -> ViewerResult<ChannelId> {
        (**self).open_channel(application_id, recording_id)
    }

    fn log_at(&mut self, channel: ChannelId, path: &str, shape: &Shape) -> ViewerResult<()> {
        (**self).log_at(channel, path, shape)
    }

    fn log_file_at(
        &mut self,
        channel: ChannelId,
        file: &Path,
        path_prefix: &str,
    ) -> ViewerResult<()> {
        (**self).log_file_at(channel, file, path_prefix)
    }

    fn declare_visible_content(
        &mut self,
        channel: ChannelId,
        paths: &[String],
    ) -> ViewerResult<()> {
        (**self).declare_visible_content(channel, paths)
    }
}

/// One backend call, as recorded by [`InMemoryBackend`] and written by [`JsonLinesBackend`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum BackendCall {
    /// [`Backend::open_channel`].
    OpenChannel {
        /// Allocated channel.
        channel: ChannelId,
        /// Application (window) name.
        application_id: String,
        /// Recording (scene) name.
        recording_id: String,
    },
    /// [`Backend::log_at`].
    Log {
        /// Target channel.
        channel: ChannelId,
        /// Scene-relative path.
        path: String,
        /// Logged payload.
        shape: Shape,
    },
    /// [`Backend::log_file_at`].
    LogFile {
        /// Target channel.
        channel: ChannelId,
        /// Mesh file.
        file: PathBuf,
        /// Scene-relative path prefix.
        path_prefix: String,
    },
    /// [`Backend::declare_visible_content`].
    DeclareVisibleContent {
        /// Target channel.
        channel: ChannelId,
        /// Full replacement content list.
        paths: Vec<String>,
    },
}

impl BackendCall {
    /// Channel the call addresses.
    pub fn channel(&self) -> ChannelId {
        match self {
            Self::OpenChannel { channel, .. }
            | Self::Log { channel, .. }
            | Self::LogFile { channel, .. }
            | Self::DeclareVisibleContent { channel, .. } => *channel,
        }
    }
}

/// Hands out channel ids in opening order, starting at 1.
#[derive(Debug, Default, Clone)]
pub(crate) struct ChannelAllocator {
    opened: u64,
}

impl ChannelAllocator {
    pub(crate) fn next(&mut self) -> ChannelId {
        self.opened += 1;
        ChannelId(self.opened)
    }
}

/// Backend that records every call in memory, for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    channels: ChannelAllocator,
    /// Calls in issue order.
    pub calls: Vec<BackendCall>,
}

impl InMemoryBackend {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel opened for `recording_id`, if any.
    pub fn channel_of(&self, recording_id: &str) -> Option<ChannelId> {
        self.calls.iter().find_map(|c| match c {
            BackendCall::OpenChannel {
                channel,
                recording_id: r,
                ..
            } if r == recording_id => Some(*channel),
            _ => None,
        })
    }

    /// Most recent visible-content declaration for `channel`.
    pub fn visible_content(&self, channel: ChannelId) -> Option<&[String]> {
        self.calls.iter().rev().find_map(|c| match c {
            BackendCall::DeclareVisibleContent { channel: ch, paths } if *ch == channel => {
                Some(paths.as_slice())
            }
            _ => None,
        })
    }

    /// Paths logged on `channel`, in issue order (repeats included).
    pub fn logged_paths(&self, channel: ChannelId) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::Log { channel: ch, path, .. } if *ch == channel => {
                    Some(path.as_str())
                }
                BackendCall::LogFile {
                    channel: ch,
                    path_prefix,
                    ..
                } if *ch == channel => Some(path_prefix.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Drop the recorded calls, keeping channel numbering.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Backend for InMemoryBackend {
    fn open_channel(
        &mut self,
        application_id: &str,
        recording_id: &str,
    ) -> ViewerResult<ChannelId> {
        let channel = self.channels.next();
        self.calls.push(BackendCall::OpenChannel {
            channel,
            application_id: application_id.to_string(),
            recording_id: recording_id.to_string(),
        });
        Ok(channel)
    }

    fn log_at(&mut self, channel: ChannelId, path: &str, shape: &Shape) -> ViewerResult<()> {
        self.calls.push(BackendCall::Log {
            channel,
            path: path.to_string(),
            shape: shape.clone(),
        });
        Ok(())
    }

    fn log_file_at(
        &mut self,
        channel: ChannelId,
        file: &Path,
        path_prefix: &str,
    ) -> ViewerResult<()> {
        self.calls.push(BackendCall::LogFile {
            channel,
            file: file.to_path_buf(),
            path_prefix: path_prefix.to_string(),
        });
        Ok(())
    }

    fn declare_visible_content(
        &mut self,
        channel: ChannelId,
        paths: &[String],
    ) -> ViewerResult<()> {
        self.calls.push(BackendCall::DeclareVisibleContent {
            channel,
            paths: paths.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/memory.rs"]
mod tests;

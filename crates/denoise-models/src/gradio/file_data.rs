//! Gradio `FileData` payloads.
//!
//! Files travel through the Gradio API as small JSON descriptors: the client
//! uploads bytes first, then references the server-side path in the call,
//! and the service answers with descriptors pointing at its outputs.

use denoise_abstraction::EnhanceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Marker Gradio uses to recognise file descriptors in `data` arrays.
pub const FILE_DATA_TYPE: &str = "gradio.FileData";

/// Metadata block attached to every file descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Always `gradio.FileData` for files.
    #[serde(rename = "_type")]
    pub kind: String,
}

impl Default for FileMeta {
    fn default() -> Self {
        Self { kind: FILE_DATA_TYPE.to_string() }
    }
}

/// A file descriptor as sent to or received from a Gradio app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileData {
    /// Server-side path of the file.
    pub path: String,

    /// Direct download URL, filled in by the server for outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// File name as seen by the uploader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_name: Option<String>,

    /// Size in bytes, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// MIME type, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Type marker telling the server this object is a file reference.
    #[serde(default)]
    pub meta: FileMeta,
}

impl FileData {
    /// Builds the descriptor referencing a file that was just uploaded.
    pub fn uploaded(path: String, orig_name: String) -> Self {
        Self {
            path,
            url: None,
            orig_name: Some(orig_name),
            size: None,
            mime_type: None,
            meta: FileMeta::default(),
        }
    }

    /// Interprets one element of a `complete` event's `data` array.
    ///
    /// `null` means the output slot is empty. Older Gradio versions answer
    /// with a bare path string instead of a descriptor.
    ///
    /// # Errors
    /// Returns `EnhanceError::SerializationError` for any other shape.
    pub fn from_output(value: &Value) -> Result<Option<Self>, EnhanceError> {
        match value {
            Value::Null => Ok(None),
            Value::String(path) if path.is_empty() => Ok(None),
            Value::String(path) => Ok(Some(Self {
                path: path.clone(),
                url: None,
                orig_name: None,
                size: None,
                mime_type: None,
                meta: FileMeta::default(),
            })),
            Value::Object(_) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                EnhanceError::SerializationError(format!("Invalid file descriptor: {}", e))
            }),
            other => Err(EnhanceError::SerializationError(format!(
                "Unexpected output value: {}",
                other
            ))),
        }
    }

    /// File name to use when storing this output locally.
    ///
    /// Only the final path component is kept so a hostile descriptor cannot
    /// escape the download directory.
    pub fn local_name(&self) -> String {
        self.orig_name
            .as_deref()
            .and_then(|name| Path::new(name).file_name())
            .or_else(|| Path::new(&self.path).file_name())
            .and_then(|name| name.to_str())
            .map_or_else(|| "output.wav".to_string(), str::to_string)
    }
}

//! Ingestible learning resources.
//!
//! A resource is the raw artifact (document, video, audio, image, quiz) that
//! the extractor turns into knowledge nodes. Resources are immutable once
//! created; uploads and storage live outside this crate.

use serde::{Deserialize, Serialize};

/// The kind of learning artifact a resource represents.
///
/// Unrecognized type strings deserialize to [`ResourceType::Unknown`], which
/// the extractor treats as unsupported and maps to an empty node list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Document,
    Video,
    Audio,
    Image,
    Quiz,
    #[serde(other)]
    Unknown,
}

impl ResourceType {
    /// Wire name of this resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Quiz => "quiz",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this resource type carries a playback timeline.
    pub fn is_timed(&self) -> bool {
        matches!(self, Self::Video | Self::Audio)
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A learning resource submitted for extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Playback length for timed media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub format: String,
}

impl Resource {
    /// Create a resource with no duration, zero size and an empty format.
    pub fn new(id: impl Into<String>, title: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            resource_type,
            duration_seconds: None,
            size_bytes: 0,
            format: String::new(),
        }
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn with_size(mut self, bytes: u64) -> Self {
        self.size_bytes = bytes;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_fields() {
        let json = r#"{
            "id": "r1",
            "title": "Intro Lecture",
            "type": "video",
            "durationSeconds": 1200,
            "sizeBytes": 1048576,
            "format": "mp4"
        }"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.resource_type, ResourceType::Video);
        assert_eq!(resource.duration_seconds, Some(1200));
        assert_eq!(resource.size_bytes, 1_048_576);
        assert!(resource.resource_type.is_timed());
    }

    #[test]
    fn unknown_type_is_not_an_error() {
        let json = r#"{"id": "r2", "title": "Slides", "type": "presentation"}"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.resource_type, ResourceType::Unknown);
        assert_eq!(resource.format, "");
    }
}

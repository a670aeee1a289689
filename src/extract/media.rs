//! Video and audio extraction.
//!
//! Timed media is cut into equal consecutive segments, one node per segment,
//! and every node carries the `[start, end)` offsets of its segment.

use std::ops::RangeInclusive;

use rand::RngCore;

use crate::extract::{NodeExtractor, node_count, random_difficulty, synthesize_node};
use crate::model::KnowledgeNode;
use crate::resource::{Resource, ResourceType};

const SEGMENTS_PER_VIDEO: RangeInclusive<usize> = 2..=5;
const SEGMENTS_PER_AUDIO: RangeInclusive<usize> = 2..=4;

/// Assumed length when a video has no recorded duration.
const DEFAULT_VIDEO_SECONDS: u32 = 600;
/// Assumed length when an audio clip has no recorded duration.
const DEFAULT_AUDIO_SECONDS: u32 = 300;

/// Extracts segment nodes from videos.
pub struct VideoExtractor;

impl NodeExtractor for VideoExtractor {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Video
    }

    fn extract(&self, resource: &Resource, rng: &mut dyn RngCore) -> Vec<KnowledgeNode> {
        extract_segments(resource, SEGMENTS_PER_VIDEO, DEFAULT_VIDEO_SECONDS, "segment", rng)
    }
}

/// Extracts clip nodes from audio recordings.
pub struct AudioExtractor;

impl NodeExtractor for AudioExtractor {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Audio
    }

    fn extract(&self, resource: &Resource, rng: &mut dyn RngCore) -> Vec<KnowledgeNode> {
        extract_segments(resource, SEGMENTS_PER_AUDIO, DEFAULT_AUDIO_SECONDS, "clip", rng)
    }
}

fn extract_segments(
    resource: &Resource,
    counts: RangeInclusive<usize>,
    default_seconds: u32,
    unit: &str,
    rng: &mut dyn RngCore,
) -> Vec<KnowledgeNode> {
    let count = node_count(counts, &mut *rng);
    let difficulty = random_difficulty(&mut *rng);
    let duration = resource.duration_seconds.unwrap_or(default_seconds);

    (0..count)
        .map(|i| {
            let (start, end) = segment_bounds(duration, count, i);
            synthesize_node(resource, i, unit, difficulty, &mut *rng).with_time_range(start, end)
        })
        .collect()
}

/// Offsets of the `index`-th of `count` equal segments. The last segment
/// absorbs the rounding remainder so the segments cover the whole duration.
fn segment_bounds(duration: u32, count: usize, index: usize) -> (u32, u32) {
    let count = u32::try_from(count.max(1)).unwrap_or(u32::MAX);
    let index = u32::try_from(index).unwrap_or(u32::MAX);
    let length = duration / count;
    let start = length.saturating_mul(index);
    let end = if index + 1 >= count {
        duration
    } else {
        start.saturating_add(length)
    };
    (start, end)
}

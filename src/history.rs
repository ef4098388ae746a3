//! Per-session generation history.
//!
//! The history is owned by the caller (the web layer keeps it in the user's
//! cookie session) and handed to every workflow call that reads or extends it.

use serde::{Deserialize, Serialize};

use crate::request::AspectRatio;

/// One successful image generation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Position in the session history, assigned by [`SessionHistory::append`]
    #[serde(default)]
    pub id: usize,
    /// Final prompt sent to the image service
    pub prompt: String,
    /// PNG bytes exactly as returned
    #[serde(with = "base64_bytes")]
    pub image_bytes: Vec<u8>,
    /// Local time, `%Y%m%d_%H%M%S`
    pub timestamp: String,
    /// Seed that was sent
    pub seed: u32,
    /// Sampling steps that were sent
    pub steps: u8,
    /// Aspect ratio that was sent
    pub aspect_ratio: AspectRatio,
    /// Negative prompt, if one was sent
    pub negative_prompt: Option<String>,
}

impl GenerationResult {
    /// Name offered when downloading this entry from the gallery.
    pub fn download_filename(&self) -> String {
        format!("{}.png", self.timestamp)
    }
}

/// Append-only list of generations, most recent last.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionHistory {
    entries: Vec<GenerationResult>,
}

impl SessionHistory {
    /// An empty history for a new session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a result at the end and gives it the next id. There is no size limit.
    pub fn append(&mut self, mut result: GenerationResult) -> &GenerationResult {
        let id = self.entries.len();
        result.id = id;
        self.entries.push(result);
        &self.entries[id]
    }

    /// The entry with this id.
    pub fn get(&self, id: usize) -> Option<&GenerationResult> {
        self.entries.get(id)
    }

    /// The last `n` entries, newest first.
    pub fn list_recent(&self, n: usize) -> Vec<&GenerationResult> {
        self.entries.iter().rev().take(n).collect()
    }

    /// Looks up an entry by timestamp, preferring the newest on collisions.
    pub fn find(&self, timestamp: &str) -> Option<&GenerationResult> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.timestamp == timestamp)
    }

    /// The prompt of the entry with this timestamp.
    pub fn select(&self, timestamp: &str) -> Option<&str> {
        self.find(timestamp).map(|entry| entry.prompt.as_str())
    }

    /// Every entry, oldest first.
    pub fn entries(&self) -> &[GenerationResult] {
        &self.entries
    }

    /// All prompts in insertion order.
    pub fn prompts(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.prompt.as_str()).collect()
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&GenerationResult> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before the first successful generation.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}

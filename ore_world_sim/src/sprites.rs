// Opaque image-list handles.
//
// The image store that decodes sprites lives outside the sim. What crosses
// the boundary is a `SpriteHandle`: the key the outer layer registered the
// list under and how many frames it has. The sim never looks at pixels; it
// only needs the frame count to wrap an entity's frame index, and a handle to
// copy into entities it creates (ore → blob, vein → ore, blob → quake).
//
// `SpriteCatalog` is the sim-side copy of that registry. Unknown keys fall
// back to a single-frame default list, the same way the outer image store
// answers for missing keys.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Handle to an image list owned by the rendering layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteHandle {
    pub key: String,
    pub frame_count: u32,
}

impl SpriteHandle {
    pub fn new(key: impl Into<String>, frame_count: u32) -> Self {
        Self {
            key: key.into(),
            frame_count,
        }
    }

    /// The frame after `frame`, wrapping at the end of the list. An empty
    /// list behaves like a single frame.
    pub fn next_frame(&self, frame: u32) -> u32 {
        (frame + 1) % self.frame_count.max(1)
    }
}

/// Keyed sprite handles with a fallback for keys that were never registered.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpriteCatalog {
    sheets: BTreeMap<String, SpriteHandle>,
    fallback: SpriteHandle,
}

impl Default for SpriteCatalog {
    fn default() -> Self {
        Self {
            sheets: BTreeMap::new(),
            fallback: SpriteHandle::new("default", 1),
        }
    }
}

impl SpriteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_handles(handles: impl IntoIterator<Item = SpriteHandle>) -> Self {
        let mut catalog = Self::new();
        for handle in handles {
            catalog.insert(handle);
        }
        catalog
    }

    /// Register a handle, replacing any earlier one with the same key.
    pub fn insert(&mut self, handle: SpriteHandle) {
        self.sheets.insert(handle.key.clone(), handle);
    }

    pub fn get(&self, key: &str) -> &SpriteHandle {
        self.sheets.get(key).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sheets.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

//! Options controlling how a container is opened and queried.

use std::path::PathBuf;

use super::cache::DEFAULT_CACHE_CAPACITY;

/// Open-time settings for an [`ImgReader`](super::reader::ImgReader).
#[derive(Debug, Clone)]
pub struct ImgOptions {
    /// Budget of each query cache, counted in decoded features.
    ///
    /// Trades memory for smoother panning. Zero is raised to one.
    pub cache_capacity: usize,
    /// Styling file used when the container embeds none.
    pub style_fallback: Option<PathBuf>,
}

impl Default for ImgOptions {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            style_fallback: None,
        }
    }
}

impl ImgOptions {
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_style_fallback(mut self, path: impl Into<PathBuf>) -> Self {
        self.style_fallback = Some(path.into());
        self
    }
}

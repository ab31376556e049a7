//! Font loading and caching
//!
//! Only the fonts bundled with `typst-assets` are loaded, so the report looks
//! the same on every machine. The cache is built once per process.

use std::sync::OnceLock;

use typst::foundations::Bytes;
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;

/// Global font cache singleton
static FONT_CACHE: OnceLock<FontCache> = OnceLock::new();

/// Get the global font cache, initializing it if necessary
pub fn global_font_cache() -> &'static FontCache {
    FONT_CACHE.get_or_init(FontCache::new)
}

/// A cache of fonts available for compilation
#[derive(Debug)]
pub struct FontCache {
    /// Metadata about the available fonts, pre-hashed for Typst
    book: LazyHash<FontBook>,
    /// The actual font data
    fonts: Vec<Font>,
}

impl FontCache {
    /// Create a new font cache with embedded fonts
    pub fn new() -> Self {
        let mut book = FontBook::new();
        let mut fonts = Vec::new();

        for data in typst_assets::fonts() {
            let buffer = Bytes::from_static(data);
            for font in Font::iter(buffer) {
                book.push(font.info().clone());
                fonts.push(font);
            }
        }

        tracing::debug!("Font cache initialized with {} fonts", fonts.len());

        Self {
            book: LazyHash::new(book),
            fonts,
        }
    }

    /// Get the font book
    pub fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    /// Get a font by index
    pub fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    /// Get the number of fonts
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new()
    }
}

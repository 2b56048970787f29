//! Fonts: named glyph solids with a lazily filled cache.
//!
//! A spliced font can synthesize a multi-character glyph ("10", "6.") from the
//! single-character glyphs it already holds. Composites are built once and
//! shared; later requests for the same name return the same `Arc`.

pub mod loader;

pub use loader::{AssetLoader, OutlineFileLoader, SegmentGlyphs};

use crate::dice::{DiceError, DiceResult};
use crate::geometry::{Aabb, Transform, Vector3};
use crate::kernel::GeometryKernel;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FontKind {
    /// Every glyph must be present in the asset set.
    Direct,
    /// Multi-character names are laid out from single characters,
    /// `padding` apart.
    Spliced { padding: f64 },
}

/// A glyph asset paired with where it goes.
#[derive(Debug, Clone)]
pub struct GlyphPlacement<S> {
    pub glyph: String,
    pub asset: Arc<S>,
    pub transform: Transform,
}

pub struct Font<K: GeometryKernel> {
    name: String,
    kind: FontKind,
    cache: Mutex<HashMap<String, Arc<K::Solid>>>,
}

impl<K: GeometryKernel> Font<K> {
    pub fn new(name: impl Into<String>, kind: FontKind, assets: HashMap<String, K::Solid>) -> Self {
        let cache = assets.into_iter().map(|(k, v)| (k, Arc::new(v))).collect();
        Self {
            name: name.into(),
            kind,
            cache: Mutex::new(cache),
        }
    }

    pub fn direct(name: impl Into<String>, assets: HashMap<String, K::Solid>) -> Self {
        Self::new(name, FontKind::Direct, assets)
    }

    pub fn spliced(name: impl Into<String>, assets: HashMap<String, K::Solid>, padding: f64) -> Self {
        Self::new(name, FontKind::Spliced { padding }, assets)
    }

    /// Seeds the cache from `loader` in a single call.
    pub fn load<L: AssetLoader>(loader: &L, kernel: &K, kind: FontKind) -> DiceResult<Self> {
        let assets = loader.load_glyph_assets(kernel)?;
        debug!(font = loader.font_identifier(), glyphs = assets.len(), "loaded glyph assets");
        Ok(Self::new(loader.font_identifier(), kind, assets))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FontKind {
        self.kind
    }

    // A poisoned cache is still a valid map; inserts are single operations.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<K::Solid>>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn contains(&self, glyph: &str) -> bool {
        self.lock().contains_key(glyph)
    }

    /// Cached glyph names, sorted.
    pub fn glyph_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Looks up (or splices) `glyph` and pairs it with `transform`.
    pub fn create_glyph(&self, kernel: &K, glyph: &str, transform: Transform) -> DiceResult<GlyphPlacement<K::Solid>> {
        let asset = self.resolve(kernel, glyph)?;
        Ok(GlyphPlacement {
            glyph: glyph.to_string(),
            asset,
            transform,
        })
    }

    /// Resolves every name up front so later placements are cache hits.
    pub fn preload<'a>(&self, kernel: &K, glyphs: impl IntoIterator<Item = &'a str>) -> DiceResult<()> {
        for glyph in glyphs {
            self.resolve(kernel, glyph)?;
        }
        Ok(())
    }

    fn unresolved(&self, glyph: &str) -> DiceError {
        DiceError::UnresolvedGlyph {
            font: self.name.clone(),
            glyph: glyph.to_string(),
        }
    }

    fn resolve(&self, kernel: &K, glyph: &str) -> DiceResult<Arc<K::Solid>> {
        // Held across the splice so a composite is only ever built once.
        let mut cache = self.lock();
        if let Some(asset) = cache.get(glyph) {
            return Ok(Arc::clone(asset));
        }
        let padding = match self.kind {
            FontKind::Spliced { padding } if glyph.chars().count() > 1 => padding,
            _ => return Err(self.unresolved(glyph)),
        };
        let composite = Arc::new(self.splice(kernel, &cache, glyph, padding)?);
        cache.insert(glyph.to_string(), Arc::clone(&composite));
        debug!(font = %self.name, glyph, "spliced composite glyph");
        Ok(composite)
    }

    fn splice(
        &self,
        kernel: &K,
        cache: &HashMap<String, Arc<K::Solid>>,
        glyph: &str,
        padding: f64,
    ) -> DiceResult<K::Solid> {
        let mut parts: Vec<(&K::Solid, Aabb)> = Vec::new();
        for ch in glyph.chars() {
            let key = ch.to_string();
            let asset = cache.get(&key).ok_or_else(|| self.unresolved(&key))?;
            parts.push((asset.as_ref(), kernel.bounds(asset)?));
        }

        let total: f64 = parts.iter().map(|(_, b)| b.width()).sum::<f64>() + padding * (parts.len() - 1) as f64;
        let mut cursor = -total / 2.0;
        let mut placed = Vec::with_capacity(parts.len());
        for (asset, bounds) in parts {
            let shift = Transform::translation(Vector3::new(cursor - bounds.min.x, 0.0, 0.0));
            placed.push(kernel.transform_solid(asset, &shift)?);
            cursor += bounds.width() + padding;
        }
        Ok(kernel.combine(&placed)?)
    }
}

//! Glyph asset sources.
//!
//! Assets are authored `GLYPH_ASSET_HEIGHT` units tall, centred on the origin
//! in x/y, and span `z in [-depth, depth]` so an emboss cuts `depth` deep.

use crate::dice::{DiceError, DiceResult, GLYPH_ASSET_HEIGHT};
use crate::kernel::{ExtrudeParams, GeometryKernel, Point2D, Polygon2D};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Supplies the glyph solids of one font.
pub trait AssetLoader {
    fn font_identifier(&self) -> &str;

    fn load_glyph_assets<K: GeometryKernel>(&self, kernel: &K) -> DiceResult<HashMap<String, K::Solid>>;
}

fn extrude_outlines<K: GeometryKernel>(kernel: &K, outlines: &[Polygon2D], depth: f64) -> DiceResult<K::Solid> {
    let params = ExtrudeParams::linear(2.0 * depth).with_start_offset(-depth);
    let parts = outlines
        .iter()
        .map(|outline| kernel.extrude_polygon(outline, &params))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [single] => Ok(single.clone()),
        _ => Ok(kernel.combine(&parts)?),
    }
}

/// Seven-segment digits plus `"."` and `"%"`, built from rectangles.
#[derive(Debug, Clone)]
pub struct SegmentGlyphs {
    pub depth: f64,
    pub stroke: f64,
}

impl Default for SegmentGlyphs {
    fn default() -> Self {
        Self {
            depth: 0.5,
            stroke: 1.2,
        }
    }
}

//  aaa
// f   b
//  ggg
// e   c
//  ddd
const DIGIT_SEGMENTS: [&str; 10] = [
    "abcdef", "bc", "abged", "abgcd", "fgbc", "afgcd", "afgecd", "abc", "abcdefg", "abcdfg",
];

impl SegmentGlyphs {
    pub fn new(depth: f64, stroke: f64) -> Self {
        Self { depth, stroke }
    }

    fn width(&self) -> f64 {
        GLYPH_ASSET_HEIGHT * 0.6
    }

    fn segment(&self, name: char) -> Polygon2D {
        let s = self.stroke;
        let gap = s * 0.2;
        let hw = self.width() / 2.0;
        let hh = GLYPH_ASSET_HEIGHT / 2.0;
        let bar = 2.0 * (hw - s - gap);
        let post = hh - gap;
        match name {
            'a' => Polygon2D::rect(-hw + s + gap, hh - s, bar, s),
            'g' => Polygon2D::rect(-hw + s + gap, -s / 2.0, bar, s),
            'd' => Polygon2D::rect(-hw + s + gap, -hh, bar, s),
            'b' => Polygon2D::rect(hw - s, gap, s, post),
            'c' => Polygon2D::rect(hw - s, -hh, s, post),
            'f' => Polygon2D::rect(-hw, gap, s, post),
            _ => Polygon2D::rect(-hw, -hh, s, post),
        }
    }

    /// Shifts outlines so their combined x extent is centred on zero.
    fn centred(outlines: Vec<Polygon2D>) -> Vec<Polygon2D> {
        let xs = outlines.iter().flat_map(|o| o.exterior.iter().map(|p| p.x));
        let (min, max) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
        let shift = (min + max) / 2.0;
        outlines
            .into_iter()
            .map(|o| Polygon2D::new(o.exterior.iter().map(|p| Point2D::new(p.x - shift, p.y)).collect()))
            .collect()
    }

    fn digit(&self, digit: usize) -> Vec<Polygon2D> {
        Self::centred(DIGIT_SEGMENTS[digit].chars().map(|c| self.segment(c)).collect())
    }

    fn dot(&self) -> Vec<Polygon2D> {
        let s = self.stroke;
        vec![Polygon2D::rect(-s / 2.0, -GLYPH_ASSET_HEIGHT / 2.0, s, s)]
    }

    fn percent(&self) -> Vec<Polygon2D> {
        let s = self.stroke;
        let hw = self.width() / 2.0;
        let hh = GLYPH_ASSET_HEIGHT / 2.0;
        let ring = s * 1.6;
        let slash = Polygon2D::from_arrays(&[[-hw, -hh], [-hw + s, -hh], [hw, hh], [hw - s, hh]], &[]);
        vec![
            Polygon2D::rect(-hw, hh - ring, ring, ring),
            slash,
            Polygon2D::rect(hw - ring, -hh, ring, ring),
        ]
    }
}

impl AssetLoader for SegmentGlyphs {
    fn font_identifier(&self) -> &str {
        "segment"
    }

    fn load_glyph_assets<K: GeometryKernel>(&self, kernel: &K) -> DiceResult<HashMap<String, K::Solid>> {
        let mut assets = HashMap::new();
        for digit in 0..DIGIT_SEGMENTS.len() {
            assets.insert(digit.to_string(), extrude_outlines(kernel, &self.digit(digit), self.depth)?);
        }
        assets.insert(".".to_string(), extrude_outlines(kernel, &self.dot(), self.depth)?);
        assets.insert("%".to_string(), extrude_outlines(kernel, &self.percent(), self.depth)?);
        Ok(assets)
    }
}

#[derive(Debug, Deserialize)]
struct OutlineFile {
    name: String,
    depth: f64,
    glyphs: HashMap<String, Vec<Vec<[f64; 2]>>>,
}

/// Glyph outlines read from a JSON file:
/// `{ "name": .., "depth": .., "glyphs": { "<glyph>": [[[x, y], ..], ..] } }`.
#[derive(Debug)]
pub struct OutlineFileLoader {
    name: String,
    depth: f64,
    glyphs: Vec<(String, Vec<Polygon2D>)>,
}

impl OutlineFileLoader {
    pub fn from_path(path: impl AsRef<Path>) -> DiceResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DiceError::AssetLoad {
            font: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&text).map_err(|e| match e {
            DiceError::AssetLoad { reason, .. } => DiceError::AssetLoad {
                font: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_json(text: &str) -> DiceResult<Self> {
        let file: OutlineFile = serde_json::from_str(text).map_err(|e| DiceError::AssetLoad {
            font: "<json>".to_string(),
            reason: e.to_string(),
        })?;
        if !(file.depth.is_finite() && file.depth > 0.0) {
            return Err(DiceError::InvalidSize {
                what: "depth",
                value: file.depth,
            });
        }

        let mut glyphs = Vec::with_capacity(file.glyphs.len());
        for (glyph, loops) in file.glyphs {
            if loops.is_empty() {
                return Err(DiceError::AssetLoad {
                    font: file.name.clone(),
                    reason: format!("glyph '{}' has no outline", glyph),
                });
            }
            let mut outlines = Vec::with_capacity(loops.len());
            for points in loops {
                if points.len() < 3 {
                    return Err(DiceError::AssetLoad {
                        font: file.name.clone(),
                        reason: format!("glyph '{}' has a loop with {} points", glyph, points.len()),
                    });
                }
                let mut outline = Polygon2D::from_arrays(&points, &[]);
                if outline.signed_area2() < 0.0 {
                    outline.exterior.reverse();
                }
                outlines.push(outline);
            }
            glyphs.push((glyph, outlines));
        }
        glyphs.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(Self {
            name: file.name,
            depth: file.depth,
            glyphs,
        })
    }
}

impl AssetLoader for OutlineFileLoader {
    fn font_identifier(&self) -> &str {
        &self.name
    }

    fn load_glyph_assets<K: GeometryKernel>(&self, kernel: &K) -> DiceResult<HashMap<String, K::Solid>> {
        self.glyphs
            .iter()
            .map(|(glyph, outlines)| -> DiceResult<(String, K::Solid)> {
                Ok((glyph.clone(), extrude_outlines(kernel, outlines, self.depth)?))
            })
            .collect()
    }
}

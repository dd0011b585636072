//! Reference pictures and the slice of one each tile shows.

use serde::{Deserialize, Serialize};

use crate::location::{Dimension, Location};

/// An opaque handle to content owned by the presentation layer, such as a music track or a picture.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// A picture spread across the tiles. Only its pixel size matters here.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ReferenceImage {
    /// The picture itself, as the presentation layer knows it.
    pub asset: AssetId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A pixel rectangle of a [`ReferenceImage`], origin at the image's `(0, 0)` corner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpriteRect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl ReferenceImage {
    /// The slice of the picture shown by the tile whose solved position is `original`.
    pub fn sprite_rect(&self, original: Location, dims: (Dimension, Dimension)) -> SpriteRect {
        let width = self.width as f32 / dims.0.get() as f32;
        let height = self.height as f32 / dims.1.get() as f32;
        SpriteRect { x: original.0 as f32 * width, y: original.1 as f32 * height, width, height }
    }
}

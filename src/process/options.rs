use crate::foundation::error::{SpriteforgeError, SpriteforgeResult};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Knobs shared by the frame compositor and every processor.
///
/// Deserializes from JSON with per-field defaults, so a config file only needs the fields it
/// changes:
///
/// ```
/// let opts = spriteforge::ProcessorOptions::from_json_str(r#"{ "spacing": 2 }"#).unwrap();
/// assert_eq!(opts.spacing, 2);
/// assert!(opts.only_visible_layers);
/// ```
pub struct ProcessorOptions {
    /// Skip layers that are hidden directly or through an ancestor group.
    pub only_visible_layers: bool,
    /// Composite layers flagged as background.
    pub include_background_layer: bool,
    /// Let identical frames share one atlas cell.
    pub merge_duplicate_frames: bool,
    /// Premultiply flattened buffers once, after all layers are blended.
    pub premultiply_alpha: bool,
    /// Atlas cell arrangement.
    pub layout: AtlasLayout,
    /// Transparent pixels around the whole atlas.
    pub border_padding: u32,
    /// Transparent pixels between neighbouring cells.
    pub spacing: u32,
    /// Transparent pixels around each frame inside its cell.
    pub inner_padding: u32,
    /// Frame flattening fan-out.
    pub threading: ProcessThreading,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            only_visible_layers: true,
            include_background_layer: false,
            merge_duplicate_frames: true,
            premultiply_alpha: false,
            layout: AtlasLayout::Square,
            border_padding: 0,
            spacing: 0,
            inner_padding: 0,
            threading: ProcessThreading::default(),
        }
    }
}

impl ProcessorOptions {
    pub fn from_json_str(json: &str) -> SpriteforgeResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| SpriteforgeError::serde(format!("invalid processor options: {e}")))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// How frames are arranged in an atlas.
pub enum AtlasLayout {
    /// One row, frames left to right.
    Horizontal,
    /// One column, frames top to bottom.
    Vertical,
    /// Near-square grid with `ceil(sqrt(n))` columns.
    #[default]
    Square,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProcessThreading {
    /// Flatten frames on a rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Pool size; rayon picks one when unset.
    pub threads: Option<usize>,
}

#[cfg(test)]
#[path = "../../tests/unit/process/options.rs"]
mod tests;

pub(crate) mod atlas;
pub(crate) mod options;
pub(crate) mod sprite_sheet;
pub(crate) mod tilemap;
pub(crate) mod tileset;

use super::*;
use crate::document::dsl::DocumentBuilder;

fn tileset(id: u32, name: &str, tiles: u32) -> Tileset {
    Tileset {
        id,
        name: name.to_string(),
        tile_width: 2,
        tile_height: 2,
        tile_count: tiles,
        pixels: vec![id as u8; (16 * tiles) as usize],
    }
}

fn doc_with(tilesets: Vec<Tileset>) -> Document {
    tilesets
        .into_iter()
        .fold(DocumentBuilder::new("map", 8, 8).frame(100), |b, t| {
            b.tileset(t)
        })
        .build()
        .unwrap()
}

#[test]
fn repeated_tileset_name_fails() {
    let doc = doc_with(vec![tileset(0, "ground", 1), tileset(1, "ground", 1)]);
    let err = process_tileset_collection(&doc).unwrap_err();
    assert!(matches!(err, SpriteforgeError::DuplicateTilesetName(n) if n == "ground"));
}

#[test]
fn distinct_names_extract_in_document_order() {
    let doc = doc_with(vec![tileset(7, "ground", 2), tileset(3, "props", 1)]);
    let collection = extract_tilesets(&doc).unwrap();
    let names: Vec<_> = collection.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["ground", "props"]);
    assert_eq!(collection.get("ground").unwrap().tile_count, 2);
    assert_eq!(collection.get("props").unwrap().pixels, vec![3; 16]);
}

#[test]
fn document_without_tilesets_yields_empty_collection() {
    let doc = doc_with(Vec::new());
    assert!(process_tileset_collection(&doc).unwrap().is_empty());
}

#[test]
fn single_tileset_by_id_or_index() {
    let doc = doc_with(vec![tileset(7, "ground", 2), tileset(3, "props", 1)]);

    let by_id = process_tileset(&doc, TilesetRef::Id(3)).unwrap();
    assert_eq!(by_id.name, "props");

    let by_index = process_tileset(&doc, TilesetRef::Index(0)).unwrap();
    assert_eq!(by_index.name, "ground");
    assert_eq!(by_index.tile_width, 2);
    assert_eq!(by_index.pixels.len(), 32);
}

#[test]
fn missing_tileset_is_not_found() {
    let doc = doc_with(vec![tileset(7, "ground", 1)]);
    for selector in [TilesetRef::Id(0), TilesetRef::Index(1)] {
        let err = process_tileset(&doc, selector).unwrap_err();
        assert!(matches!(err, SpriteforgeError::TilesetNotFound(_)));
    }
}

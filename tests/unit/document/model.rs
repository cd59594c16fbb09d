use super::*;
use crate::document::dsl::{DocumentBuilder, LayerBuilder, image_cel, linked_cel, tag};

fn red_2x2() -> Vec<u8> {
    [255u8, 0, 0, 255].repeat(4)
}

fn linked_doc() -> Document {
    DocumentBuilder::new("hero", 2, 2)
        .frames(&[100, 100, 100])
        .layer(LayerBuilder::image("body").build().unwrap())
        .cel(0, image_cel(0, Point::ZERO, 2, 2, red_2x2()))
        .unwrap()
        .cel(2, linked_cel(0, 0))
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn resolve_cel_follows_link_once() {
    let doc = linked_doc();
    let direct = doc.resolve_cel(0, 0).unwrap();
    let linked = doc.resolve_cel(2, 0).unwrap();
    assert_eq!(direct, linked);
    assert!(doc.resolve_cel(1, 0).is_none());
    assert!(doc.resolve_cel(9, 0).is_none());
}

#[test]
fn resolve_cel_does_not_chase_link_chains() {
    let mut doc = linked_doc();
    // Bypass the builder: frame 1 links to frame 2 which is itself a link.
    doc.frames[1].cels.push(linked_cel(0, 2));
    assert!(doc.resolve_cel(1, 0).is_none());
    assert!(doc.validate().is_err());
}

#[test]
fn validate_rejects_tag_past_last_frame() {
    let err = DocumentBuilder::new("hero", 2, 2)
        .frames(&[100, 100])
        .tag(tag("run", 0, 2, LoopDirection::Forward))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        SpriteforgeError::InvalidTagRange {
            to: 2,
            frame_count: 2,
            ..
        }
    ));
}

#[test]
fn validate_rejects_link_to_later_frame() {
    let err = DocumentBuilder::new("hero", 2, 2)
        .frames(&[100, 100])
        .layer(LayerBuilder::image("body").build().unwrap())
        .cel(0, linked_cel(0, 1))
        .unwrap()
        .cel(1, image_cel(0, Point::ZERO, 2, 2, red_2x2()))
        .unwrap()
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("earlier frame"));
}

#[test]
fn validate_rejects_short_pixel_buffer() {
    let err = DocumentBuilder::new("hero", 2, 2)
        .frame(100)
        .layer(LayerBuilder::image("body").build().unwrap())
        .cel(0, image_cel(0, Point::ZERO, 2, 2, vec![0; 12]))
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(err, SpriteforgeError::Validation(_)));
}

#[test]
fn validate_rejects_parent_that_is_not_a_group() {
    let err = DocumentBuilder::new("hero", 2, 2)
        .frame(100)
        .layer(LayerBuilder::image("a").build().unwrap())
        .layer(LayerBuilder::image("b").parent(0).build().unwrap())
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("not a group"));
}

#[test]
fn slice_key_in_effect_until_next_key() {
    let slice = Slice {
        name: "hitbox".to_string(),
        keys: vec![
            SliceKey {
                frame: 1,
                bounds: Rect::new(0, 0, 4, 4),
                center: None,
                pivot: None,
            },
            SliceKey {
                frame: 3,
                bounds: Rect::new(1, 1, 2, 2),
                center: None,
                pivot: Some(Point::new(1, 1)),
            },
        ],
        user_data: UserData::default(),
    };
    assert!(slice.key_at(0).is_none());
    assert_eq!(slice.key_at(1).unwrap().bounds.width, 4);
    assert_eq!(slice.key_at(2).unwrap().bounds.width, 4);
    assert_eq!(slice.key_at(3).unwrap().bounds.width, 2);
    assert_eq!(slice.key_at(40).unwrap().frame, 3);
}

#[test]
fn document_survives_json() {
    let doc = linked_doc();
    let json = serde_json::to_string(&doc).unwrap();
    let back: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
}

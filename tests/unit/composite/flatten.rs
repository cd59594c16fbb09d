use super::*;
use crate::document::dsl::{DocumentBuilder, LayerBuilder, image_cel, linked_cel, tilemap_cel};
use crate::document::model::{Tile, Tileset};
use crate::process::options::ProcessThreading;

fn solid(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
    px.repeat((width * height) as usize)
}

fn gradient_4x4() -> Vec<u8> {
    (0..16u8)
        .flat_map(|i| [i * 10, 255 - i * 10, i, 255])
        .collect()
}

#[test]
fn no_visible_layers_yields_transparent_frame() {
    let doc = DocumentBuilder::new("d", 5, 3)
        .frame(100)
        .layer(LayerBuilder::image("hidden").hidden().build().unwrap())
        .cel(0, image_cel(0, Point::ZERO, 5, 3, solid(5, 3, [9, 9, 9, 255])))
        .unwrap()
        .build()
        .unwrap();

    let out = flatten_frame(&doc, 0, &ProcessorOptions::default()).unwrap();
    assert_eq!((out.width, out.height), (5, 3));
    assert_eq!(out.data.len(), 5 * 3 * 4);
    assert!(out.is_fully_transparent());
}

#[test]
fn single_opaque_layer_is_copied_exactly() {
    let pixels = gradient_4x4();
    let doc = DocumentBuilder::new("d", 4, 4)
        .frame(100)
        .layer(LayerBuilder::image("only").build().unwrap())
        .cel(0, image_cel(0, Point::ZERO, 4, 4, pixels.clone()))
        .unwrap()
        .build()
        .unwrap();

    let out = flatten_frame(&doc, 0, &ProcessorOptions::default()).unwrap();
    assert_eq!(out.data, pixels);
    assert!(!out.premultiplied);

    // Fully transparent pixels keep their color too.
    let keyed = vec![10, 20, 30, 0, 1, 2, 3, 255];
    let doc = DocumentBuilder::new("d", 2, 1)
        .frame(100)
        .layer(LayerBuilder::image("only").build().unwrap())
        .cel(0, image_cel(0, Point::ZERO, 2, 1, keyed.clone()))
        .unwrap()
        .build()
        .unwrap();
    let out = flatten_frame(&doc, 0, &ProcessorOptions::default()).unwrap();
    assert_eq!(out.data, keyed);
}

#[test]
fn hidden_layer_is_drawn_when_visibility_is_ignored() {
    let doc = DocumentBuilder::new("d", 1, 1)
        .frame(100)
        .layer(LayerBuilder::image("hidden").hidden().build().unwrap())
        .cel(0, image_cel(0, Point::ZERO, 1, 1, vec![1, 2, 3, 255]))
        .unwrap()
        .build()
        .unwrap();

    let opts = ProcessorOptions {
        only_visible_layers: false,
        ..ProcessorOptions::default()
    };
    let out = flatten_frame(&doc, 0, &opts).unwrap();
    assert_eq!(out.data, vec![1, 2, 3, 255]);
}

#[test]
fn hidden_group_hides_its_children() {
    let doc = DocumentBuilder::new("d", 1, 1)
        .frame(100)
        .layer(LayerBuilder::group("g").hidden().build().unwrap())
        .layer(LayerBuilder::image("child").parent(0).build().unwrap())
        .cel(0, image_cel(1, Point::ZERO, 1, 1, vec![1, 2, 3, 255]))
        .unwrap()
        .build()
        .unwrap();

    let out = flatten_frame(&doc, 0, &ProcessorOptions::default()).unwrap();
    assert!(out.is_fully_transparent());
}

#[test]
fn top_layer_covers_bottom_layer() {
    let doc = DocumentBuilder::new("d", 2, 1)
        .frame(100)
        .layer(LayerBuilder::image("bottom").build().unwrap())
        .layer(LayerBuilder::image("top").build().unwrap())
        .cel(0, image_cel(0, Point::ZERO, 2, 1, solid(2, 1, [255, 0, 0, 255])))
        .unwrap()
        .cel(0, image_cel(1, Point::new(1, 0), 1, 1, vec![0, 0, 255, 255]))
        .unwrap()
        .build()
        .unwrap();

    let out = flatten_frame(&doc, 0, &ProcessorOptions::default()).unwrap();
    assert_eq!(out.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(out.pixel(1, 0), Some([0, 0, 255, 255]));
}

#[test]
fn layer_and_cel_opacity_multiply() {
    let top = image_cel(1, Point::ZERO, 1, 1, vec![255, 255, 255, 255]);
    let doc = DocumentBuilder::new("d", 1, 1)
        .frame(100)
        .layer(LayerBuilder::image("bottom").build().unwrap())
        .layer(LayerBuilder::image("top").opacity(128).build().unwrap())
        .cel(0, image_cel(0, Point::ZERO, 1, 1, vec![0, 0, 0, 255]))
        .unwrap()
        .cel(0, top)
        .unwrap()
        .build()
        .unwrap();

    let out = flatten_frame(&doc, 0, &ProcessorOptions::default()).unwrap();
    assert_eq!(out.pixel(0, 0), Some([128, 128, 128, 255]));

    let mut faded = doc.clone();
    faded.frames[0].cels[1].opacity = 0;
    let out = flatten_frame(&faded, 0, &ProcessorOptions::default()).unwrap();
    assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 255]));
}

#[test]
fn blend_mode_of_layer_is_applied() {
    let doc = DocumentBuilder::new("d", 1, 1)
        .frame(100)
        .layer(LayerBuilder::image("bottom").build().unwrap())
        .layer(
            LayerBuilder::image("top")
                .blend(BlendMode::Multiply)
                .build()
                .unwrap(),
        )
        .cel(0, image_cel(0, Point::ZERO, 1, 1, vec![200, 100, 50, 255]))
        .unwrap()
        .cel(0, image_cel(1, Point::ZERO, 1, 1, vec![0, 255, 255, 255]))
        .unwrap()
        .build()
        .unwrap();

    let out = flatten_frame(&doc, 0, &ProcessorOptions::default()).unwrap();
    assert_eq!(out.pixel(0, 0), Some([0, 100, 50, 255]));
}

#[test]
fn linked_cel_draws_target_pixels() {
    let doc = DocumentBuilder::new("d", 1, 1)
        .frames(&[100, 100])
        .layer(LayerBuilder::image("body").build().unwrap())
        .cel(0, image_cel(0, Point::ZERO, 1, 1, vec![7, 8, 9, 255]))
        .unwrap()
        .cel(1, linked_cel(0, 0))
        .unwrap()
        .build()
        .unwrap();

    let opts = ProcessorOptions::default();
    assert_eq!(
        flatten_frame(&doc, 1, &opts).unwrap(),
        flatten_frame(&doc, 0, &opts).unwrap()
    );
}

#[test]
fn cel_overhanging_canvas_is_clipped() {
    let doc = DocumentBuilder::new("d", 2, 2)
        .frame(100)
        .layer(LayerBuilder::image("body").build().unwrap())
        .cel(0, image_cel(0, Point::new(-1, 1), 2, 2, gradient_4x4()[..16].to_vec()))
        .unwrap()
        .build()
        .unwrap();

    let out = flatten_frame(&doc, 0, &ProcessorOptions::default()).unwrap();
    // Source pixel (1, 0) lands on (0, 1); everything else is outside or untouched.
    assert_eq!(out.pixel(0, 1), Some([10, 245, 1, 255]));
    assert_eq!(out.pixel(1, 1), Some([0, 0, 0, 0]));
    assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn tilemap_background_and_reference_layers_are_not_flattened() {
    let doc = DocumentBuilder::new("d", 1, 1)
        .frame(100)
        .tileset(Tileset {
            id: 0,
            name: "ground".to_string(),
            tile_width: 1,
            tile_height: 1,
            tile_count: 1,
            pixels: vec![255, 255, 255, 255],
        })
        .layer(LayerBuilder::image("bg").background().build().unwrap())
        .layer(LayerBuilder::tilemap("tiles", 0).build().unwrap())
        .layer(LayerBuilder::image("ref").reference().build().unwrap())
        .cel(0, image_cel(0, Point::ZERO, 1, 1, vec![1, 1, 1, 255]))
        .unwrap()
        .cel(0, tilemap_cel(1, Point::ZERO, 1, 1, vec![Tile::new(0)]))
        .unwrap()
        .cel(0, image_cel(2, Point::ZERO, 1, 1, vec![2, 2, 2, 255]))
        .unwrap()
        .build()
        .unwrap();

    let out = flatten_frame(&doc, 0, &ProcessorOptions::default()).unwrap();
    assert!(out.is_fully_transparent());

    let opts = ProcessorOptions {
        include_background_layer: true,
        ..ProcessorOptions::default()
    };
    let out = flatten_frame(&doc, 0, &opts).unwrap();
    assert_eq!(out.data, vec![1, 1, 1, 255]);
}

#[test]
fn premultiply_happens_once_at_the_end() {
    let doc = DocumentBuilder::new("d", 1, 1)
        .frame(100)
        .layer(LayerBuilder::image("body").build().unwrap())
        .cel(0, image_cel(0, Point::ZERO, 1, 1, vec![200, 100, 50, 128]))
        .unwrap()
        .build()
        .unwrap();

    let opts = ProcessorOptions {
        premultiply_alpha: true,
        ..ProcessorOptions::default()
    };
    let out = flatten_frame(&doc, 0, &opts).unwrap();
    assert!(out.premultiplied);
    assert_eq!(out.data, vec![100, 50, 25, 128]);
}

#[test]
fn out_of_range_frame_is_rejected() {
    let doc = DocumentBuilder::new("d", 1, 1).frame(100).build().unwrap();
    assert!(flatten_frame(&doc, 1, &ProcessorOptions::default()).is_err());
}

#[test]
fn parallel_flatten_matches_sequential_order() {
    let mut builder = DocumentBuilder::new("d", 2, 2)
        .frames(&[100; 6])
        .layer(LayerBuilder::image("body").build().unwrap());
    for f in 0..6u8 {
        builder = builder
            .cel(
                usize::from(f),
                image_cel(0, Point::ZERO, 2, 2, solid(2, 2, [f * 40, f, 255 - f, 255])),
            )
            .unwrap();
    }
    let doc = builder.build().unwrap();

    let sequential = flatten_frames(&doc, &ProcessorOptions::default()).unwrap();
    let parallel = flatten_frames(
        &doc,
        &ProcessorOptions {
            threading: ProcessThreading {
                parallel: true,
                threads: Some(3),
            },
            ..ProcessorOptions::default()
        },
    )
    .unwrap();
    assert_eq!(sequential.len(), 6);
    assert_eq!(sequential, parallel);
}

#[test]
fn zero_threads_is_rejected() {
    let doc = DocumentBuilder::new("d", 1, 1).frame(100).build().unwrap();
    let opts = ProcessorOptions {
        threading: ProcessThreading {
            parallel: true,
            threads: Some(0),
        },
        ..ProcessorOptions::default()
    };
    assert!(flatten_frames(&doc, &opts).is_err());
}

#[test]
fn thread_pool_honours_requested_size() {
    assert!(build_thread_pool(Some(0)).is_err());
    assert_eq!(build_thread_pool(Some(2)).unwrap().current_num_threads(), 2);
    assert!(build_thread_pool(None).unwrap().current_num_threads() >= 1);
}

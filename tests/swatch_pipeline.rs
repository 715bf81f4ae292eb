//! End-to-end tests: encoded image bytes in, swatch report out.

use image::{ImageFormat, Rgba, RgbaImage};
use image_swatches::swatch::paint_order;
use image_swatches::{
    swatches_from_bytes, BlendSpace, Color, ImageSwatches, PixelSampler, SwatchConfig, SwatchError,
    SwatchGenerator, SwatchMode, SwatchRender,
};
use std::io::Cursor;

fn encode(img: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).expect("encode test image");
    buf
}

/// 40×20 image split into four vertical stripes: red, green, blue, white.
fn striped_png() -> Vec<u8> {
    let stripes = [
        Rgba([255, 0, 0, 255]),
        Rgba([0, 255, 0, 255]),
        Rgba([0, 0, 255, 255]),
        Rgba([255, 255, 255, 255]),
    ];
    let img = RgbaImage::from_fn(40, 20, |x, _| stripes[(x / 10) as usize]);
    encode(&img, ImageFormat::Png)
}

fn native_config() -> SwatchConfig {
    SwatchConfig {
        canonical_width: None,
        ..SwatchConfig::default()
    }
}

// ============================================================================
// Decoding
// ============================================================================

#[test]
fn undecodable_bytes_fail_with_decode_error() {
    let err = swatches_from_bytes(b"definitely not a png", &SwatchConfig::default()).unwrap_err();
    assert!(matches!(err, SwatchError::ImageDecode(_)));
    assert!(err.is_input_error());
}

#[test]
fn decoded_png_is_normalized_to_canonical_width() {
    let mut sampler = PixelSampler::new();
    let raster = sampler.load_raster(&striped_png()).unwrap();
    assert_eq!((raster.width(), raster.height()), (1000, 500));
    assert_eq!(sampler.aspect_ratio().unwrap(), 0.5);
}

#[test]
fn jpeg_decodes_through_the_same_path() {
    let img = RgbaImage::from_pixel(16, 16, Rgba([90, 140, 200, 255]));
    let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg).unwrap();

    let mut widget = ImageSwatches::with_config(native_config());
    widget.load_bytes(&buf, "image/jpeg").unwrap();
    let report = widget.report().unwrap();
    for c in report.grid.colors() {
        assert!((c.r as i32 - 90).abs() <= 4 && (c.b as i32 - 200).abs() <= 4, "got {c}");
    }
}

// ============================================================================
// Sampling
// ============================================================================

#[test]
fn stripes_sample_in_row_major_order() {
    let config = SwatchConfig {
        resolution: 4,
        sample_size: 3,
        ..native_config()
    };
    let report = swatches_from_bytes(&striped_png(), &config).unwrap();
    assert_eq!(report.grid.len(), 16);
    let first_row: Vec<Color> = report.grid.colors()[..4].to_vec();
    assert_eq!(
        first_row,
        vec![
            Color::rgb(255, 0, 0),
            Color::rgb(0, 255, 0),
            Color::rgb(0, 0, 255),
            Color::rgb(255, 255, 255)
        ]
    );
    // Every row sees the same stripes.
    assert_eq!(&report.grid.colors()[12..], first_row.as_slice());
}

#[test]
fn oversized_sample_size_is_clamped_on_each_load() {
    let mut widget = ImageSwatches::with_config(SwatchConfig {
        resolution: 3,
        sample_size: 400,
        ..SwatchConfig::default()
    });

    widget.load_bytes(&striped_png(), "image/png").unwrap();
    // Normalized to 1000×500: floor(500 / 3) = 166.
    assert_eq!(widget.clamped_sample_size().unwrap(), 166);

    let tall = encode(&RgbaImage::from_pixel(10, 40, Rgba([5, 5, 5, 255])), ImageFormat::Png);
    widget.load_bytes(&tall, "image/png").unwrap();
    // Normalized to 1000×4000: floor(1000 / 3) = 333.
    assert_eq!(widget.clamped_sample_size().unwrap(), 333);
    assert_eq!(widget.report().unwrap().grid.sample_size(), 333);
}

#[test]
fn linear_blend_brightens_mixed_windows() {
    let img = RgbaImage::from_fn(2, 2, |x, _| if x == 0 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) });
    let bytes = encode(&img, ImageFormat::Png);

    let rgb = SwatchConfig { resolution: 1, sample_size: 2, ..native_config() };
    let linear = SwatchConfig { blend: BlendSpace::Linear, ..rgb.clone() };

    let plain = swatches_from_bytes(&bytes, &rgb).unwrap().grid.colors()[0];
    let light = swatches_from_bytes(&bytes, &linear).unwrap().grid.colors()[0];
    assert_eq!(plain.r, 128);
    assert!(light.r > plain.r);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn radial_report_orders_center_layer_first() {
    let config = SwatchConfig {
        mode: SwatchMode::RadialGradient { vanishing_point: 75.0 },
        ..native_config()
    };
    let report = swatches_from_bytes(&striped_png(), &config).unwrap();
    let SwatchRender::RadialGradient(layers) = &report.render else {
        panic!("expected radial layers, got {:?}", report.render);
    };
    assert_eq!(layers.len(), 9);
    assert!((layers[0].position.x_percent - 50.0).abs() < 1e-9);
    assert!((layers[0].position.y_percent - 50.0).abs() < 1e-9);
    assert_eq!(paint_order(9)[0], 4);
    let css = report.css.unwrap();
    assert!(css.contains(" 75%)"));
}

#[test]
fn tiles_use_raster_aspect_ratio() {
    let sampler = {
        let mut s = PixelSampler::new();
        s.load_raster(&striped_png()).unwrap();
        s
    };
    let generator = SwatchGenerator::new(&sampler);
    let grid = generator.compute_grid(2, 10).unwrap();
    let SwatchRender::Tiles(tiles) = generator.render(&grid, &SwatchMode::Tiles).unwrap() else {
        panic!("expected tiles");
    };
    assert_eq!(tiles.len(), 4);
    assert_eq!(tiles[0].width_fraction, 0.5);
    assert_eq!(tiles[0].height_fraction, 0.25);
}

#[test]
fn background_is_mean_of_grid() {
    let config = SwatchConfig { resolution: 2, ..native_config() };
    let report = swatches_from_bytes(&striped_png(), &config).unwrap();
    // Corner samples: red, white, red, white.
    assert_eq!(report.background, Some(Color::rgb(255, 128, 128)));
}

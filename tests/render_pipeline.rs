//! End-to-end: settings -> layout -> scene -> CPU raster -> encode.

use framery::{
    BackgroundKind, CpuRenderer, EditorSettings, ExportFormat, FrameSpec, FrameType, ImageOverlay,
    ImageSlot, LayoutPolicy, PreparedImage, PreparedImageStore, RenderSettings, Size, Stage,
    compose_scene, compute_layout, encode_frame,
};

fn solid_image(w: u32, h: u32, rgba: [u8; 4]) -> PreparedImage {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for _ in 0..w * h {
        data.extend_from_slice(&rgba);
    }
    PreparedImage::from_rgba8(w, h, data).unwrap()
}

fn small_settings() -> EditorSettings {
    let mut settings = EditorSettings::default();
    settings.canvas.container_width = 320.0;
    settings.canvas.container_height = 180.0;
    settings.canvas.padding = 16.0;
    settings.shadow.enabled = false;
    settings
}

fn render(settings: &EditorSettings, assets: &PreparedImageStore) -> framery::FrameRgba {
    let image = assets
        .screenshot_size()
        .unwrap_or(Size::new(1.0, 1.0));
    let layout = compute_layout(
        image,
        Size::new(
            settings.canvas.container_width,
            settings.canvas.container_height,
        ),
        Size::new(1280.0, 800.0),
        &settings.canvas,
        &settings.screenshot,
        &settings.frame,
        LayoutPolicy::Responsive,
    );
    let stage = Stage::new(compose_scene(settings, &layout, assets).unwrap());
    let mut renderer = CpuRenderer::new(RenderSettings::default());
    renderer.render(&stage, assets, 1.0).unwrap()
}

#[test]
fn renders_screenshot_over_solid_background() {
    let settings = small_settings();
    let mut assets = PreparedImageStore::new();
    assets.insert(ImageSlot::Screenshot, solid_image(16, 9, [255, 0, 0, 255]));

    let frame = render(&settings, &assets);
    assert!(frame.premultiplied);
    assert_eq!(frame.data.len(), (frame.width * frame.height * 4) as usize);

    // Center pixel is the red screenshot.
    let center =
        (((frame.height / 2) * frame.width + frame.width / 2) * 4) as usize;
    assert!(frame.data[center] > 200, "center should be red");
    assert!(frame.data[center + 2] < 64);

    // A corner pixel is the white canvas background.
    assert!(frame.data[0] > 200 && frame.data[2] > 200);
}

#[test]
fn missing_screenshot_still_renders_background_and_overlays() {
    let mut settings = small_settings();
    settings.image_overlays.push(ImageOverlay {
        id: "sticker".to_string(),
        source: "sticker.png".to_string(),
        x_px: 20.0,
        y_px: 20.0,
        size_px: 10.0,
        rotation_deg: 0.0,
        opacity: 1.0,
        flip_x: false,
        flip_y: false,
        visible: true,
    });

    let mut assets = PreparedImageStore::new();
    assets.insert(
        ImageSlot::Overlay("sticker".to_string()),
        solid_image(4, 4, [0, 0, 255, 255]),
    );

    // No screenshot slot at all: the composite must not error and the
    // other slots still draw.
    let frame = render(&settings, &assets);
    let probe = ((20 * frame.width + 20) * 4) as usize;
    assert!(frame.data[probe + 2] > 200, "overlay should render");
}

#[test]
fn gradient_background_fills_the_canvas() {
    let mut settings = small_settings();
    settings.background.kind = BackgroundKind::Gradient {
        css: "linear-gradient(to right, #000000, #ffffff)".to_string(),
    };
    let mut assets = PreparedImageStore::new();
    assets.insert(ImageSlot::Screenshot, solid_image(2, 2, [0, 255, 0, 255]));

    let frame = render(&settings, &assets);
    let y = frame.height / 2;
    let left = ((y * frame.width + 1) * 4) as usize;
    let right = ((y * frame.width + frame.width - 2) * 4) as usize;
    assert!(frame.data[left] < 64, "left edge should be dark");
    assert!(frame.data[right] > 191, "right edge should be light");
}

#[test]
fn window_frame_draws_header_above_image() {
    let mut settings = small_settings();
    settings.frame = FrameSpec {
        enabled: true,
        kind: FrameType::WindowMac,
        ..FrameSpec::default()
    };
    let mut assets = PreparedImageStore::new();
    assets.insert(ImageSlot::Screenshot, solid_image(16, 9, [255, 0, 0, 255]));

    let image = assets.screenshot_size().unwrap();
    let layout = compute_layout(
        image,
        Size::new(320.0, 180.0),
        Size::new(1280.0, 800.0),
        &settings.canvas,
        &settings.screenshot,
        &settings.frame,
        LayoutPolicy::Responsive,
    );
    let stage = Stage::new(compose_scene(&settings, &layout, &assets).unwrap());
    let mut renderer = CpuRenderer::new(RenderSettings::default());
    let frame = renderer.render(&stage, &assets, 1.0).unwrap();

    // Probe inside the title bar: light gray chrome, not the red image.
    let header_y = (layout.group_center_y - layout.framed_h / 2.0 + 10.0).round() as u32;
    let header_x = layout.group_center_x.round() as u32;
    let probe = ((header_y * frame.width + header_x) * 4) as usize;
    let (r, g, b) = (
        frame.data[probe],
        frame.data[probe + 1],
        frame.data[probe + 2],
    );
    assert!(r > 180 && g > 180 && b > 180, "header should be chrome gray, got {r},{g},{b}");
}

#[test]
fn render_is_deterministic() {
    let mut settings = small_settings();
    settings.noise.enabled = true;
    settings.noise.seed = 42;
    let mut assets = PreparedImageStore::new();
    assets.insert(ImageSlot::Screenshot, solid_image(16, 9, [10, 120, 240, 255]));

    let a = render(&settings, &assets);
    let b = render(&settings, &assets);
    assert_eq!(a.data, b.data);
}

#[test]
fn export_scale_multiplies_pixel_dimensions() {
    let settings = small_settings();
    let mut assets = PreparedImageStore::new();
    assets.insert(ImageSlot::Screenshot, solid_image(16, 9, [255, 0, 0, 255]));

    let image = assets.screenshot_size().unwrap();
    let layout = compute_layout(
        image,
        Size::new(320.0, 180.0),
        Size::new(1280.0, 800.0),
        &settings.canvas,
        &settings.screenshot,
        &settings.frame,
        LayoutPolicy::Responsive,
    );
    let stage = Stage::new(compose_scene(&settings, &layout, &assets).unwrap());
    let mut renderer = CpuRenderer::new(RenderSettings::default());

    let one = renderer.render(&stage, &assets, 1.0).unwrap();
    let two = renderer.render(&stage, &assets, 2.0).unwrap();
    assert_eq!(two.width, one.width * 2);
    assert_eq!(two.height, one.height * 2);

    let png = encode_frame(&two, ExportFormat::Png).unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!(decoded.width(), two.width);
}

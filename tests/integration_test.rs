use easy_qr::{
    decode_data_url, encode_png_data_url, ColorOptions, Downloader, FileDownloader, LogoOptions,
    QrCodeGenerator, QrError, RenderOptions, PNG_DATA_URL_PREFIX,
};
use image::{GenericImageView, Rgba, RgbaImage};
use std::fs;
use tempfile::TempDir;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn red_logo_data_url() -> String {
    encode_png_data_url(&RgbaImage::from_pixel(16, 16, RED)).expect("Failed to encode logo")
}

fn decode_png(data_url: &str) -> RgbaImage {
    let bytes = decode_data_url(data_url).expect("Failed to decode data URL");
    assert!(!bytes.is_empty());
    image::load_from_memory(&bytes)
        .expect("Output is not a decodable image")
        .to_rgba8()
}

#[test]
fn test_plain_qr_end_to_end() {
    let generator = QrCodeGenerator::new().expect("Failed to create generator");
    let options = RenderOptions {
        size: 300,
        margin: 1,
        color: ColorOptions {
            dark: "#000000ff".into(),
            light: "#ffffffff".into(),
        },
        ..Default::default()
    };

    let data_url = generator
        .generate_qr_code("https://example.com", &options)
        .expect("Generation failed");
    assert!(data_url.starts_with(PNG_DATA_URL_PREFIX));

    let image = decode_png(&data_url);
    assert_eq!(image.dimensions(), (300, 300));
    assert!(image.pixels().all(|p| p[3] == 255));

    let modules = qrcode::QrCode::with_error_correction_level(
        b"https://example.com",
        qrcode::EcLevel::M,
    )
    .unwrap()
    .width();
    let border = (300.0 / (modules as f64 + 2.0)).floor() as u32;
    assert!(border > 0);
    for i in 0..300 {
        for m in 0..border {
            assert_eq!(image.get_pixel(i, m), &WHITE);
            assert_eq!(image.get_pixel(m, i), &WHITE);
            assert_eq!(image.get_pixel(i, 299 - m), &WHITE);
            assert_eq!(image.get_pixel(299 - m, i), &WHITE);
        }
    }
    assert!(image.pixels().any(|p| p == &Rgba([0, 0, 0, 255])));
}

#[test]
fn test_output_is_deterministic() {
    let generator = QrCodeGenerator::new().expect("Failed to create generator");
    let mut logo = LogoOptions::new(red_logo_data_url());
    logo.background_color = "#ffffff".into();
    logo.radius = 8.0;
    let options = RenderOptions::default().with_logo(logo);

    let first = generator
        .generate_qr_code("https://example.com/page", &options)
        .unwrap();
    let second = generator
        .generate_qr_code("https://example.com/page", &options)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_background_is_opaque_and_logo_is_blended() {
    let generator = QrCodeGenerator::new().expect("Failed to create generator");
    let mut logo = LogoOptions::new(red_logo_data_url());
    logo.background_color = "#ffffff".into();
    logo.opacity = 0.5;
    let options = RenderOptions::default().with_logo(logo);

    let image = decode_png(
        &generator
            .generate_qr_code("https://example.com", &options)
            .unwrap(),
    );
    assert_eq!(image.dimensions(), (300, 300));

    // Logo spans 120..180, its background 115..185.
    assert_eq!(image.get_pixel(117, 150), &WHITE);
    assert_eq!(image.get_pixel(150, 182), &WHITE);

    let blended = image.get_pixel(150, 150);
    assert_eq!(blended[0], 255);
    assert!((127..=128).contains(&blended[1]), "{:?}", blended);
    assert!((127..=128).contains(&blended[2]), "{:?}", blended);
    assert_eq!(blended[3], 255);
}

#[test]
fn test_logo_from_local_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logo_path = temp_dir.path().join("logo.png");
    RgbaImage::from_pixel(10, 10, RED)
        .save(&logo_path)
        .expect("Failed to write logo");

    let generator = QrCodeGenerator::new().expect("Failed to create generator");
    let mut logo = LogoOptions::new(logo_path.to_str().unwrap());
    logo.width = Some(70.0);
    logo.height = Some(70.0);
    let options = RenderOptions::default().with_logo(logo);

    let image = generator
        .generate_image("https://example.com", &options)
        .unwrap();
    assert_eq!(image.get_pixel(150, 150), &RED);
    assert_eq!(image.get_pixel(116, 116), &RED);
}

#[test]
fn test_unreachable_logo_fails() {
    let generator = QrCodeGenerator::new().expect("Failed to create generator");
    let options =
        RenderOptions::default().with_logo(LogoOptions::new("https://nonexistent.invalid/x.png"));

    let err = generator
        .generate_qr_code("https://example.com", &options)
        .unwrap_err();
    assert!(matches!(err, QrError::ImageLoad { .. }), "{err:?}");
}

#[test]
fn test_invalid_url_fails() {
    let generator = QrCodeGenerator::new().expect("Failed to create generator");
    for url in ["not a url", "", "ftp:/broken"] {
        let err = generator
            .generate_qr_code(url, &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, QrError::InvalidInput(_)), "{url:?}");
    }
}

#[test]
fn test_file_downloader_saves_png() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let generator = QrCodeGenerator::new().expect("Failed to create generator");
    let data_url = generator
        .generate_qr_code("https://example.com", &RenderOptions::default())
        .unwrap();

    FileDownloader::new(temp_dir.path().join("out"))
        .download(&data_url, "qr-code.png")
        .expect("Download failed");

    let saved = temp_dir.path().join("out").join("qr-code.png");
    assert!(fs::metadata(&saved).unwrap().len() > 0);
    let image = image::open(&saved).expect("Saved file is not an image");
    assert_eq!(image.dimensions(), (300, 300));
}

#[test]
#[cfg(feature = "cli")]
fn test_config_file_options() {
    let options: RenderOptions = toml::from_str(
        r##"
        size = 400
        margin = 2
        error_correction = "Q"

        [color]
        dark = "#112233"

        [logo]
        path = "assets/logo.png"
        opacity = 0.8
        "##,
    )
    .expect("Config should parse");

    assert_eq!(options.size, 400);
    assert_eq!(options.margin, 2);
    assert_eq!(options.color.dark, "#112233");
    assert_eq!(options.color.light, "#ffffff");
    let logo = options.logo.expect("logo table");
    assert_eq!(logo.source, easy_qr::LogoSource::from("assets/logo.png"));
    assert_eq!(logo.opacity, 0.8);
    assert_eq!(logo.margin, 5.0);
    assert_eq!(logo.background_color, "transparent");
}

#[test]
#[cfg(feature = "cli")]
fn test_config_rejects_both_logo_aliases() {
    let result: Result<RenderOptions, _> = toml::from_str(
        r#"
        [logo]
        source = "a.png"
        path = "b.png"
        "#,
    );
    assert!(result.is_err());
}

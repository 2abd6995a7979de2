use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use easy_qr::{
    Downloader, ErrorCorrection, FileDownloader, LogoOptions, QrCodeGenerator, RenderOptions,
};

#[derive(Parser)]
#[command(name = "easy-qr")]
#[command(author, version, about = "Generate a QR code image for a URL, optionally with a logo", long_about = None)]
struct Cli {
    /// URL to encode
    url: String,

    /// Output PNG file
    #[arg(short, long, default_value = "qr-code.png")]
    output: PathBuf,

    /// Print the PNG data URL to stdout instead of writing a file
    #[arg(long)]
    data_url: bool,

    /// TOML file with render options; flags given on the command line win
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Side of the square image in pixels (default: 300)
    #[arg(short, long)]
    size: Option<u32>,

    /// Quiet zone in modules (default: 4)
    #[arg(short, long)]
    margin: Option<u32>,

    /// Color of dark modules (default: #000000)
    #[arg(long)]
    dark: Option<String>,

    /// Color of light modules (default: #ffffff)
    #[arg(long)]
    light: Option<String>,

    /// Error correction level (default: M, or H with a logo)
    #[arg(short, long, value_enum)]
    error_correction: Option<ErrorCorrection>,

    /// Logo to place in the middle: a URL, data URL or local path
    #[arg(short, long)]
    logo: Option<String>,

    #[arg(long)]
    logo_width: Option<f32>,

    #[arg(long)]
    logo_height: Option<f32>,

    /// Padding between the logo and its background (default: 5)
    #[arg(long)]
    logo_margin: Option<f32>,

    /// Background behind the logo (default: transparent)
    #[arg(long)]
    logo_background: Option<String>,

    /// Logo opacity between 0 and 1 (default: 1)
    #[arg(long)]
    logo_opacity: Option<f32>,

    /// Corner radius of the logo and its background (default: 0)
    #[arg(long)]
    logo_radius: Option<f32>,

    /// Log generation details to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn render_options(&self) -> Result<RenderOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => RenderOptions::default(),
        };

        if let Some(size) = self.size {
            options.size = size;
        }
        if let Some(margin) = self.margin {
            options.margin = margin;
        }
        if let Some(dark) = &self.dark {
            options.color.dark = dark.clone();
        }
        if let Some(light) = &self.light {
            options.color.light = light.clone();
        }
        if self.error_correction.is_some() {
            options.error_correction = self.error_correction;
        }

        if let Some(source) = &self.logo {
            options.logo = Some(LogoOptions::new(source.as_str()));
        }
        if let Some(logo) = options.logo.as_mut() {
            if self.logo_width.is_some() {
                logo.width = self.logo_width;
            }
            if self.logo_height.is_some() {
                logo.height = self.logo_height;
            }
            if let Some(margin) = self.logo_margin {
                logo.margin = margin;
            }
            if let Some(color) = &self.logo_background {
                logo.background_color = color.clone();
            }
            if let Some(opacity) = self.logo_opacity {
                logo.opacity = opacity;
            }
            if let Some(radius) = self.logo_radius {
                logo.radius = radius;
            }
        }

        Ok(options)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let options = args.render_options()?;
    let generator = QrCodeGenerator::new()?;
    let data_url = generator
        .generate_qr_code(&args.url, &options)
        .context("Failed to generate QR code")?;

    if args.data_url {
        println!("{}", data_url);
        return Ok(());
    }

    let dir = match args.output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let filename = args
        .output
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid output filename")?;

    FileDownloader::new(dir)
        .download(&data_url, filename)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    println!("QR code saved to {}", args.output.display());
    Ok(())
}

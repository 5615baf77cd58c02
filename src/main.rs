use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use pdf_page_render::{
    BackgroundColor, CompressFormat, CropRect, Document, PageRenderer, RenderConfig, RenderRequest,
};
use rayon::iter::IntoParallelRefIterator;
use rayon::iter::ParallelIterator;
use walkdir::WalkDir;

/// Render PDF pages to JPEG or PNG images.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// A PDF file, or a directory searched recursively for PDF files.
    input: PathBuf,
    /// Where the images are written, as `<stem>-<page>.<ext>`.
    out_dir: PathBuf,
    /// Only render this 1-based page.
    #[arg(long)]
    page: Option<u32>,
    /// Canvas width before scaling. Defaults to the page width.
    #[arg(long)]
    width: Option<f64>,
    /// Canvas height before scaling. Defaults to the page height.
    #[arg(long)]
    height: Option<f64>,
    /// Pixels per page unit. Multiplies the canvas size and the page content.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,
    /// Move page point X,Y to the top-left corner of the canvas.
    #[arg(long, value_parser = parse_offset, conflicts_with = "crop")]
    offset: Option<(f64, f64)>,
    /// Cut X,Y,W,H (in output pixels) out of the rendered canvas.
    #[arg(long, value_parser = parse_crop)]
    crop: Option<CropRect>,
    /// `jpeg` or `png`.
    #[arg(long, default_value = "jpeg", value_parser = parse_format)]
    format: CompressFormat,
    /// `#RRGGBB` or `#AARRGGBB`.
    #[arg(long, default_value = "#FFFFFF")]
    background: BackgroundColor,
    /// Overrides PDF_PAGE_RENDER_JPEG_QUALITY.
    #[arg(long)]
    jpeg_quality: Option<u8>,
}

impl Args {
    fn request(&self, page_width: u32, page_height: u32) -> RenderRequest {
        let mut request = RenderRequest::new(
            self.width.unwrap_or(page_width as f64),
            self.height.unwrap_or(page_height as f64),
        )
        .with_scale(self.scale)
        .with_format(self.format)
        .with_background(self.background);

        if let Some((x, y)) = self.offset {
            request = request.with_offset(x, y);
        }
        if let Some(crop) = self.crop {
            request = request.with_crop(crop);
        }

        request
    }

    fn config(&self) -> RenderConfig {
        let config = RenderConfig::from_env();
        match self.jpeg_quality {
            Some(quality) => config.with_jpeg_quality(quality),
            None => config,
        }
    }
}

fn parse_numbers(s: &str, count: usize) -> Result<Vec<f64>, String> {
    let numbers = s
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|e| format!("{part:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;

    if numbers.len() != count {
        return Err(format!("expected {count} comma-separated numbers"));
    }

    Ok(numbers)
}

fn parse_offset(s: &str) -> Result<(f64, f64), String> {
    let n = parse_numbers(s, 2)?;
    Ok((n[0], n[1]))
}

fn parse_crop(s: &str) -> Result<CropRect, String> {
    let n = parse_numbers(s, 4)?;
    if n.iter().any(|v| *v < 0.0 || v.fract() != 0.0 || *v > u32::MAX as f64) {
        return Err("crop values must be non-negative integers".to_string());
    }
    Ok(CropRect::new(n[0] as u32, n[1] as u32, n[2] as u32, n[3] as u32))
}

fn parse_format(s: &str) -> Result<CompressFormat, String> {
    match s.to_ascii_lowercase().as_str() {
        "jpeg" | "jpg" | "0" => Ok(CompressFormat::Jpeg),
        "png" | "1" => Ok(CompressFormat::Png),
        other => Err(format!("unknown format {other:?}")),
    }
}

/// Render the selected pages of one file. Returns the number of failed pages.
fn render_file(args: &Args, renderer: &PageRenderer, pdf_path: &Path) -> usize {
    let document = match Document::open(pdf_path) {
        Ok(document) => document,
        Err(e) => {
            log::error!("skipping {}: {}", pdf_path.display(), e);
            return 1;
        }
    };

    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    let numbers: Vec<u32> = match args.page {
        Some(number) => vec![number],
        None => (1..=document.page_count() as u32).collect(),
    };

    let mut failures = 0;
    for number in numbers {
        let page = match document.page(number) {
            Ok(page) => page,
            Err(e) => {
                log::error!("{}: {}", pdf_path.display(), e);
                failures += 1;
                continue;
            }
        };

        log::info!("rendering {} page {}", pdf_path.display(), number);
        let request = args.request(page.width(), page.height());
        let Some(rendered) = renderer.render_or_none(&page, &request) else {
            failures += 1;
            continue;
        };

        let out_path = args
            .out_dir
            .join(format!("{}-{}.{}", stem, number, rendered.format.extension()));
        if let Err(e) = rendered.save(&out_path) {
            log::error!("failed to write {}: {}", out_path.display(), e);
            failures += 1;
        }
    }

    failures
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let files: Vec<PathBuf> = if args.input.is_dir() {
        WalkDir::new(&args.input)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_type().is_file() && e.file_name().to_string_lossy().ends_with(".pdf")
            })
            .map(|e| e.into_path())
            .collect()
    } else {
        vec![args.input.clone()]
    };

    if let Err(e) = std::fs::create_dir_all(&args.out_dir) {
        log::error!("failed to create {}: {}", args.out_dir.display(), e);
        return ExitCode::FAILURE;
    }

    let renderer = PageRenderer::new(args.config());
    let failures: usize = files
        .par_iter()
        .map(|pdf_path| render_file(&args, &renderer, pdf_path))
        .sum();

    if failures > 0 {
        log::error!("{} page(s) failed to render", failures);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

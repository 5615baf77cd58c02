use std::path::Path;

use hayro_interpret::{interpret_page, ClipPath, Context, Device, FillRule, InterpreterSettings};
use kurbo::{Affine, Rect, Shape};
use tiny_skia::{IntRect, Pixmap};

use crate::config::RenderConfig;
use crate::device::CanvasDevice;
use crate::encode::encode;
use crate::error::{Error, Result};
use crate::page::Page;
use crate::request::{Adjustment, CompressFormat, CropRect, RenderRequest};

/// Canvases above this many pixels are refused instead of allocated.
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// An encoded page image. `width` and `height` always match the dimensions
/// stored in `data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Encoding of `data`.
    pub format: CompressFormat,
    /// JPEG or PNG bytes.
    pub data: Vec<u8>,
}

impl RenderedPage {
    /// Write the encoded bytes to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), &self.data)?;
        Ok(())
    }
}

/// Renders pages into encoded images. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRenderer {
    config: RenderConfig,
}

impl PageRenderer {
    /// Create a renderer with the given encoder settings.
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// The encoder settings in use.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `page` as described by `request`.
    ///
    /// The page is painted over the background at `request.scale`, shifted
    /// by the offset if there is one, cut down to the crop rectangle if there
    /// is one, and encoded. A crop that is not fully inside the canvas is an
    /// error; nothing is clipped.
    pub fn render(&self, page: &Page, request: &RenderRequest) -> Result<RenderedPage> {
        let (width, height) = request.canvas_size()?;
        log::debug!(
            "rendering page {} of {} onto {}x{} canvas ({:?}, {})",
            page.number(),
            page.document_id(),
            width,
            height,
            request.adjustment,
            request.format
        );

        let mut canvas = allocate_canvas(width, height)?;
        canvas.fill(request.background.flattened());
        let canvas = rasterize(page, request, canvas)?;

        let canvas = match request.adjustment {
            Adjustment::Crop(crop) => crop_canvas(&canvas, crop)?,
            _ => canvas,
        };

        let data = encode(&canvas, request.format, self.config.jpeg_quality)?;
        check_encoded_size(&data, request.format, canvas.width(), canvas.height())?;

        Ok(RenderedPage {
            width: canvas.width(),
            height: canvas.height(),
            format: request.format,
            data,
        })
    }

    /// Like [`render`](Self::render), but logs the failure and returns `None`
    /// instead of an error. Never returns a partial image.
    pub fn render_or_none(&self, page: &Page, request: &RenderRequest) -> Option<RenderedPage> {
        match self.render(page, request) {
            Ok(rendered) => Some(rendered),
            Err(e) => {
                log::error!(
                    "failed to render page {} of document {}: {}",
                    page.number(),
                    page.document_id(),
                    e
                );
                None
            }
        }
    }
}

fn allocate_canvas(width: u32, height: u32) -> Result<Pixmap> {
    if width as u64 * height as u64 > MAX_CANVAS_PIXELS {
        return Err(Error::CanvasAllocation { width, height });
    }
    Pixmap::new(width, height).ok_or(Error::CanvasAllocation { width, height })
}

/// The mapping from PDF user space onto the canvas: media box top-left at
/// the origin, y pointing down, `scale` pixels per unit, and the page point
/// `(x, y)` (from the top-left) moved onto the canvas origin.
///
/// `/Rotate` is not applied; pages are laid out in media box space.
pub(crate) fn page_transform(media_box: Rect, scale: f64, x: f64, y: f64) -> Affine {
    Affine::new([
        scale,
        0.0,
        0.0,
        -scale,
        -scale * (media_box.min_x() + x),
        scale * (media_box.max_y() - y),
    ])
}

/// Paint the page onto `canvas`: white paper over the visible (crop) box,
/// then the page contents clipped to it. Only the canvas is rasterized.
fn rasterize(page: &Page, request: &RenderRequest, canvas: Pixmap) -> Result<Pixmap> {
    let pdf_page = page
        .pdf()
        .pages()
        .get(page.index())
        .ok_or_else(|| Error::Rasterize(format!("page {} is missing", page.number())))?;

    let (x, y) = match request.adjustment {
        Adjustment::Offset { x, y } => (x, y),
        _ => (0.0, 0.0),
    };
    let transform = page_transform(pdf_page.media_box(), request.scale, x, y);
    let viewport = Rect::new(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
    let paper = transform * pdf_page.intersected_crop_box().to_path(0.1);

    let mut context = Context::new(
        transform,
        viewport,
        pdf_page.xref(),
        InterpreterSettings::default(),
    );
    let mut device = CanvasDevice::new(canvas);
    let clip = ClipPath {
        path: paper,
        fill: FillRule::NonZero,
    };

    device.push_clip_path(&clip);
    device.fill_paper(&clip.path);
    interpret_page(pdf_page, &mut context, &mut device);
    device.pop_clip_path();

    Ok(device.finish())
}

fn crop_canvas(canvas: &Pixmap, crop: CropRect) -> Result<Pixmap> {
    let out_of_bounds = || Error::CropOutOfBounds {
        crop,
        width: canvas.width(),
        height: canvas.height(),
    };

    if !crop.fits_within(canvas.width(), canvas.height()) {
        return Err(out_of_bounds());
    }

    let x = i32::try_from(crop.x).map_err(|_| out_of_bounds())?;
    let y = i32::try_from(crop.y).map_err(|_| out_of_bounds())?;
    let rect = IntRect::from_xywh(x, y, crop.width, crop.height).ok_or_else(out_of_bounds)?;

    canvas.clone_rect(rect).ok_or_else(out_of_bounds)
}

fn check_encoded_size(data: &[u8], format: CompressFormat, width: u32, height: u32) -> Result<()> {
    let size = imagesize::blob_size(data).map_err(|e| Error::Encoding {
        format,
        reason: format!("unreadable header: {:?}", e),
    })?;

    if size.width != width as usize || size.height != height as usize {
        return Err(Error::Encoding {
            format,
            reason: format!(
                "encoded image is {}x{}, expected {}x{}",
                size.width, size.height, width, height
            ),
        });
    }

    Ok(())
}

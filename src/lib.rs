/*!
# Motivation
This crate renders a single page of an opened PDF document into a JPEG or PNG image at a
caller-chosen size. It is the page-rendering half of a PDF viewer plugin: a host layer opens a
document, asks for a page handle, and then requests images of that page, for example a
thumbnail, a full-resolution tile at some scale factor, or a sub-region of the page.

PDF interpretation is done by [hayro-interpret](https://docs.rs/hayro-interpret), a pure-Rust PDF
interpreter, whose drawing commands land on a [tiny-skia](https://docs.rs/tiny-skia) canvas. Only
the requested canvas is ever rasterized, however large the scale factor: a small tile of a page
at a high zoom costs as much as the tile, not as much as the zoomed page.

# Usage
```no_run
use pdf_page_render::{CompressFormat, CropRect, Document, RenderRequest};

let document = Document::open("file.pdf")?;
let page = document.page(1)?;

// The whole page at twice its intrinsic size.
let request = RenderRequest::new(page.width() as f64, page.height() as f64)
    .with_scale(2.0)
    .with_format(CompressFormat::Png);
let image = page.render(&request)?;
image.save("page-1.png")?;

// Only the top-left quarter.
let request = request.with_crop(CropRect::new(0, 0, page.width(), page.height()));
let quarter = page.render(&request)?;
assert_eq!((quarter.width, quarter.height), (page.width(), page.height()));
# Ok::<(), pdf_page_render::Error>(())
```

# Coordinates
PDF page space has its origin at the bottom-left, image space at the top-left. The page is
flipped into image space and scaled by the request's scale factor. Everything is measured in
the page's media box: its top-left corner is the canvas origin, the page's `/Rotate` entry is
not applied, and content outside the crop box is not drawn (the background shows there
instead). An offset `(x, y)` moves
the page point `x` units from the left and `y` units from the top onto the canvas origin; a
crop rectangle is given in output pixels after scaling.

# Output
The canvas is always fully opaque: the background color is flattened over white before it is
painted, and the page itself is drawn on white paper. PNG output therefore always has an alpha
of 255, and JPEG and PNG renders of the same request show the same picture.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod color;
mod config;
mod device;
mod document;
mod encode;
mod error;
mod page;
mod renderer;
mod request;

pub use color::BackgroundColor;
pub use config::{RenderConfig, JPEG_QUALITY_VAR};
pub use document::Document;
pub use error::{Error, Result};
pub use page::{Page, PageInfo};
pub use renderer::{PageRenderer, RenderedPage, MAX_CANVAS_PIXELS};
pub use request::{Adjustment, CompressFormat, CropRect, RenderParams, RenderRequest};

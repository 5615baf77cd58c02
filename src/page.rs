use std::sync::Arc;

use hayro_interpret::Pdf;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::renderer::{PageRenderer, RenderedPage};
use crate::request::RenderRequest;

/// Page metadata in the flat shape a host layer marshals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Owning document.
    pub document_id: String,
    /// This page handle.
    pub id: String,
    /// 1-based page number.
    pub page_number: i32,
    /// Media box width in points.
    pub width: i32,
    /// Media box height in points.
    pub height: i32,
}

/// A handle to one page of an opened document. Never mutated after
/// construction.
pub struct Page {
    id: String,
    document_id: String,
    number: u32,
    media_width: f64,
    media_height: f64,
    pdf: Arc<Pdf>,
}

impl Page {
    pub(crate) fn new(id: String, document_id: String, pdf: Arc<Pdf>, number: u32) -> Result<Self> {
        let count = pdf.pages().len();
        let page = (number as usize)
            .checked_sub(1)
            .and_then(|index| pdf.pages().get(index))
            .ok_or(Error::PageNotFound { number, count })?;

        let media_box = page.media_box();
        let media_width = (media_box.x1 - media_box.x0).abs() as f64;
        let media_height = (media_box.y1 - media_box.y0).abs() as f64;

        Ok(Self {
            id,
            document_id,
            number,
            media_width,
            media_height,
            pdf,
        })
    }

    /// The handle's identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The owning document's identifier.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// 1-based page number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Media box width, truncated to whole points.
    pub fn width(&self) -> u32 {
        self.media_width as u32
    }

    /// Media box height, truncated to whole points.
    pub fn height(&self) -> u32 {
        self.media_height as u32
    }

    /// Metadata record for this page.
    pub fn info(&self) -> PageInfo {
        let to_i32 = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);

        PageInfo {
            document_id: self.document_id.clone(),
            id: self.id.clone(),
            page_number: to_i32(self.number),
            width: to_i32(self.width()),
            height: to_i32(self.height()),
        }
    }

    /// Render with a default-configured [`PageRenderer`].
    pub fn render(&self, request: &RenderRequest) -> Result<RenderedPage> {
        PageRenderer::default().render(self, request)
    }

    pub(crate) fn pdf(&self) -> &Pdf {
        &self.pdf
    }

    pub(crate) fn index(&self) -> usize {
        self.number as usize - 1
    }
}

use std::path::Path;
use std::sync::Arc;

use hayro_interpret::Pdf;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::page::Page;

/// An opened PDF document that hands out page handles.
pub struct Document {
    id: String,
    pdf: Arc<Pdf>,
}

impl Document {
    /// Parse a PDF held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let pdf = Pdf::new(Arc::new(data)).map_err(|e| Error::Parse(format!("{:?}", e)))?;
        let id = Uuid::new_v4().to_string();
        log::debug!("opened document {} with {} pages", id, pdf.pages().len());

        Ok(Self {
            id,
            pdf: Arc::new(pdf),
        })
    }

    /// Read and parse a PDF file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    /// The identifier assigned when the document was opened.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pdf.pages().len()
    }

    /// Get the page with the given 1-based number.
    pub fn page(&self, number: u32) -> Result<Page> {
        Page::new(
            Uuid::new_v4().to_string(),
            self.id.clone(),
            Arc::clone(&self.pdf),
            number,
        )
    }
}

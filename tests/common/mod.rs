//! In-memory PDF fixtures.

#![allow(dead_code)]

use pdf_page_render::{Document, Page};

/// A filled rectangle in PDF page space: `(x, y, width, height)`, origin
/// bottom-left, painted in an RGB color with components in `0.0..=1.0`.
#[derive(Clone)]
pub struct Fill {
    pub rect: (f64, f64, f64, f64),
    pub rgb: (f64, f64, f64),
}

pub fn black(x: f64, y: f64, width: f64, height: f64) -> Fill {
    Fill {
        rect: (x, y, width, height),
        rgb: (0.0, 0.0, 0.0),
    }
}

/// One page of a fixture document.
pub struct PageDef {
    pub media_box: [f64; 4],
    pub crop_box: Option<[f64; 4]>,
    pub rotate: Option<i32>,
    pub fills: Vec<Fill>,
}

impl PageDef {
    pub fn new(width: f64, height: f64, fills: Vec<Fill>) -> Self {
        Self {
            media_box: [0.0, 0.0, width, height],
            crop_box: None,
            rotate: None,
            fills,
        }
    }

    pub fn crop_box(mut self, crop_box: [f64; 4]) -> Self {
        self.crop_box = Some(crop_box);
        self
    }

    pub fn rotate(mut self, degrees: i32) -> Self {
        self.rotate = Some(degrees);
        self
    }
}

fn pdf_rect(r: &[f64; 4]) -> String {
    format!("[{} {} {} {}]", r[0], r[1], r[2], r[3])
}

/// Build a PDF with one page per entry, each `(width, height, fills)`.
pub fn build_pdf(pages: &[(f64, f64, Vec<Fill>)]) -> Vec<u8> {
    let pages: Vec<PageDef> = pages
        .iter()
        .map(|(width, height, fills)| PageDef::new(*width, *height, fills.clone()))
        .collect();
    build_pdf_pages(&pages)
}

pub fn build_pdf_pages(pages: &[PageDef]) -> Vec<u8> {
    let page_count = pages.len();
    // 1: catalog, 2: pages, then a (page, contents) pair per page.
    let page_id = |i: usize| 3 + 2 * i;

    let mut objects: Vec<String> = Vec::new();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids = (0..page_count)
        .map(|i| format!("{} 0 R", page_id(i)))
        .collect::<Vec<_>>()
        .join(" ");
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids, page_count
    ));

    for (i, page) in pages.iter().enumerate() {
        let content = page
            .fills
            .iter()
            .map(|f| {
                format!(
                    "{} {} {} rg {} {} {} {} re f",
                    f.rgb.0, f.rgb.1, f.rgb.2, f.rect.0, f.rect.1, f.rect.2, f.rect.3
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut extra = String::new();
        if let Some(crop_box) = &page.crop_box {
            extra.push_str(&format!(" /CropBox {}", pdf_rect(crop_box)));
        }
        if let Some(rotate) = page.rotate {
            extra.push_str(&format!(" /Rotate {}", rotate));
        }
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox {}{} /Resources << >> /Contents {} 0 R >>",
            pdf_rect(&page.media_box),
            extra,
            page_id(i) + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );

    out
}

/// A 200x100 page with a black box covering page-space x 20..80, y 40..80,
/// which is image-space x 20..80, y 20..60 at scale 1.
pub fn boxed_page_pdf() -> Vec<u8> {
    build_pdf(&[(200.0, 100.0, vec![black(20.0, 40.0, 60.0, 40.0)])])
}

pub fn boxed_page() -> Page {
    Document::from_bytes(boxed_page_pdf())
        .unwrap()
        .page(1)
        .unwrap()
}

pub fn single_page(def: PageDef) -> Page {
    Document::from_bytes(build_pdf_pages(&[def]))
        .unwrap()
        .page(1)
        .unwrap()
}

pub fn rgba_at(data: &[u8], x: u32, y: u32) -> [u8; 4] {
    image::load_from_memory(data)
        .unwrap()
        .into_rgba8()
        .get_pixel(x, y)
        .0
}

pub fn is_dark(pixel: [u8; 4]) -> bool {
    pixel[..3].iter().all(|c| *c < 60)
}

pub fn is_light(pixel: [u8; 4]) -> bool {
    pixel[..3].iter().all(|c| *c > 195)
}

mod layout;
mod raster;

pub use layout::{DocumentLayout, Line};

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Local;
use printpdf::{
    ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};
use thiserror::Error;

use crate::models::InvoiceRecord;

/// Logical page width the bitmap is scaled to, in mm.
const PAGE_WIDTH_MM: f32 = 210.0;
/// Vertical band of the scaled bitmap covered by one page, in mm.
const PAGE_HEIGHT_MM: f32 = 295.0;
/// Physical A4 portrait page height, in mm.
const A4_HEIGHT_MM: f32 = 297.0;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("nothing to render")]
    EmptyLayout,
    #[error("failed to assemble PDF: {0}")]
    Pdf(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Service for exporting a submitted invoice record as a paginated PDF.
pub struct InvoiceGenerator {
    output_dir: PathBuf,
}

impl InvoiceGenerator {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = output_dir.as_ref().to_path_buf();
        if !path.exists() {
            fs::create_dir_all(&path)?;
        }
        Ok(Self { output_dir: path })
    }

    /// Fixed prefix plus the literal invoice name, with no sanitization of
    /// filesystem-unsafe characters (accepted limitation, pass-through from
    /// user text).
    pub fn output_path(&self, record: &InvoiceRecord) -> PathBuf {
        self.output_dir
            .join(format!("bug-bounty-invoice-{}.pdf", record.invoice_name))
    }

    /// Render the record, rasterize it, slice the bitmap into A4 pages and
    /// save the result. The file is only written once the whole document has
    /// been assembled, so a failure leaves nothing behind.
    pub fn export(&self, record: &InvoiceRecord) -> Result<PathBuf, ExportError> {
        let layout = DocumentLayout::compose(record, Local::now().date_naive());
        let bitmap = raster::rasterize(&layout)?;
        let (width_px, height_px) = bitmap.dimensions();
        let scaled_height = height_px as f32 * PAGE_WIDTH_MM / width_px as f32;
        let pixels = bitmap.into_raw();

        let (doc, first_page, first_layer) = PdfDocument::new(
            "Bug Bounty Invoice",
            Mm(PAGE_WIDTH_MM),
            Mm(A4_HEIGHT_MM),
            "Layer 1",
        );
        let dpi = width_px as f32 / (PAGE_WIDTH_MM / 25.4);

        for (index, offset) in page_offsets(scaled_height).into_iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");
                doc.get_page(page).get_layer(layer)
            };

            // The same full bitmap goes on every page; the offset shifts it up
            // so the next page-height band is the visible slice.
            let image = Image::from(ImageXObject {
                width: Px(width_px as usize),
                height: Px(height_px as usize),
                color_space: ColorSpace::Rgb,
                bits_per_component: ColorBits::Bit8,
                interpolate: false,
                image_data: pixels.clone(),
                image_filter: None,
                clipping_bbox: None,
                smask: None,
            });
            image.add_to_layer(
                layer,
                ImageTransform {
                    translate_x: Some(Mm(0.0)),
                    translate_y: Some(Mm(A4_HEIGHT_MM - offset - scaled_height)),
                    dpi: Some(dpi),
                    ..Default::default()
                },
            );
        }

        let mut buffer = BufWriter::new(Vec::new());
        doc.save(&mut buffer)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let bytes = buffer
            .into_inner()
            .map_err(|e| ExportError::Pdf(e.to_string()))?;

        let path = self.output_path(record);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Top-edge offsets, in mm from the top of each page, at which the full bitmap
/// is placed. Page 1 sits at offset 0; each following page shifts the bitmap
/// up by one more page height. The remaining height strictly decreases by a
/// page height per iteration, so this yields ceil(scaled_height / page_height)
/// pages, and a bitmap that fits within one page height yields exactly one.
fn page_offsets(scaled_height: f32) -> Vec<f32> {
    let mut offsets = vec![0.0];
    let mut remaining = scaled_height - PAGE_HEIGHT_MM;
    while remaining > 0.0 {
        offsets.push(remaining - scaled_height);
        remaining -= PAGE_HEIGHT_MM;
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bitmap_yields_one_page() {
        assert_eq!(page_offsets(100.0).len(), 1);
        assert_eq!(page_offsets(PAGE_HEIGHT_MM).len(), 1);
    }

    #[test]
    fn page_count_is_ceiling_of_height_ratio() {
        // 2.5 page heights must come out as 3 pages.
        let offsets = page_offsets(PAGE_HEIGHT_MM * 2.5);
        assert_eq!(offsets.len(), 3);
    }

    #[test]
    fn offsets_step_up_by_one_page_height() {
        let offsets = page_offsets(PAGE_HEIGHT_MM * 2.5);
        assert_eq!(offsets[0], 0.0);
        assert_eq!(offsets[1], -PAGE_HEIGHT_MM);
        assert_eq!(offsets[2], -2.0 * PAGE_HEIGHT_MM);
    }

    #[test]
    fn filename_passes_invoice_name_through_unmodified() {
        let generator = InvoiceGenerator::new(".").unwrap();
        let mut record = InvoiceRecord::new();
        record.invoice_name = "INV-2024-001 #final".to_string();

        let path = generator.output_path(&record);
        assert!(
            path.to_string_lossy()
                .ends_with("bug-bounty-invoice-INV-2024-001 #final.pdf")
        );
    }

    #[test]
    fn export_writes_a_pdf_file() {
        let dir = std::env::temp_dir().join("bug_bounty_invoice_export_test");
        let generator = InvoiceGenerator::new(&dir).unwrap();

        let record = InvoiceRecord {
            amount: "1000".to_string(),
            bug_date: "2024-03-15".to_string(),
            description: "SQL injection in login form".to_string(),
            invoice_date: "2024-03-20".to_string(),
            invoice_name: "INV-TEST".to_string(),
            payee_name: "John Doe".to_string(),
            payee_address: "123 Main St".to_string(),
            payee_email: "john.doe@example.com".to_string(),
        };

        let path = generator.export(&record).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        fs::remove_file(path).ok();
    }
}

//! Tests against a real pdfium library.
//!
//! These tests require pdfium (set PDFIUM_DYNAMIC_LIB_PATH or install it in
//! a system library directory) and skip themselves when it is missing.
//!
//! Run with: cargo test --package pdf-flipbook-core --test pdfium_tests

use pdf_flipbook_core::{DocumentLoader, PageRasterizer, PageSource, PdfiumLoader, RenderConfig};
use std::path::PathBuf;

fn loader() -> Option<PdfiumLoader> {
    let loader = match std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        Ok(path) => PdfiumLoader::with_library_path(PathBuf::from(path)),
        Err(_) => PdfiumLoader::new(),
    };
    loader.is_available().then_some(loader)
}

macro_rules! require_pdfium {
    () => {
        match loader() {
            Some(loader) => loader,
            None => {
                eprintln!("Skipping test: Pdfium not found");
                return;
            }
        }
    };
}

/// Build a PDF with one blank page per media box, with a valid xref table.
fn pdf_with_pages(media_boxes: &[(u32, u32)]) -> Vec<u8> {
    let page_ids: Vec<usize> = (0..media_boxes.len()).map(|i| i + 3).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, media_boxes.len()),
    ];
    for (w, h) in media_boxes {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] >>",
            w, h
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{:010} 00000 n \n", offset));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));
    out.into_bytes()
}

// pdfium binds its library once per process, so everything that needs a
// live binding runs in a single test.
#[tokio::test]
async fn test_pdfium_load_and_rasterize() {
    let loader = require_pdfium!();

    let document = loader
        .load(pdf_with_pages(&[(612, 792), (842, 595)]))
        .unwrap();
    assert_eq!(document.page_count().unwrap(), 2);
    let first = document.page_size(1).unwrap();
    assert_eq!((first.width.round(), first.height.round()), (612.0, 792.0));
    let second = document.page_size(2).unwrap();
    assert_eq!((second.width.round(), second.height.round()), (842.0, 595.0));
    assert!(document.page_size(3).is_err());
    drop(document);

    let document = loader
        .load(pdf_with_pages(&[(200, 300), (200, 300), (200, 300)]))
        .unwrap();
    let rasterizer = PageRasterizer::new(RenderConfig::default()).unwrap();
    let pages = rasterizer.rasterize_all(&document, 1000.0).await.unwrap();

    assert_eq!(pages.len(), 3);
    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.page_number, i + 1);
        assert!(!page.is_failed());
        assert_eq!((page.surface.width, page.surface.height), (400, 600));
    }

    assert!(loader.load(b"not a pdf".to_vec()).is_err());
}

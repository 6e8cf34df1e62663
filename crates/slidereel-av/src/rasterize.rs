//! PDF slide rasterization through poppler's command line tools.

use crate::{Error, Result, ToolCommand};
use rayon::prelude::*;
use slidereel_common::OutputLayout;
use std::path::{Path, PathBuf};

/// Default render resolution in dots per inch.
pub const DEFAULT_DPI: u32 = 300;

/// Count the pages of a PDF with `pdfinfo`.
pub fn page_count(pdf: &Path) -> Result<usize> {
    if !pdf.exists() {
        return Err(Error::file_not_found(pdf));
    }
    let output = ToolCommand::new("pdfinfo").arg(pdf).execute()?;
    parse_page_count(&output.stdout)
}

/// Extract the `Pages:` field from `pdfinfo` output.
pub fn parse_page_count(info: &str) -> Result<usize> {
    info.lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| Error::parse_error("pdfinfo", "no page count in output"))
}

/// Render every page of `pdf` into `layout`'s slide images.
///
/// Pages are rendered in parallel; the returned paths are ordered by page.
pub fn rasterize_pdf(pdf: &Path, layout: &OutputLayout, dpi: u32) -> Result<Vec<PathBuf>> {
    let pages = page_count(pdf)?;

    #[cfg(feature = "tracing")]
    tracing::info!("Rasterizing {} pages of {:?} at {} dpi", pages, pdf, dpi);

    (0..pages)
        .into_par_iter()
        .map(|index| render_page(pdf, index, &layout.slide_image(index), dpi))
        .collect()
}

/// Render page `index` (zero-based) to `image`.
fn render_page(pdf: &Path, index: usize, image: &Path, dpi: u32) -> Result<PathBuf> {
    let page = (index + 1).to_string();
    // pdftoppm appends the extension itself.
    let prefix = image.with_extension("");
    ToolCommand::new("pdftoppm")
        .args(["-png", "-singlefile", "-r"])
        .arg(dpi.to_string())
        .arg("-f")
        .arg(&page)
        .arg("-l")
        .arg(&page)
        .arg(pdf)
        .arg(&prefix)
        .execute()?;

    if !image.exists() {
        return Err(Error::tool_failed(
            "pdftoppm",
            format!("expected {:?} to be written", image),
        ));
    }
    Ok(image.to_path_buf())
}

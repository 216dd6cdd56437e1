//! Single-page PDF report layout for a crop recommendation.
//!
//! Pure layout: title, generation timestamp, divider, one line per
//! input parameter, the highlighted recommendation, and a fixed
//! footer. No error conditions are expected for valid inputs; any
//! printpdf failure is wrapped and surfaced upstream as a generic
//! render error.

use std::io::BufWriter;

use chrono::{DateTime, Local};
use printpdf::{BuiltinFont, Color, Line, Mm, PdfDocument, Point, Rgb};

use crate::error::{CultivarError, Result};

const PAGE_WIDTH_MM: f32 = 210.0; // A4 portrait
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 18.0;

/// Renders the report as a complete PDF byte buffer ready to stream
/// as a file download.
///
/// `params` is an ordered list of pre-formatted (label, value) pairs;
/// one line is emitted per entry in iteration order. The crop label is
/// echoed as submitted, upper-cased in the recommendation line.
///
/// # Errors
///
/// [`CultivarError::ReportFailed`] wrapping any layout failure.
pub fn render_report(crop: &str, params: &[(String, String)], now: DateTime<Local>) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Crop Recommendation Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "report",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(wrap)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(wrap)?;
    let oblique = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(wrap)?;
    let layer = doc.get_page(page).get_layer(layer);

    // Header
    layer.use_text(
        "Crop Recommendation Report",
        20.0,
        Mm(MARGIN_MM),
        Mm(PAGE_HEIGHT_MM - 22.0),
        &bold,
    );
    layer.use_text(
        format!("Generated on: {}", now.format("%Y-%m-%d %H:%M:%S")),
        11.0,
        Mm(MARGIN_MM),
        Mm(PAGE_HEIGHT_MM - 31.0),
        &regular,
    );

    // Divider
    let rule_y = PAGE_HEIGHT_MM - 36.0;
    layer.set_outline_thickness(0.6);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN_MM), Mm(rule_y)), false),
            (Point::new(Mm(PAGE_WIDTH_MM - MARGIN_MM), Mm(rule_y)), false),
        ],
        is_closed: false,
    });

    // Input parameters, one line per entry in iteration order
    layer.use_text(
        "Input Parameters:",
        14.0,
        Mm(MARGIN_MM),
        Mm(PAGE_HEIGHT_MM - 47.0),
        &bold,
    );
    let mut y = PAGE_HEIGHT_MM - 56.0;
    for (label, value) in params {
        layer.use_text(
            format!("\u{2022} {label}: {value}"),
            12.0,
            Mm(MARGIN_MM + 7.0),
            Mm(y),
            &regular,
        );
        y -= 7.0;
    }

    // Recommendation, highlighted in green
    y -= 6.0;
    layer.use_text("Recommendation Result:", 14.0, Mm(MARGIN_MM), Mm(y), &bold);
    y -= 9.0;
    layer.set_fill_color(Color::Rgb(Rgb::new(0.2, 0.6, 0.2, None)));
    layer.use_text(
        format!("Recommended Crop: {}", crop.to_uppercase()),
        16.0,
        Mm(MARGIN_MM + 7.0),
        Mm(y),
        &bold,
    );

    // Footer caption
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.use_text(
        "Generated by the Cultivar Crop Recommendation System",
        10.0,
        Mm(MARGIN_MM),
        Mm(17.0),
        &oblique,
    );
    layer.use_text(
        "For agricultural guidance and optimal crop selection",
        10.0,
        Mm(MARGIN_MM),
        Mm(12.0),
        &oblique,
    );

    let mut buffer = Vec::new();
    doc.save(&mut BufWriter::new(&mut buffer)).map_err(wrap)?;
    Ok(buffer)
}

/// Attachment filename: `crop_recommendation_<label>_<YYYYMMDD_HHMMSS>.pdf`.
///
/// The label is slugged to lowercase `[a-z0-9_]` so the value is safe
/// inside a Content-Disposition header; collisions are acceptable
/// since the name is time-suffixed per request.
pub fn report_filename(crop: &str, now: DateTime<Local>) -> String {
    let slug: String = crop
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!(
        "crop_recommendation_{slug}_{}.pdf",
        now.format("%Y%m%d_%H%M%S")
    )
}

fn wrap(e: printpdf::Error) -> CultivarError {
    CultivarError::ReportFailed(e.to_string())
}

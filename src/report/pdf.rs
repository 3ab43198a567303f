//! PDF rendering of a `ReportDocument` via `printpdf`.
//!
//! Uses the builtin Helvetica faces, so text stays within Latin-1; status
//! markers are plain ASCII.

use std::io::BufWriter;

use printpdf::image_crate::GenericImageView;
use printpdf::path::PaintMode;
use printpdf::*;

use super::layout::{
    text_width, Emphasis, PlacedSection, ReportDocument, ScoreLine, Section, DISCLAIMER_FONT_PT,
    DISCLAIMER_LINE_HEIGHT, HEADER_BAND, IMAGE_HEIGHT, IMAGE_WIDTH, LINE_HEIGHT, MARGIN_X,
    PAGE_HEIGHT, PAGE_WIDTH,
};
use super::ReportError;
use crate::models::{Label, Severity};

const DOCUMENT_TITLE: &str = "Eye Sense - Relatório de Análise";
const IMAGE_DPI: f64 = 300.0;

type Rgb8 = (u8, u8, u8);

const BLACK: Rgb8 = (0, 0, 0);
const WHITE: Rgb8 = (255, 255, 255);
const GRAY: Rgb8 = (107, 114, 128);
const BRAND: Rgb8 = (16, 185, 129);
const SUCCESS: Rgb8 = (16, 185, 129);
const WARNING: Rgb8 = (245, 158, 11);
const ERROR: Rgb8 = (239, 68, 68);
const NOTICE_FILL: Rgb8 = (255, 243, 205);
const NOTICE_TEXT: Rgb8 = (146, 64, 14);

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Render the whole document. Returns PDF bytes.
pub fn render_pdf(document: &ReportDocument) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) =
        PdfDocument::new(DOCUMENT_TITLE, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?,
    };

    let mut layers = vec![doc.get_page(page1).get_layer(layer1)];
    for _ in 1..document.page_count() {
        let (page, layer) = doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
        layers.push(doc.get_page(page).get_layer(layer));
    }

    for placed in document.sections() {
        let layer = layers
            .get(placed.page)
            .ok_or_else(|| ReportError::Pdf(format!("section on missing page {}", placed.page)))?;
        draw_section(layer, &fonts, placed);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Pdf(format!("buffer error: {e}")))
}

fn draw_section(layer: &PdfLayerReference, fonts: &Fonts, placed: &PlacedSection) {
    let y = placed.y;
    match &placed.section {
        Section::Header {
            title,
            subtitle,
            generated_at,
        } => {
            fill_rect(layer, 0.0, 0.0, PAGE_WIDTH, HEADER_BAND, BRAND);
            set_color(layer, WHITE);
            text(layer, title, 24.0, MARGIN_X, 25.0, &fonts.bold);
            text(layer, subtitle, 12.0, MARGIN_X, 32.0, &fonts.regular);
            let stamp = format!("Relatório gerado em: {generated_at}");
            let x = PAGE_WIDTH - MARGIN_X - text_width(&stamp, 10.0);
            text(layer, &stamp, 10.0, x, 25.0, &fonts.regular);
        }
        Section::Metadata {
            user_email,
            file_name,
            file_size,
        } => {
            set_color(layer, BLACK);
            text(layer, "INFORMAÇÕES DA ANÁLISE", 16.0, MARGIN_X, y, &fonts.bold);
            let rows = [
                format!("Usuário: {user_email}"),
                format!("Arquivo analisado: {file_name}"),
                format!("Tamanho do arquivo: {file_size}"),
            ];
            for (i, row) in rows.iter().enumerate() {
                text(layer, row, 11.0, MARGIN_X, y + 15.0 + 8.0 * i as f64, &fonts.regular);
            }
        }
        Section::Image { bytes } => {
            let x = (PAGE_WIDTH - IMAGE_WIDTH) / 2.0;
            let heading = "IMAGEM ANALISADA";
            set_color(layer, BLACK);
            text(
                layer,
                heading,
                14.0,
                centered(heading, 14.0),
                y,
                &fonts.bold,
            );
            if let Err(e) = draw_image(layer, bytes, x, y + 10.0) {
                tracing::warn!(error = %e, "Image not embedded in report");
            }
        }
        Section::Summary { lines, .. } => {
            set_color(layer, BLACK);
            text(layer, "RESULTADOS DA ANÁLISE", 16.0, MARGIN_X, y, &fonts.bold);
            text(layer, "Avaliação Geral:", 14.0, MARGIN_X, y + 15.0, &fonts.bold);
            score_lines(layer, fonts, lines, y + 25.0);
        }
        Section::Detail { lines, .. } => {
            set_color(layer, BLACK);
            text(layer, "Detalhamento da Condição:", 14.0, MARGIN_X, y, &fonts.bold);
            score_lines(layer, fonts, lines, y + 10.0);
        }
        Section::Recommendation { lines } => {
            set_color(layer, BLACK);
            text(layer, "RECOMENDAÇÃO MÉDICA", 14.0, MARGIN_X, y, &fonts.bold);
            for (i, line) in lines.iter().enumerate() {
                let line_y = y + 10.0 + LINE_HEIGHT * i as f64;
                text(layer, line, 11.0, MARGIN_X, line_y, &fonts.regular);
            }
        }
        Section::Disclaimer { title, lines } => {
            let height = placed.section.extent();
            set_outline(layer, WARNING);
            set_color(layer, NOTICE_FILL);
            layer.add_rect(
                Rect::new(
                    mm(15.0),
                    mm(PAGE_HEIGHT - (y + height)),
                    mm(PAGE_WIDTH - 15.0),
                    mm(PAGE_HEIGHT - y),
                )
                .with_mode(PaintMode::FillStroke),
            );
            set_color(layer, NOTICE_TEXT);
            text(layer, &format!("[!] {title}"), 12.0, MARGIN_X, y + 10.0, &fonts.bold);
            for (i, line) in lines.iter().enumerate() {
                let line_y = y + 17.0 + DISCLAIMER_LINE_HEIGHT * i as f64;
                text(layer, line, DISCLAIMER_FONT_PT, MARGIN_X, line_y, &fonts.regular);
            }
        }
        Section::Footer { text: footer } => {
            set_color(layer, GRAY);
            text(layer, footer, 8.0, centered(footer, 8.0), y, &fonts.regular);
        }
    }
}

fn score_lines(layer: &PdfLayerReference, fonts: &Fonts, lines: &[ScoreLine; 2], top: f64) {
    for (i, line) in lines.iter().enumerate() {
        let (marker, color) = match line.emphasis {
            Emphasis::Emphasized => (marker_for(line.label), severity_color(label_severity(line.label))),
            Emphasis::Muted => ("   ", GRAY),
        };
        set_color(layer, color);
        let content = format!("{marker} {}", line.text());
        text(layer, &content, 11.0, 30.0, top + 8.0 * i as f64, &fonts.regular);
    }
}

fn draw_image(layer: &PdfLayerReference, bytes: &[u8], x: f64, top: f64) -> Result<(), String> {
    let decoded = printpdf::image_crate::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let (width_px, height_px) = decoded.dimensions();
    if width_px == 0 || height_px == 0 {
        return Err("image has no pixels".into());
    }

    let natural_width = width_px as f64 / IMAGE_DPI * 25.4;
    let natural_height = height_px as f64 / IMAGE_DPI * 25.4;
    let image = Image::from_dynamic_image(&decoded);
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(mm(x)),
            translate_y: Some(mm(PAGE_HEIGHT - (top + IMAGE_HEIGHT))),
            scale_x: Some((IMAGE_WIDTH / natural_width) as f32),
            scale_y: Some((IMAGE_HEIGHT / natural_height) as f32),
            dpi: Some(IMAGE_DPI as f32),
            ..Default::default()
        },
    );
    Ok(())
}

fn label_severity(label: Label) -> Severity {
    match label {
        Label::Healthy => Severity::Success,
        Label::Cataract => Severity::Warning,
        Label::Sick | Label::Glaucoma => Severity::Error,
    }
}

fn marker_for(label: Label) -> &'static str {
    match label {
        Label::Healthy => "[OK]",
        _ => "[!]",
    }
}

fn severity_color(severity: Severity) -> Rgb8 {
    match severity {
        Severity::Success => SUCCESS,
        Severity::Warning => WARNING,
        Severity::Error => ERROR,
    }
}

// ─── printpdf helpers (top-down millimetres → PDF space) ───

fn mm(value: f64) -> Mm {
    Mm(value as f32)
}

fn rgb((r, g, b): Rgb8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn set_color(layer: &PdfLayerReference, color: Rgb8) {
    layer.set_fill_color(rgb(color));
}

fn set_outline(layer: &PdfLayerReference, color: Rgb8) {
    layer.set_outline_color(rgb(color));
    layer.set_outline_thickness(0.5);
}

fn fill_rect(layer: &PdfLayerReference, x: f64, top: f64, width: f64, height: f64, color: Rgb8) {
    set_color(layer, color);
    layer.add_rect(
        Rect::new(
            mm(x),
            mm(PAGE_HEIGHT - (top + height)),
            mm(x + width),
            mm(PAGE_HEIGHT - top),
        )
        .with_mode(PaintMode::Fill),
    );
}

fn text(layer: &PdfLayerReference, content: &str, size: f64, x: f64, baseline: f64, font: &IndirectFontRef) {
    layer.use_text(content, size as f32, mm(x), mm(PAGE_HEIGHT - baseline), font);
}

fn centered(content: &str, size: f64) -> f64 {
    (PAGE_WIDTH - text_width(content, size)) / 2.0
}

use crate::emit::{DocumentEmitter, QrEncoder};
use crate::error::EmitError;
use crate::layout::LabelRecord;
use crate::placement::Placement;
use crate::sheet::SheetGeometry;
use crate::text_metrics::fit_font_size;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Text lines may use this much of the label width before shrink-to-fit
/// kicks in.
const TEXT_MAX_WIDTH_RATIO: f32 = 0.9;

/// Renders each page of a run as a standalone SVG document.
///
/// The root element carries the physical page size (`width="8.5in"`) while
/// the viewBox stays in sheet units, so placement coordinates pass through
/// unscaled and the file still prints at size.
pub struct SvgEmitter<'a> {
    geometry: SheetGeometry,
    theme: &'a Theme,
    title: String,
    show_outlines: bool,
    qr: Option<&'a dyn QrEncoder>,
    pages: Vec<String>,
    open: bool,
}

impl<'a> SvgEmitter<'a> {
    pub fn new(geometry: SheetGeometry, theme: &'a Theme, title: impl Into<String>) -> Self {
        Self {
            geometry,
            theme,
            title: title.into(),
            show_outlines: false,
            qr: None,
            pages: Vec::new(),
            open: false,
        }
    }

    /// Draw a dashed cut line around every label, for previews and for
    /// aligning plain stock.
    pub fn with_outlines(mut self, show_outlines: bool) -> Self {
        self.show_outlines = show_outlines;
        self
    }

    pub fn with_qr(mut self, encoder: &'a dyn QrEncoder) -> Self {
        self.qr = Some(encoder);
        self
    }

    fn close_page(&mut self) {
        if self.open
            && let Some(page) = self.pages.last_mut()
        {
            page.push_str("</svg>");
        }
        self.open = false;
    }
}

impl DocumentEmitter for SvgEmitter<'_> {
    type Artifact = Vec<String>;

    fn begin_page(&mut self, page: u32) -> Result<(), EmitError> {
        self.close_page();
        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.3}{unit}\" height=\"{height:.3}{unit}\" viewBox=\"0 0 {width:.3} {height:.3}\" data-page=\"{page}\">",
            width = self.geometry.page_width,
            height = self.geometry.page_height,
            unit = self.geometry.unit.suffix(),
        ));
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            self.theme.background
        ));
        self.pages.push(svg);
        self.open = true;
        Ok(())
    }

    fn emit_label(
        &mut self,
        placement: &Placement,
        record: &LabelRecord,
    ) -> Result<(), EmitError> {
        if !self.open {
            return Err(EmitError::Draw("label emitted before any page".to_string()));
        }

        let geometry = self.geometry;
        let center_x = placement.x + geometry.label_width / 2.0;

        // The whole label is staged locally so a QR failure leaves the page
        // without a half-drawn face.
        let mut label = String::new();
        if self.show_outlines {
            let hairline = 0.75 * geometry.unit.per_point();
            label.push_str(&format!(
                "<rect x=\"{:.3}\" y=\"{:.3}\" width=\"{:.3}\" height=\"{:.3}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{hairline:.3}\" stroke-dasharray=\"{:.3} {:.3}\"/>",
                placement.x,
                placement.y,
                geometry.label_width,
                geometry.label_height,
                self.theme.outline_color,
                3.0 * geometry.unit.per_point(),
                2.0 * geometry.unit.per_point(),
            ));
        }

        let date_line = record.change_date.short_label();
        let year_line = record.change_date.year_label();
        let number_line = record.number.to_string();
        let lines: [(&str, f32, f32, bool); 4] = [
            (&self.title, self.theme.title_font_size, self.theme.title_y, true),
            (&date_line, self.theme.date_font_size, self.theme.date_y, false),
            (&year_line, self.theme.year_font_size, self.theme.year_y, false),
            (&number_line, self.theme.number_font_size, self.theme.number_y, false),
        ];
        for (text, point_size, anchor_ratio, bold) in lines {
            label.push_str(&text_line(
                self.theme,
                &geometry,
                center_x,
                placement.y,
                text,
                point_size,
                anchor_ratio,
                bold,
            ));
        }

        if let Some(payload) = &record.qr_payload
            && let Some(encoder) = self.qr
        {
            let size = geometry.label_height * self.theme.qr_height_ratio;
            let inset = geometry.label_height * self.theme.qr_inset_ratio;
            let x = placement.x + geometry.label_width - size - inset;
            let y = placement.y + inset;
            let fragment = encoder.encode_svg(payload, size)?;
            label.push_str(&format!(
                "<g transform=\"translate({x:.3} {y:.3})\">{fragment}</g>"
            ));
        }

        if let Some(page) = self.pages.last_mut() {
            page.push_str(&label);
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<String> {
        self.close_page();
        self.pages
    }
}

fn text_line(
    theme: &Theme,
    geometry: &SheetGeometry,
    center_x: f32,
    label_top: f32,
    text: &str,
    point_size: f32,
    anchor_ratio: f32,
    bold: bool,
) -> String {
    // Theme sizes are points; the page coordinate space is sheet units.
    let requested = point_size * geometry.unit.per_point();
    let size = fit_font_size(
        text,
        requested,
        geometry.label_width * TEXT_MAX_WIDTH_RATIO,
        &theme.font_family,
    );
    let baseline = label_top + geometry.label_height * anchor_ratio;
    let weight = if bold { " font-weight=\"bold\"" } else { "" };
    format!(
        "<text x=\"{center_x:.3}\" y=\"{baseline:.3}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{size:.3}\"{weight} fill=\"{}\">{}</text>",
        escape_xml(&theme.font_family),
        theme.text_color,
        escape_xml(text)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, theme: &Theme, dpi: f32) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme.primary_font_family();
    opt.dpi = dpi;
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

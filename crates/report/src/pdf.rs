//! PDF Output
//!
//! Paints a [`DocumentLayout`] with printpdf using the built-in Helvetica
//! faces, so no font files are embedded.

use crate::layout::{DocumentLayout, DrawOp, FontWeight, Rgb, PAGE_HEIGHT, PAGE_WIDTH};
use crate::ReportError;
use image::RgbImage;
use printpdf::image_crate;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Polygon,
};
use printpdf::path::{PaintMode, WindingOrder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info};

const LAYER_NAME: &str = "Layer 1";

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(rgb.0, rgb.1, rgb.2, None))
}

fn pdf_error(err: impl std::fmt::Debug) -> ReportError {
    ReportError::Pdf(format!("{:?}", err))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

fn paint_image(layer: &PdfLayerReference, image: &RgbImage, x: f32, y: f32, width: f32, height: f32) -> Result<(), ReportError> {
    let (px_width, px_height) = image.dimensions();
    let raw = image_crate::RgbImage::from_raw(px_width, px_height, image.as_raw().clone())
        .ok_or_else(|| ReportError::Pdf("chart raster has an invalid size".to_string()))?;
    let pdf_image = Image::from_dynamic_image(&image_crate::DynamicImage::ImageRgb8(raw));

    // Pin the width through dpi, then stretch vertically to the target height
    let dpi = px_width as f32 / (width / 72.0);
    let natural_height = px_height as f32 / dpi * 72.0;

    pdf_image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(mm(x)),
            translate_y: Some(mm(y)),
            dpi: Some(dpi),
            scale_y: Some(height / natural_height),
            ..Default::default()
        },
    );
    Ok(())
}

fn paint(layer: &PdfLayerReference, op: &DrawOp, fonts: &Fonts, images: &[RgbImage]) -> Result<(), ReportError> {
    match op {
        DrawOp::Text {
            x,
            y,
            size,
            weight,
            color: rgb,
            text,
        } => {
            layer.set_fill_color(color(*rgb));
            layer.use_text(text.as_str(), *size, mm(*x), mm(*y), fonts.get(*weight));
        }
        DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color: rgb,
        } => {
            let corners = [(*x, *y), (x + width, *y), (x + width, y + height), (*x, y + height)];
            layer.set_fill_color(color(*rgb));
            layer.add_polygon(Polygon {
                rings: vec![corners
                    .iter()
                    .map(|&(px, py)| (Point::new(mm(px), mm(py)), false))
                    .collect()],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            });
        }
        DrawOp::Line { from, to, thickness } => {
            layer.set_outline_color(color(Rgb(0.0, 0.0, 0.0)));
            layer.set_outline_thickness(*thickness);
            layer.add_line(Line {
                points: vec![
                    (Point::new(mm(from.0), mm(from.1)), false),
                    (Point::new(mm(to.0), mm(to.1)), false),
                ],
                is_closed: false,
            });
        }
        DrawOp::Image {
            index,
            x,
            y,
            width,
            height,
        } => {
            let image = images
                .get(*index)
                .ok_or_else(|| ReportError::Pdf(format!("no image at index {}", index)))?;
            paint_image(layer, image, *x, *y, *width, *height)?;
        }
    }
    Ok(())
}

/// Paint every page of `layout` and write the document to `path`,
/// replacing any existing file.
pub fn write_pdf(layout: &DocumentLayout, images: &[RgbImage], title: &str, path: &Path) -> Result<(), ReportError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER_NAME);
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
    };

    let mut targets = vec![(first_page, first_layer)];
    for _ in 1..layout.pages.len() {
        targets.push(doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER_NAME));
    }

    for (number, (page, (page_index, layer_index))) in layout.pages.iter().zip(targets).enumerate() {
        let layer = doc.get_page(page_index).get_layer(layer_index);
        for op in &page.ops {
            paint(&layer, op, &fonts, images)?;
        }
        debug!("Painted page {} ({} operations)", number + 1, page.ops.len());
    }

    let file = File::create(path)?;
    doc.save(&mut BufWriter::new(file)).map_err(pdf_error)?;
    info!("Wrote {} page PDF to {}", layout.pages.len(), path.display());
    Ok(())
}

//! Downloadable renditions of the reports: bordered PDF tables and PNG charts.
//!
//! Tables use the PDF base-14 Helvetica, so no font file is needed. Chart text needs a
//! TrueType font registered through [`load_chart_font`]; without one the charts still render,
//! only unlabeled.

use super::reports::{Count, IncompleteRider};
use crate::error::AppError;
use crate::models::RiderRow;
use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use plotters::backend::BitMapBackend;
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{PathElement, Polygon, Rectangle, Text};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color, FontStyle, RGBColor, TextStyle, BLACK, WHITE};
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::io::Cursor;

pub const PDF: &str = "application/pdf";
pub const PNG: &str = "image/png";

pub fn generated_on(date: NaiveDate) -> String {
    format!("Generado: {}", date.format("%d/%m/%Y"))
}

pub struct Column {
    pub header: &'static str,
    /// Millimetres.
    pub width: f32,
}

fn col(header: &'static str, width: f32) -> Column {
    Column { header, width }
}

/// A titled table, one string per cell.
pub struct Table {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    pub landscape: bool,
}

pub fn proposals_table(ranking: &[Count], date: NaiveDate) -> Table {
    Table {
        title: format!("Ranking de Propuestas ({})", generated_on(date)),
        columns: vec![col("Propuesta", 130.0), col("Cantidad", 50.0)],
        rows: ranking
            .iter()
            .map(|c| vec![c.label.clone(), c.count.to_string()])
            .collect(),
        landscape: false,
    }
}

pub fn debtors_table(riders: &[RiderRow], date: NaiveDate) -> Table {
    Table {
        title: format!("Reporte de Jinetes con Deudas ({})", generated_on(date)),
        columns: vec![col("Apellido", 60.0), col("Nombre", 60.0), col("DNI", 60.0)],
        rows: riders
            .iter()
            .map(|r| vec![r.last_name.clone(), r.name.clone(), r.dni.to_string()])
            .collect(),
        landscape: false,
    }
}

pub fn incomplete_riders_table(riders: &[IncompleteRider], date: NaiveDate) -> Table {
    Table {
        title: format!("Jinetes con información incompleta ({})", generated_on(date)),
        columns: vec![
            col("Apellido", 60.0),
            col("Nombre", 60.0),
            col("DNI", 20.0),
            col("Discapacidad\ny pensiones", 30.0),
            col("Situación provisional\ny escolar", 50.0),
            col("Tutores", 30.0),
            col("Trabajo\ninstitucional", 30.0),
        ],
        rows: riders
            .iter()
            .map(|r| {
                vec![
                    r.last_name.clone(),
                    r.first_name.clone(),
                    r.dni.to_string(),
                    r.disability.to_string(),
                    r.insurance.to_string(),
                    r.tutors.to_string(),
                    r.institutional_work.to_string(),
                ]
            })
            .collect(),
        landscape: true,
    }
}

const ROW_MM: f32 = 10.0;
const MARGIN_MM: f32 = 10.0;
const PAD_MM: f32 = 1.5;
const PT_TO_MM: f32 = 0.3528;

fn pdf_err(e: printpdf::Error) -> AppError {
    AppError::Internal(format!("pdf: {}", e))
}

/// Cuts `text` to about what fits in `width` mm at `size` pt.
fn fit(text: &str, width: f32, size: f32) -> String {
    let per_char = size * 0.5 * PT_TO_MM;
    let max = ((width - 2.0 * PAD_MM) / per_char).max(1.0) as usize;
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('.');
    cut
}

/// One bordered cell whose top-left corner is at (`x`, `top`). Lines are stacked evenly.
fn cell(layer: &PdfLayerReference, x: f32, top: f32, width: f32, lines: &[&str], size: f32, font: &IndirectFontRef) {
    let bottom = top - ROW_MM;
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x), Mm(bottom)), false),
            (Point::new(Mm(x + width), Mm(bottom)), false),
            (Point::new(Mm(x + width), Mm(top)), false),
            (Point::new(Mm(x), Mm(top)), false),
        ],
        is_closed: true,
    });
    let step = ROW_MM / lines.len().max(1) as f32;
    for (i, line) in lines.iter().enumerate() {
        let baseline = top - step * (i as f32 + 1.0) + (step - size * PT_TO_MM) / 2.0;
        layer.use_text(fit(line, width, size), size, Mm(x + PAD_MM), Mm(baseline), font);
    }
}

fn header_row(layer: &PdfLayerReference, table: &Table, top: f32, font: &IndirectFontRef) -> f32 {
    let mut x = MARGIN_MM;
    for column in &table.columns {
        let lines: Vec<&str> = column.header.lines().collect();
        let size = if lines.len() > 1 { 8.0 } else { 11.0 };
        cell(layer, x, top, column.width, &lines, size, font);
        x += column.width;
    }
    top - ROW_MM
}

/// A4 document with the title on top and the table below, headers repeated on each page.
pub fn render_pdf(table: &Table) -> Result<Vec<u8>, AppError> {
    let (width, height) = if table.landscape { (297.0, 210.0) } else { (210.0, 297.0) };
    let (doc, page, layer) = PdfDocument::new(table.title.as_str(), Mm(width), Mm(height), "tabla");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
    let mut layer = doc.get_page(page).get_layer(layer);
    layer.set_outline_thickness(0.3);

    let mut top = height - MARGIN_MM;
    layer.use_text(table.title.as_str(), 12.0, Mm(MARGIN_MM), Mm(top - 6.0), &bold);
    top -= 2.0 * ROW_MM;
    top = header_row(&layer, table, top, &bold);
    for row in &table.rows {
        if top - ROW_MM < MARGIN_MM {
            let (page, next) = doc.add_page(Mm(width), Mm(height), "tabla");
            layer = doc.get_page(page).get_layer(next);
            layer.set_outline_thickness(0.3);
            top = header_row(&layer, table, height - MARGIN_MM, &bold);
        }
        let mut x = MARGIN_MM;
        for (column, value) in table.columns.iter().zip(row) {
            cell(&layer, x, top, column.width, &[value.as_str()], 10.0, &regular);
            x += column.width;
        }
        top -= ROW_MM;
    }
    doc.save_to_bytes().map_err(pdf_err)
}

const CHART_WIDTH: u32 = 800;
const CHART_HEIGHT: u32 = 400;
const CHART_FONT: &str = "sans-serif";
const NO_DATA: &str = "No hay datos disponibles";
const BAR: RGBColor = RGBColor(135, 206, 235);
const PALETTE: [RGBColor; 8] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
    RGBColor(166, 216, 84),
    RGBColor(255, 217, 47),
    RGBColor(229, 196, 148),
    RGBColor(179, 179, 179),
];

static LABELS: OnceCell<bool> = OnceCell::new();

/// Registers the TrueType font at `path` for chart text, once per process. Returns whether
/// charts carry labels.
pub fn load_chart_font(path: &str) -> bool {
    *LABELS.get_or_init(|| match std::fs::read(path) {
        Ok(bytes) => {
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            match plotters::style::register_font(CHART_FONT, FontStyle::Normal, bytes) {
                Ok(()) => true,
                Err(_) => {
                    tracing::warn!(path, "chart font rejected");
                    false
                }
            }
        }
        Err(e) => {
            tracing::warn!(path, error = %e, "chart font unavailable, charts will have no text");
            false
        }
    })
}

fn labels_enabled() -> bool {
    LABELS.get().copied().unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chart {
    Diagnoses,
    Scholarships,
    JobPositions,
}

impl Chart {
    pub fn from_slug(slug: &str) -> Option<Chart> {
        match slug {
            "diagnoses" => Some(Chart::Diagnoses),
            "scholarships" => Some(Chart::Scholarships),
            "job-positions" => Some(Chart::JobPositions),
            _ => None,
        }
    }

    pub fn filename(self) -> &'static str {
        match self {
            Chart::Diagnoses => "diagnosticos_discapacidades.png",
            Chart::Scholarships => "jinetes_amazonas_becados.png",
            Chart::JobPositions => "empleados_activos_por_posicion_laboral.png",
        }
    }

    pub fn title(self, date: NaiveDate) -> String {
        let name = match self {
            Chart::Diagnoses => "Distribución de Diagnósticos",
            Chart::Scholarships => "Proporción de Becados",
            Chart::JobPositions => "Distribución de Puestos Laborales",
        };
        format!("{} ({})", name, generated_on(date))
    }
}

fn draw_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Internal(format!("chart: {}", e))
}

fn text_style(size: f64, h: HPos, v: VPos) -> TextStyle<'static> {
    TextStyle::from((CHART_FONT, size)).pos(Pos::new(h, v))
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Outline of a pie slice as a polygon: the centre, then points along the arc.
fn slice(center: (i32, i32), radius: f64, start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep / TAU) * 120.0).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for k in 0..=steps {
        let angle = start + sweep * k as f64 / steps as f64;
        points.push((
            center.0 + (radius * angle.cos()).round() as i32,
            center.1 + (radius * angle.sin()).round() as i32,
        ));
    }
    points
}

fn draw_pie(area: &Area<'_>, data: &[Count], total: i64, labels: bool) -> Result<(), AppError> {
    let center = (200, 215);
    let shown = data.iter().filter(|c| c.count > 0).count().max(1) as i32;
    let step = ((CHART_HEIGHT as i32 - 80) / shown).min(24);
    let mut start = -FRAC_PI_2;
    let mut legend_y = 70;
    for (i, c) in data.iter().enumerate().filter(|(_, c)| c.count > 0) {
        let color = PALETTE[i % PALETTE.len()];
        let share = c.count as f64 / total as f64;
        area.draw(&Polygon::new(slice(center, 150.0, start, share * TAU), color.filled()))
            .map_err(draw_err)?;
        start += share * TAU;
        area.draw(&Rectangle::new([(420, legend_y), (434, legend_y + 14)], color.filled()))
            .map_err(draw_err)?;
        if labels {
            let entry = format!("{} ({}, {:.1}%)", c.label, c.count, share * 100.0);
            area.draw(&Text::new(entry, (442, legend_y + 7), text_style(13.0, HPos::Left, VPos::Center)))
                .map_err(draw_err)?;
        }
        legend_y += step;
    }
    Ok(())
}

fn draw_bars(area: &Area<'_>, data: &[Count], labels: bool) -> Result<(), AppError> {
    let (left, right, top, bottom) = (60, CHART_WIDTH as i32 - 20, 70, CHART_HEIGHT as i32 - 70);
    let max = data.iter().map(|c| c.count).max().unwrap_or(0).max(1);
    let slot = (right - left) / data.len().max(1) as i32;
    let width = (slot * 2 / 3).max(1);
    area.draw(&PathElement::new(vec![(left, bottom), (right, bottom)], BLACK.stroke_width(1)))
        .map_err(draw_err)?;
    for (i, c) in data.iter().enumerate() {
        let x = left + slot * i as i32 + (slot - width) / 2;
        let height = (i64::from(bottom - top) * c.count.max(0) / max) as i32;
        area.draw(&Rectangle::new([(x, bottom - height), (x + width, bottom)], BAR.filled()))
            .map_err(draw_err)?;
        if labels {
            let middle = x + width / 2;
            area.draw(&Text::new(
                c.count.to_string(),
                (middle, bottom - height - 4),
                text_style(12.0, HPos::Center, VPos::Bottom),
            ))
            .map_err(draw_err)?;
            let name: String = c.label.chars().take((slot / 6).max(3) as usize).collect();
            area.draw(&Text::new(name, (middle, bottom + 6), text_style(10.0, HPos::Center, VPos::Top)))
                .map_err(draw_err)?;
        }
    }
    if labels {
        area.draw(&Text::new(
            "Puesto Laboral",
            (CHART_WIDTH as i32 / 2, CHART_HEIGHT as i32 - 18),
            text_style(13.0, HPos::Center, VPos::Center),
        ))
        .map_err(draw_err)?;
        area.draw(&Text::new(
            "Cantidad de Empleados",
            (left, top - 20),
            text_style(13.0, HPos::Left, VPos::Center),
        ))
        .map_err(draw_err)?;
    }
    Ok(())
}

fn encode_png(pixels: Vec<u8>) -> Result<Vec<u8>, AppError> {
    let image = image::RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, pixels)
        .ok_or_else(|| AppError::Internal("chart buffer does not match its size".into()))?;
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, image::ImageFormat::Png).map_err(draw_err)?;
    Ok(png.into_inner())
}

/// Pie charts for diagnoses and scholarships, bars for job positions.
pub fn render_chart(chart: Chart, data: &[Count], date: NaiveDate) -> Result<Vec<u8>, AppError> {
    let labels = labels_enabled();
    let total: i64 = data.iter().map(|c| c.count.max(0)).sum();
    let mut pixels = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let area = BitMapBackend::with_buffer(&mut pixels, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        area.fill(&WHITE).map_err(draw_err)?;
        if labels {
            area.draw(&Text::new(
                chart.title(date),
                (CHART_WIDTH as i32 / 2, 28),
                text_style(18.0, HPos::Center, VPos::Center),
            ))
            .map_err(draw_err)?;
        }
        if total == 0 {
            if labels {
                area.draw(&Text::new(
                    NO_DATA,
                    (CHART_WIDTH as i32 / 2, CHART_HEIGHT as i32 / 2),
                    text_style(16.0, HPos::Center, VPos::Center),
                ))
                .map_err(draw_err)?;
            }
        } else if chart == Chart::JobPositions {
            draw_bars(&area, data, labels)?;
        } else {
            draw_pie(&area, data, total, labels)?;
        }
        area.present().map_err(draw_err)?;
    }
    encode_png(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 5).unwrap()
    }

    fn counts(pairs: &[(&str, i64)]) -> Vec<Count> {
        pairs
            .iter()
            .map(|(label, count)| Count {
                label: label.to_string(),
                count: *count,
            })
            .collect()
    }

    #[test]
    fn generated_stamp_is_day_month_year() {
        assert_eq!(generated_on(day()), "Generado: 05/11/2024");
    }

    #[test]
    fn long_cells_are_cut() {
        assert_eq!(fit("Ana", 60.0, 10.0), "Ana");
        let cut = fit(&"x".repeat(200), 20.0, 10.0);
        assert!(cut.ends_with('.'));
        assert!(cut.chars().count() < 20);
    }

    #[test]
    fn proposals_pdf_has_a_row_per_proposal() {
        let table = proposals_table(&counts(&[("Hipoterapia", 3), ("Equitación", 0)]), day());
        assert_eq!(table.title, "Ranking de Propuestas (Generado: 05/11/2024)");
        assert_eq!(table.rows, vec![vec!["Hipoterapia", "3"], vec!["Equitación", "0"]]);
        let pdf = render_pdf(&table).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn debtors_pdf_spans_pages() {
        let riders: Vec<RiderRow> = (0..60)
            .map(|i| RiderRow {
                id: i,
                dni: 40_000_000 + i,
                name: "Ana".into(),
                last_name: format!("Gómez {}", i),
                has_debt: true,
                professionals: None,
            })
            .collect();
        let table = debtors_table(&riders, day());
        assert_eq!(table.rows[0], vec!["Gómez 0", "Ana", "40000000"]);
        let pdf = render_pdf(&table).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn incomplete_riders_pdf_is_landscape() {
        let rider = IncompleteRider {
            last_name: "Pérez".into(),
            first_name: "Juan".into(),
            dni: 41222333,
            disability: "SI",
            insurance: "NO",
            institutional_work: "NO",
            tutors: "SI",
        };
        let table = incomplete_riders_table(&[rider], day());
        assert!(table.landscape);
        assert_eq!(table.rows[0], vec!["Pérez", "Juan", "41222333", "SI", "NO", "SI", "NO"]);
        assert!(render_pdf(&table).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn charts_are_png() {
        let diagnoses = counts(&[("ECNE", 4), ("Lesión post-traumática", 1)]);
        let png = render_chart(Chart::Diagnoses, &diagnoses, day()).unwrap();
        assert!(png.starts_with(&PNG_SIGNATURE));
        let positions = counts(&[("Terapeuta", 2), ("Conductor", 0), ("Veterinario/a", 1)]);
        let png = render_chart(Chart::JobPositions, &positions, day()).unwrap();
        assert!(png.starts_with(&PNG_SIGNATURE));
    }

    #[test]
    fn empty_chart_still_renders() {
        let none = counts(&[("becados", 0), ("no becados", 0)]);
        let png = render_chart(Chart::Scholarships, &none, day()).unwrap();
        assert!(png.starts_with(&PNG_SIGNATURE));
    }

    #[test]
    fn slices_close_on_the_centre() {
        let points = slice((100, 100), 50.0, -FRAC_PI_2, TAU / 4.0);
        assert_eq!(points[0], (100, 100));
        assert_eq!(points[1], (100, 50));
        assert_eq!(points.last().copied(), Some((150, 100)));
    }

    #[test]
    fn chart_slugs() {
        assert_eq!(Chart::from_slug("job-positions"), Some(Chart::JobPositions));
        assert_eq!(Chart::from_slug("pie"), None);
        assert_eq!(Chart::Scholarships.filename(), "jinetes_amazonas_becados.png");
        assert_eq!(
            Chart::Diagnoses.title(day()),
            "Distribución de Diagnósticos (Generado: 05/11/2024)"
        );
    }
}

//! Page Layout
//!
//! Flows a list of blocks onto A4 pages and produces positioned drawing
//! operations. Coordinates are PDF points with the origin at the bottom-left
//! corner of the page.

use serde::Serialize;

/// A4 width in points
pub const PAGE_WIDTH: f32 = 595.28;
/// A4 height in points
pub const PAGE_HEIGHT: f32 = 841.89;
/// Margin on every side, one inch
pub const MARGIN: f32 = 72.0;
/// Usable width between the margins
pub const FRAME_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const FRAME_TOP: f32 = PAGE_HEIGHT - MARGIN;

const TABLE_FONT_SIZE: f32 = 8.0;
const CELL_PAD_X: f32 = 6.0;
const CELL_PAD_Y: f32 = 3.0;
const ROW_HEIGHT: f32 = TABLE_FONT_SIZE + 2.0 + 2.0 * CELL_PAD_Y;
const GRID_THICKNESS: f32 = 0.25;
const MAX_LABEL_COLUMN: f32 = 150.0;

/// RGB color with components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
pub const GREY: Rgb = Rgb(0.5, 0.5, 0.5);
pub const WHITESMOKE: Rgb = Rgb(0.96, 0.96, 0.96);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Paragraph style, sizes in points
#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    leading: f32,
    weight: FontWeight,
    space_before: f32,
    space_after: f32,
    centered: bool,
    keep_with_next: bool,
}

const TITLE_STYLE: TextStyle = TextStyle {
    size: 18.0,
    leading: 22.0,
    weight: FontWeight::Bold,
    space_before: 0.0,
    space_after: 6.0,
    centered: true,
    keep_with_next: true,
};

const HEADING_STYLE: TextStyle = TextStyle {
    size: 14.0,
    leading: 18.0,
    weight: FontWeight::Bold,
    space_before: 12.0,
    space_after: 6.0,
    centered: false,
    keep_with_next: true,
};

const BODY_STYLE: TextStyle = TextStyle {
    size: 10.0,
    leading: 12.0,
    weight: FontWeight::Regular,
    space_before: 6.0,
    space_after: 0.0,
    centered: false,
    keep_with_next: false,
};

const NOTE_STYLE: TextStyle = TextStyle {
    size: 8.0,
    leading: 10.0,
    weight: FontWeight::Regular,
    space_before: 0.0,
    space_after: 0.0,
    centered: true,
    keep_with_next: false,
};

/// Grid of text cells with a header row
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Unit of document content, in reading order
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Paragraph(String),
    /// Small centered line, e.g. the generation timestamp
    Note(String),
    /// Vertical gap in points
    Spacer(f32),
    Table(TableBlock),
    /// Image from the painter's image list, scaled to `width` x `height` points
    Image { index: usize, width: f32, height: f32 },
}

/// Positioned drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        weight: FontWeight,
        color: Rgb,
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        thickness: f32,
    },
    Image {
        index: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// Where a title or heading landed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    /// One-based page number
    pub page: usize,
}

/// Result of flowing blocks onto pages
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<Page>,
    pub sections: Vec<Section>,
    /// Body rows across all tables, header rows excluded
    pub table_rows: usize,
}

struct Cursor {
    pages: Vec<Page>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: FRAME_TOP,
        }
    }

    fn remaining(&self) -> f32 {
        self.y - MARGIN
    }

    fn at_top(&self) -> bool {
        self.y >= FRAME_TOP
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = FRAME_TOP;
    }

    /// Start a new page unless `height` fits. Content taller than a whole
    /// page is placed at the top and allowed to overflow.
    fn ensure(&mut self, height: f32) {
        if height > self.remaining() && !self.at_top() {
            self.new_page();
        }
    }

    fn page_number(&self) -> usize {
        self.pages.len()
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }
}

/// Approximate Helvetica advance width of `text` in points.
///
/// ASCII uses a coarse per-glyph table. Anything else is counted as a full
/// em, which overestimates accented Latin letters but keeps wide glyphs
/// from spilling out of table cells.
pub fn text_width(text: &str, size: f32, weight: FontWeight) -> f32 {
    let em: f32 = text
        .chars()
        .map(|c| match c {
            'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.278,
            'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | ' ' | '-' | '/' => 0.333,
            '0'..='9' | '%' | '_' => 0.556,
            'm' | 'w' | 'M' | 'W' => 0.833,
            'A'..='Z' => 0.667,
            c if !c.is_ascii() => 1.0,
            _ => 0.556,
        })
        .sum();
    let factor = match weight {
        FontWeight::Regular => 1.0,
        FontWeight::Bold => 1.06,
    };
    em * size * factor
}

/// Greedy word wrap. A single word longer than `max_width` gets its own line.
pub fn wrap(text: &str, max_width: f32, size: f32, weight: FontWeight) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if text_width(&candidate, size, weight) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Shorten `text` with a trailing `...` until it fits
fn fit(text: &str, max_width: f32, size: f32, weight: FontWeight) -> String {
    if text_width(text, size, weight) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "...";
        if text_width(&candidate, size, weight) <= max_width {
            return candidate;
        }
    }
    String::new()
}

/// Flow `blocks` onto as many pages as needed
pub fn layout(blocks: &[Block]) -> DocumentLayout {
    let mut cursor = Cursor::new();
    let mut sections = Vec::new();
    let mut table_rows = 0;

    for block in blocks {
        match block {
            Block::Title(text) => {
                sections.push(place_text(&mut cursor, text, &TITLE_STYLE));
            }
            Block::Heading(text) => {
                sections.push(place_text(&mut cursor, text, &HEADING_STYLE));
            }
            Block::Paragraph(text) => {
                place_text(&mut cursor, text, &BODY_STYLE);
            }
            Block::Note(text) => {
                place_text(&mut cursor, text, &NOTE_STYLE);
            }
            Block::Spacer(height) => {
                // Gaps are dropped at page breaks
                if *height >= cursor.remaining() {
                    cursor.new_page();
                } else if !cursor.at_top() {
                    cursor.y -= height;
                }
            }
            Block::Table(table) => {
                table_rows += place_table(&mut cursor, table);
            }
            Block::Image { index, width, height } => {
                cursor.ensure(*height);
                cursor.y -= height;
                cursor.push(DrawOp::Image {
                    index: *index,
                    x: MARGIN + (FRAME_WIDTH - width).max(0.0) / 2.0,
                    y: cursor.y,
                    width: *width,
                    height: *height,
                });
            }
        }
    }

    DocumentLayout {
        pages: cursor.pages,
        sections,
        table_rows,
    }
}

fn place_text(cursor: &mut Cursor, text: &str, style: &TextStyle) -> Section {
    let lines = wrap(text, FRAME_WIDTH, style.size, style.weight);

    if !cursor.at_top() {
        cursor.y -= style.space_before;
    }
    if style.keep_with_next {
        cursor.ensure(lines.len() as f32 * style.leading + 2.0 * BODY_STYLE.leading);
    }
    let section = Section {
        title: text.to_string(),
        page: cursor.page_number(),
    };

    for line in lines {
        cursor.ensure(style.leading);
        cursor.y -= style.leading;
        let x = if style.centered {
            MARGIN + (FRAME_WIDTH - text_width(&line, style.size, style.weight)).max(0.0) / 2.0
        } else {
            MARGIN
        };
        cursor.push(DrawOp::Text {
            x,
            y: cursor.y + 0.2 * style.leading,
            size: style.size,
            weight: style.weight,
            color: BLACK,
            text: line,
        });
    }

    cursor.y -= style.space_after;
    section
}

/// First column sized to its widest label, the rest share the remaining width
fn column_widths(table: &TableBlock) -> Vec<f32> {
    let columns = table.header.len();
    if columns == 0 {
        return Vec::new();
    }

    let label_width = std::iter::once(&table.header[0])
        .chain(table.rows.iter().filter_map(|row| row.first()))
        .map(|label| text_width(label, TABLE_FONT_SIZE, FontWeight::Bold) + 2.0 * CELL_PAD_X)
        .fold(0.0, f32::max)
        .min(MAX_LABEL_COLUMN);

    if columns == 1 {
        return vec![label_width];
    }
    let rest = ((FRAME_WIDTH - label_width) / (columns - 1) as f32).max(0.0);
    std::iter::once(label_width)
        .chain(std::iter::repeat(rest).take(columns - 1))
        .collect()
}

fn place_row(cursor: &mut Cursor, cells: &[String], widths: &[f32], header: bool) {
    let total: f32 = widths.iter().sum();
    let top = cursor.y;
    let bottom = top - ROW_HEIGHT;

    if header {
        cursor.push(DrawOp::FillRect {
            x: MARGIN,
            y: bottom,
            width: total,
            height: ROW_HEIGHT,
            color: GREY,
        });
    }

    let mut x = MARGIN;
    for (cell, width) in cells.iter().zip(widths) {
        let text = fit(cell, width - 2.0 * CELL_PAD_X, TABLE_FONT_SIZE, FontWeight::Regular);
        if !text.is_empty() {
            cursor.push(DrawOp::Text {
                x: x + CELL_PAD_X,
                y: bottom + CELL_PAD_Y + 2.0,
                size: TABLE_FONT_SIZE,
                weight: FontWeight::Regular,
                color: if header { WHITESMOKE } else { BLACK },
                text,
            });
        }
        x += width;
    }

    for y in [top, bottom] {
        cursor.push(DrawOp::Line {
            from: (MARGIN, y),
            to: (MARGIN + total, y),
            thickness: GRID_THICKNESS,
        });
    }
    let mut x = MARGIN;
    for edge in std::iter::once(0.0).chain(widths.iter().copied()) {
        x += edge;
        cursor.push(DrawOp::Line {
            from: (x, top),
            to: (x, bottom),
            thickness: GRID_THICKNESS,
        });
    }

    cursor.y = bottom;
}

/// Place the table, repeating the header after every page break. Returns
/// the number of body rows placed.
fn place_table(cursor: &mut Cursor, table: &TableBlock) -> usize {
    let widths = column_widths(table);
    if widths.is_empty() {
        return 0;
    }

    cursor.ensure(2.0 * ROW_HEIGHT);
    place_row(cursor, &table.header, &widths, true);

    for row in &table.rows {
        if ROW_HEIGHT > cursor.remaining() {
            cursor.new_page();
            place_row(cursor, &table.header, &widths, true);
        }
        place_row(cursor, row, &widths, false);
    }
    table.rows.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: usize) -> TableBlock {
        TableBlock {
            header: vec!["column".into(), "count".into(), "mean".into()],
            rows: (0..rows)
                .map(|i| vec![format!("sensor_{}", i), "10.0".into(), "1.5".into()])
                .collect(),
        }
    }

    fn header_fills(page: &Page) -> usize {
        page.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { color, .. } if *color == GREY))
            .count()
    }

    #[test]
    fn test_short_document_fits_one_page() {
        let blocks = vec![
            Block::Title("Report".into()),
            Block::Heading("1. Intro".into()),
            Block::Paragraph("Hello world".into()),
        ];
        let doc = layout(&blocks);

        assert_eq!(doc.pages.len(), 1);
        assert_eq!(
            doc.sections,
            vec![
                Section { title: "Report".into(), page: 1 },
                Section { title: "1. Intro".into(), page: 1 },
            ]
        );
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "word ".repeat(200);
        let lines = wrap(&text, 200.0, 10.0, FontWeight::Regular);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 10.0, FontWeight::Regular) <= 200.0);
        }
        assert_eq!(lines.join(" ").split_whitespace().count(), 200);
    }

    #[test]
    fn test_long_word_gets_own_line() {
        let lines = wrap("a averyveryverylongword b", 20.0, 10.0, FontWeight::Regular);
        assert_eq!(lines, vec!["a", "averyveryverylongword", "b"]);
    }

    #[test]
    fn test_table_header_repeats_on_each_page() {
        let doc = layout(&[Block::Table(table(120))]);

        assert!(doc.pages.len() > 1);
        assert_eq!(doc.table_rows, 120);
        for page in &doc.pages {
            assert_eq!(header_fills(page), 1);
        }
    }

    #[test]
    fn test_header_text_is_whitesmoke() {
        let doc = layout(&[Block::Table(table(1))]);
        let header_text: Vec<_> = doc.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, color, .. } if *color == WHITESMOKE => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(header_text, vec!["column", "count", "mean"]);
    }

    #[test]
    fn test_content_stays_inside_margins() {
        let doc = layout(&[
            Block::Title("Report".into()),
            Block::Paragraph("text ".repeat(500)),
            Block::Table(table(80)),
        ]);

        for page in &doc.pages {
            for op in &page.ops {
                if let DrawOp::Text { y, .. } = op {
                    assert!(*y >= MARGIN && *y <= PAGE_HEIGHT - MARGIN);
                }
            }
        }
    }

    #[test]
    fn test_image_moves_to_next_page_when_short_of_space() {
        let mut blocks = vec![Block::Paragraph("line ".repeat(40))];
        blocks.push(Block::Spacer(FRAME_TOP - MARGIN - 150.0));
        blocks.push(Block::Image {
            index: 0,
            width: 360.0,
            height: 216.0,
        });
        let doc = layout(&blocks);

        assert_eq!(doc.pages.len(), 2);
        let image = doc.pages[1].ops.iter().find_map(|op| match op {
            DrawOp::Image { x, y, .. } => Some((*x, *y)),
            _ => None,
        });
        let (x, y) = image.unwrap();
        assert!((x - (MARGIN + (FRAME_WIDTH - 360.0) / 2.0)).abs() < 1e-3);
        assert!((y - (FRAME_TOP - 216.0)).abs() < 1e-3);
    }

    #[test]
    fn test_long_cells_are_truncated() {
        let fitted = fit("operating_mode_extremely_long_name", 60.0, 8.0, FontWeight::Regular);
        assert!(fitted.ends_with("..."));
        assert!(text_width(&fitted, 8.0, FontWeight::Regular) <= 60.0);
    }

    #[test]
    fn test_non_ascii_counts_full_em() {
        assert_eq!(text_width("温度", 10.0, FontWeight::Regular), 20.0);
        assert!(text_width("é", 10.0, FontWeight::Regular) > text_width("e", 10.0, FontWeight::Regular));

        let name = "温度传感器振动读数";
        let fitted = fit(name, 60.0, 8.0, FontWeight::Regular);
        assert!(fitted.ends_with("..."));
        assert!(fitted.chars().count() < name.chars().count());
        assert!(text_width(&fitted, 8.0, FontWeight::Regular) <= 60.0);
    }
}

//! Structural model of a layout template, shared across crates.
//!
//! A template is an ordered list of pages; each page carries its section
//! geometry and the body blocks (paragraphs and tables) that belong to it.
//! Table cells keep their pre-merge-collapse `(row, col)` addresses because
//! merge reconstruction and value propagation both depend on them.

use serde::{Deserialize, Serialize};

pub mod units;

/// Formatting snapshot of a single run, copied verbatim into output runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    pub text: String,
    pub font_name: Option<String>,
    /// Size in points; DOCX stores half-points, converted on read.
    pub font_size_pt: Option<f32>,
    /// `None` means "inherit", not "off".
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    /// Six-hex-digit RGB, no leading `#`.
    pub color: Option<String>,
}

/// Paragraph justification, mirroring the OOXML `w:jc` values we care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    Distribute,
}

impl Alignment {
    pub fn as_jc_val(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
            Alignment::Distribute => "distribute",
        }
    }

    pub fn from_jc_val(val: &str) -> Option<Self> {
        match val {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" => Some(Alignment::Justify),
            "distribute" => Some(Alignment::Distribute),
            _ => None,
        }
    }
}

/// A paragraph as read from the template: its runs plus their merged text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphModel {
    pub runs: Vec<RunStyle>,
    /// Concatenation of all run texts, the unit the matcher works with.
    pub text: String,
    pub alignment: Option<Alignment>,
}

impl ParagraphModel {
    pub fn from_runs(runs: Vec<RunStyle>, alignment: Option<Alignment>) -> Self {
        let text = runs.iter().map(|r| r.text.as_str()).collect();
        Self { runs, text, alignment }
    }

    pub fn first_run(&self) -> Option<&RunStyle> {
        self.runs.first()
    }
}

/// One side of a border. Attribute values are kept as the raw OOXML strings
/// so a rewrite emits exactly what the template declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderSide {
    /// `w:val`, e.g. `single`, `double`, `nil`.
    pub val: String,
    /// `w:sz` in eighths of a point.
    pub size: Option<String>,
    pub color: Option<String>,
    pub space: Option<String>,
}

/// Border set for a table or cell. Tables use all six sides; cells only the
/// outer four.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderSpec {
    pub top: Option<BorderSide>,
    pub bottom: Option<BorderSide>,
    pub left: Option<BorderSide>,
    pub right: Option<BorderSide>,
    pub inside_h: Option<BorderSide>,
    pub inside_v: Option<BorderSide>,
}

impl BorderSpec {
    pub fn is_empty(&self) -> bool {
        self.top.is_none()
            && self.bottom.is_none()
            && self.left.is_none()
            && self.right.is_none()
            && self.inside_h.is_none()
            && self.inside_v.is_none()
    }

    /// Resolve a cell's effective borders: each outer side falls back to the
    /// table's border for that side independently when the cell declares none.
    pub fn cell_with_table_fallback(
        cell: Option<BorderSpec>,
        table: Option<&BorderSpec>,
    ) -> Option<BorderSpec> {
        let mut out = cell.unwrap_or_default();
        if let Some(t) = table {
            if out.top.is_none() {
                out.top = t.top.clone();
            }
            if out.bottom.is_none() {
                out.bottom = t.bottom.clone();
            }
            if out.left.is_none() {
                out.left = t.left.clone();
            }
            if out.right.is_none() {
                out.right = t.right.clone();
            }
        }
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }
}

/// Vertical-merge role of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VMerge {
    #[default]
    None,
    /// Top cell of a merged run; owns the content.
    Restart,
    /// Merged-away cell; carries no independent content.
    Continue,
}

/// A table cell in pre-merge-collapse addressing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellModel {
    pub row: usize,
    pub col: usize,
    /// Horizontal span in grid columns, at least 1.
    pub grid_span: usize,
    pub vmerge: VMerge,
    /// Effective borders after table fallback was applied.
    pub borders: Option<BorderSpec>,
    /// Declared width in twentieths of a point (dxa).
    pub width_dxa: Option<f64>,
    /// Owning row's declared height in dxa, and its `w:hRule`.
    pub height_dxa: Option<f64>,
    pub height_rule: Option<String>,
    pub paragraphs: Vec<ParagraphModel>,
    /// Assigned during reconstruction, never by the template reader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filled_value: Option<String>,
}

impl CellModel {
    pub fn new(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            grid_span: 1,
            vmerge: VMerge::None,
            borders: None,
            width_dxa: None,
            height_dxa: None,
            height_rule: None,
            paragraphs: Vec::new(),
            filled_value: None,
        }
    }

    /// Text of the first paragraph, the cell's label surface.
    pub fn first_text(&self) -> &str {
        self.paragraphs.first().map(|p| p.text.as_str()).unwrap_or("")
    }

    pub fn first_run(&self) -> Option<&RunStyle> {
        self.paragraphs.first().and_then(|p| p.first_run())
    }

    pub fn first_alignment(&self) -> Option<Alignment> {
        self.paragraphs.first().and_then(|p| p.alignment)
    }

    /// A cell whose template text is empty; candidate target for propagated
    /// values.
    pub fn is_template_blank(&self) -> bool {
        self.first_text().is_empty()
    }

    /// All paragraph texts joined, used for the keyword inventory.
    pub fn merged_text(&self) -> String {
        self.paragraphs.iter().map(|p| p.text.as_str()).collect()
    }
}

/// A table with its cells in row-major, pre-merge-collapse order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableModel {
    /// Position of this table among the tables of its page.
    pub index: usize,
    pub borders: Option<BorderSpec>,
    pub cells: Vec<CellModel>,
}

impl TableModel {
    pub fn row_count(&self) -> usize {
        self.cells.iter().map(|c| c.row + 1).max().unwrap_or(0)
    }

    pub fn col_count(&self) -> usize {
        self.cells.iter().map(|c| c.col + 1).max().unwrap_or(0)
    }

    /// Per-column maximum declared width in dxa; 0.0 where nothing declared.
    pub fn column_widths(&self) -> Vec<f64> {
        let mut widths = vec![0.0f64; self.col_count()];
        for cell in &self.cells {
            if let Some(w) = cell.width_dxa {
                if w > widths[cell.col] {
                    widths[cell.col] = w;
                }
            }
        }
        widths
    }

    /// Per-row maximum declared height in dxa; 0.0 where nothing declared.
    pub fn row_heights(&self) -> Vec<f64> {
        let mut heights = vec![0.0f64; self.row_count()];
        for cell in &self.cells {
            if let Some(h) = cell.height_dxa {
                if h > heights[cell.row] {
                    heights[cell.row] = h;
                }
            }
        }
        heights
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&CellModel> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }
}

/// A body-level block in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentBlock {
    Paragraph(ParagraphModel),
    Table(TableModel),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Section geometry in centimeters, rounded to two decimals on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSettings {
    pub width_cm: f64,
    pub height_cm: f64,
    pub orientation: Orientation,
    pub top_margin_cm: f64,
    pub bottom_margin_cm: f64,
    pub left_margin_cm: f64,
    pub right_margin_cm: f64,
    pub header_distance_cm: f64,
    pub footer_distance_cm: f64,
    pub gutter_cm: f64,
}

impl Default for PageSettings {
    /// A4 portrait with one-inch margins, the Word defaults.
    fn default() -> Self {
        Self {
            width_cm: 21.0,
            height_cm: 29.7,
            orientation: Orientation::Portrait,
            top_margin_cm: 2.54,
            bottom_margin_cm: 2.54,
            left_margin_cm: 2.54,
            right_margin_cm: 2.54,
            header_distance_cm: 1.27,
            footer_distance_cm: 1.27,
            gutter_cm: 0.0,
        }
    }
}

/// One template page: its geometry plus the blocks its section closes over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageTemplate {
    pub index: usize,
    #[serde(default)]
    pub settings: PageSettings,
    pub blocks: Vec<ContentBlock>,
}

/// The whole template, built once and read-only during reconstruction apart
/// from the derived `filled_value` annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateModel {
    pub pages: Vec<PageTemplate>,
}

impl TemplateModel {
    /// Distinct non-empty body-paragraph texts, first-seen order preserved.
    pub fn paragraph_texts(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for page in &self.pages {
            for block in &page.blocks {
                if let ContentBlock::Paragraph(p) = block {
                    push_distinct(&mut out, p.text.trim());
                }
            }
        }
        out
    }

    /// Distinct non-empty cell texts (all paragraphs of a cell merged),
    /// first-seen order preserved.
    pub fn cell_texts(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for page in &self.pages {
            for block in &page.blocks {
                if let ContentBlock::Table(t) = block {
                    for cell in &t.cells {
                        push_distinct(&mut out, cell.merged_text().trim());
                    }
                }
            }
        }
        out
    }

    /// Paragraph texts followed by cell texts, the seed of the keyword index.
    pub fn text_inventory(&self) -> Vec<String> {
        let mut out = self.paragraph_texts();
        for t in self.cell_texts() {
            push_distinct(&mut out, &t);
        }
        out
    }
}

fn push_distinct(list: &mut Vec<String>, text: &str) {
    if !text.is_empty() && !list.iter().any(|t| t == text) {
        list.push(text.to_string());
    }
}

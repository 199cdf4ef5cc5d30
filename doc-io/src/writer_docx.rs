//! DOCX writer: assembles a complete OOXML package from reconstructed
//! content.
//!
//! Sections are buffered in memory and serialized on [`DocxWriter::save`].
//! Every section but the last is closed by an empty paragraph carrying its
//! `w:sectPr`; the last becomes the body-level one, the way word processors
//! lay out multi-section documents. Sections after the first start as
//! `continuous` so no implicit page break doubles the explicit ones the
//! caller emits.

use crate::DocIoError;
use chrono::Utc;
use layout_model::units::{cm_to_twips, pt_to_half_points};
use layout_model::{Alignment, BorderSide, BorderSpec, Orientation, PageSettings, RunStyle, VMerge};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::Write as _;
use zip::write::FileOptions;
use zip::ZipWriter;

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Formatting applied to text the template declares no run style for.
const DEFAULT_FONT_NAME: &str = "맑은 고딕";
const DEFAULT_FONT_SIZE_PT: f32 = 10.5;

type XmlWriter = Writer<Vec<u8>>;

/// Buffered output document. Blocks accumulate into the current section
/// until [`DocxWriter::save`] serializes the whole package.
#[derive(Debug, Clone, Default)]
pub struct DocxWriter {
    sections: Vec<SectionOut>,
}

#[derive(Debug, Clone)]
struct SectionOut {
    settings: PageSettings,
    blocks: Vec<BlockOut>,
}

#[derive(Debug, Clone)]
enum BlockOut {
    Paragraph(ParagraphOut),
    PageBreak,
    Table(TableBuilder),
}

#[derive(Debug, Clone)]
struct ParagraphOut {
    text: String,
    alignment: Option<Alignment>,
    style: Option<RunStyle>,
}

impl DocxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new section; subsequent blocks belong to it.
    pub fn start_section(&mut self, settings: &PageSettings) {
        self.sections.push(SectionOut {
            settings: settings.clone(),
            blocks: Vec::new(),
        });
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Append a paragraph with a single run. `style: None` applies the
    /// default 맑은 고딕 10.5pt regular formatting.
    pub fn add_paragraph(&mut self, text: &str, alignment: Option<Alignment>, style: Option<&RunStyle>) {
        let block = BlockOut::Paragraph(ParagraphOut {
            text: text.to_string(),
            alignment,
            style: style.cloned(),
        });
        self.current_section().blocks.push(block);
    }

    /// Append an explicit page break.
    pub fn add_page_break(&mut self) {
        self.current_section().blocks.push(BlockOut::PageBreak);
    }

    /// Append a finished table.
    pub fn push_table(&mut self, table: TableBuilder) {
        self.current_section().blocks.push(BlockOut::Table(table));
    }

    /// Serialize the package: content types, relationships, core properties
    /// and the document part.
    pub fn save(&self, path: &str) -> Result<(), DocIoError> {
        let document = self.build_document_xml()?;
        let core = build_core_xml();
        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::default();

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES_XML.as_bytes())?;
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(ROOT_RELS_XML.as_bytes())?;
        zip.start_file("word/_rels/document.xml.rels", options)?;
        zip.write_all(DOCUMENT_RELS_XML.as_bytes())?;
        zip.start_file("docProps/core.xml", options)?;
        zip.write_all(core.as_bytes())?;
        zip.start_file("word/document.xml", options)?;
        zip.write_all(&document)?;
        zip.finish()?;
        Ok(())
    }

    fn current_section(&mut self) -> &mut SectionOut {
        if self.sections.is_empty() {
            self.sections.push(SectionOut {
                settings: PageSettings::default(),
                blocks: Vec::new(),
            });
        }
        self.sections.last_mut().unwrap()
    }

    fn build_document_xml(&self) -> Result<Vec<u8>, DocIoError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let mut document = BytesStart::new("w:document");
        document.push_attribute(("xmlns:w", WORD_NS));
        writer.write_event(Event::Start(document))?;
        write_start(&mut writer, "w:body")?;

        for (index, section) in self.sections.iter().enumerate() {
            for block in &section.blocks {
                match block {
                    BlockOut::Paragraph(para) => write_paragraph(
                        &mut writer,
                        &para.text,
                        para.alignment,
                        para.style.as_ref(),
                    )?,
                    BlockOut::PageBreak => write_page_break(&mut writer)?,
                    BlockOut::Table(table) => write_table(&mut writer, table)?,
                }
            }
            let continuous = index > 0;
            if index + 1 == self.sections.len() {
                write_sect_pr(&mut writer, &section.settings, continuous)?;
            } else {
                // Close the section with an empty paragraph carrying it.
                write_start(&mut writer, "w:p")?;
                write_start(&mut writer, "w:pPr")?;
                write_sect_pr(&mut writer, &section.settings, continuous)?;
                write_end(&mut writer, "w:pPr")?;
                write_end(&mut writer, "w:p")?;
            }
        }
        if self.sections.is_empty() {
            write_sect_pr(&mut writer, &PageSettings::default(), false)?;
        }

        write_end(&mut writer, "w:body")?;
        write_end(&mut writer, "w:document")?;
        Ok(writer.into_inner())
    }
}

/// Table under construction. Cells are addressed by their grid position
/// before any merge collapses them; merge operations validate their targets
/// and report failures instead of corrupting the grid.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    rows: usize,
    cols: usize,
    borders: Option<BorderSpec>,
    col_widths: Vec<i64>,
    row_heights: Vec<i64>,
    cells: Vec<CellOut>,
}

#[derive(Debug, Clone)]
struct CellOut {
    text: Option<String>,
    alignment: Option<Alignment>,
    style: Option<RunStyle>,
    borders: Option<BorderSpec>,
    /// Top and bottom cell margins in dxa.
    margins: Option<(i64, i64)>,
    grid_span: usize,
    h_covered: bool,
    v_merge: VMerge,
}

impl Default for CellOut {
    fn default() -> Self {
        Self {
            text: None,
            alignment: None,
            style: None,
            borders: None,
            margins: None,
            grid_span: 1,
            h_covered: false,
            v_merge: VMerge::None,
        }
    }
}

impl TableBuilder {
    pub fn new(rows: usize, cols: usize) -> Result<Self, DocIoError> {
        if rows == 0 || cols == 0 {
            return Err(DocIoError::InvalidTableShape { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            borders: None,
            col_widths: vec![0; cols],
            row_heights: vec![0; rows],
            cells: vec![CellOut::default(); rows * cols],
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn set_table_borders(&mut self, borders: &BorderSpec) {
        self.borders = Some(borders.clone());
    }

    /// Declare a column width in dxa; zero and negative values clear it.
    pub fn set_col_width(&mut self, col: usize, dxa: f64) -> Result<(), DocIoError> {
        if col >= self.cols {
            return Err(DocIoError::ColumnOutOfRange { col, cols: self.cols });
        }
        self.col_widths[col] = (dxa as i64).max(0);
        Ok(())
    }

    /// Declare an exact row height in dxa.
    pub fn set_row_height(&mut self, row: usize, dxa: f64) -> Result<(), DocIoError> {
        if row >= self.rows {
            return Err(DocIoError::RowOutOfRange { row, rows: self.rows });
        }
        self.row_heights[row] = (dxa as i64).max(0);
        Ok(())
    }

    pub fn set_cell_borders(&mut self, row: usize, col: usize, borders: &BorderSpec) -> Result<(), DocIoError> {
        let cell = self.cell_mut(row, col)?;
        cell.borders = Some(borders.clone());
        Ok(())
    }

    pub fn set_cell_margins(&mut self, row: usize, col: usize, top_dxa: i64, bottom_dxa: i64) -> Result<(), DocIoError> {
        let cell = self.cell_mut(row, col)?;
        cell.margins = Some((top_dxa, bottom_dxa));
        Ok(())
    }

    /// Put text with its formatting into a cell. Merged-away cells reject
    /// writes.
    pub fn write_cell(
        &mut self,
        row: usize,
        col: usize,
        text: &str,
        alignment: Option<Alignment>,
        style: Option<&RunStyle>,
    ) -> Result<(), DocIoError> {
        let cell = self.cell_mut(row, col)?;
        if cell.h_covered {
            return Err(DocIoError::Merge {
                row,
                col,
                message: "cell is covered by a horizontal merge".to_string(),
            });
        }
        if cell.v_merge == VMerge::Continue {
            return Err(DocIoError::Merge {
                row,
                col,
                message: "cell is merged away vertically".to_string(),
            });
        }
        cell.text = Some(text.to_string());
        cell.alignment = alignment;
        cell.style = style.cloned();
        Ok(())
    }

    /// Merge `span` grid columns starting at `(row, col)` into one cell.
    pub fn merge_right(&mut self, row: usize, col: usize, span: usize) -> Result<(), DocIoError> {
        if row >= self.rows {
            return Err(DocIoError::RowOutOfRange { row, rows: self.rows });
        }
        if span < 2 {
            return Ok(());
        }
        if col + span > self.cols {
            return Err(DocIoError::ColumnOutOfRange {
                col: col + span - 1,
                cols: self.cols,
            });
        }
        let anchor = self.cell(row, col);
        if anchor.h_covered || anchor.v_merge == VMerge::Continue {
            return Err(DocIoError::Merge {
                row,
                col,
                message: "anchor cell is already merged away".to_string(),
            });
        }
        for k in 1..span {
            let target = self.cell(row, col + k);
            if target.h_covered || target.grid_span > 1 {
                return Err(DocIoError::Merge {
                    row,
                    col: col + k,
                    message: "cell is already part of a horizontal merge".to_string(),
                });
            }
            if target.v_merge != VMerge::None {
                return Err(DocIoError::Merge {
                    row,
                    col: col + k,
                    message: "cell is part of a vertical merge".to_string(),
                });
            }
            if target.text.is_some() {
                return Err(DocIoError::Merge {
                    row,
                    col: col + k,
                    message: "cell already has content".to_string(),
                });
            }
        }
        self.cells[row * self.cols + col].grid_span = span;
        for k in 1..span {
            self.cells[row * self.cols + col + k].h_covered = true;
        }
        Ok(())
    }

    /// Merge `rows` rows starting at `(row, col)` into one cell. The merge
    /// covers the anchor's full horizontal span on every row.
    pub fn merge_down(&mut self, row: usize, col: usize, rows: usize) -> Result<(), DocIoError> {
        if col >= self.cols {
            return Err(DocIoError::ColumnOutOfRange { col, cols: self.cols });
        }
        if rows < 2 {
            return Ok(());
        }
        if row + rows > self.rows {
            return Err(DocIoError::RowOutOfRange {
                row: row + rows - 1,
                rows: self.rows,
            });
        }
        let anchor = self.cell(row, col);
        if anchor.h_covered || anchor.v_merge == VMerge::Continue {
            return Err(DocIoError::Merge {
                row,
                col,
                message: "anchor cell is already merged away".to_string(),
            });
        }
        let span = anchor.grid_span.max(1);
        for k in 1..rows {
            let below = self.cell(row + k, col);
            if below.h_covered {
                return Err(DocIoError::Merge {
                    row: row + k,
                    col,
                    message: "cell is already part of a horizontal merge".to_string(),
                });
            }
            if below.v_merge != VMerge::None {
                return Err(DocIoError::Merge {
                    row: row + k,
                    col,
                    message: "cell is part of a vertical merge".to_string(),
                });
            }
            if below.text.is_some() {
                return Err(DocIoError::Merge {
                    row: row + k,
                    col,
                    message: "cell already has content".to_string(),
                });
            }
            let below_span = below.grid_span.max(1);
            if below_span != 1 && below_span != span {
                return Err(DocIoError::Merge {
                    row: row + k,
                    col,
                    message: "cell spans a different width".to_string(),
                });
            }
            if below_span == 1 {
                for c in col + 1..col + span {
                    let side = self.cell(row + k, c);
                    if side.h_covered || side.grid_span > 1 || side.v_merge != VMerge::None || side.text.is_some() {
                        return Err(DocIoError::Merge {
                            row: row + k,
                            col: c,
                            message: "cell blocks the merged region".to_string(),
                        });
                    }
                }
            }
        }
        self.cells[row * self.cols + col].v_merge = VMerge::Restart;
        for k in 1..rows {
            let base = (row + k) * self.cols;
            self.cells[base + col].v_merge = VMerge::Continue;
            self.cells[base + col].grid_span = span;
            for c in col + 1..col + span {
                self.cells[base + c].h_covered = true;
            }
        }
        Ok(())
    }

    fn cell(&self, row: usize, col: usize) -> &CellOut {
        &self.cells[row * self.cols + col]
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> Result<&mut CellOut, DocIoError> {
        if row >= self.rows {
            return Err(DocIoError::RowOutOfRange { row, rows: self.rows });
        }
        if col >= self.cols {
            return Err(DocIoError::ColumnOutOfRange { col, cols: self.cols });
        }
        Ok(&mut self.cells[row * self.cols + col])
    }
}

fn default_run_style() -> RunStyle {
    RunStyle {
        text: String::new(),
        font_name: Some(DEFAULT_FONT_NAME.to_string()),
        font_size_pt: Some(DEFAULT_FONT_SIZE_PT),
        bold: Some(false),
        italic: Some(false),
        underline: Some(false),
        color: None,
    }
}

fn write_start(w: &mut XmlWriter, name: &'static str) -> Result<(), DocIoError> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn write_end(w: &mut XmlWriter, name: &'static str) -> Result<(), DocIoError> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_empty(w: &mut XmlWriter, name: &'static str, attrs: &[(&str, &str)]) -> Result<(), DocIoError> {
    let mut el = BytesStart::new(name);
    for (key, value) in attrs {
        el.push_attribute((*key, *value));
    }
    w.write_event(Event::Empty(el))?;
    Ok(())
}

fn write_paragraph(
    w: &mut XmlWriter,
    text: &str,
    alignment: Option<Alignment>,
    style: Option<&RunStyle>,
) -> Result<(), DocIoError> {
    write_start(w, "w:p")?;
    if let Some(alignment) = alignment {
        write_start(w, "w:pPr")?;
        write_empty(w, "w:jc", &[("w:val", alignment.as_jc_val())])?;
        write_end(w, "w:pPr")?;
    }
    let fallback;
    let style = match style {
        Some(style) => style,
        None => {
            fallback = default_run_style();
            &fallback
        }
    };
    write_run(w, text, style)?;
    write_end(w, "w:p")
}

fn write_run(w: &mut XmlWriter, text: &str, style: &RunStyle) -> Result<(), DocIoError> {
    write_start(w, "w:r")?;
    write_run_properties(w, style)?;
    let mut t = BytesStart::new("w:t");
    t.push_attribute(("xml:space", "preserve"));
    w.write_event(Event::Start(t))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    write_end(w, "w:t")?;
    write_end(w, "w:r")
}

fn write_run_properties(w: &mut XmlWriter, style: &RunStyle) -> Result<(), DocIoError> {
    let has_any = style.font_name.is_some()
        || style.font_size_pt.is_some()
        || style.bold.is_some()
        || style.italic.is_some()
        || style.underline.is_some()
        || style.color.is_some();
    if !has_any {
        return Ok(());
    }
    write_start(w, "w:rPr")?;
    if let Some(font) = &style.font_name {
        write_empty(
            w,
            "w:rFonts",
            &[
                ("w:ascii", font.as_str()),
                ("w:eastAsia", font.as_str()),
                ("w:hAnsi", font.as_str()),
                ("w:cs", font.as_str()),
            ],
        )?;
    }
    if let Some(bold) = style.bold {
        if bold {
            write_empty(w, "w:b", &[])?;
        } else {
            write_empty(w, "w:b", &[("w:val", "0")])?;
        }
    }
    if let Some(italic) = style.italic {
        if italic {
            write_empty(w, "w:i", &[])?;
        } else {
            write_empty(w, "w:i", &[("w:val", "0")])?;
        }
    }
    if let Some(color) = &style.color {
        write_empty(w, "w:color", &[("w:val", color.as_str())])?;
    }
    if let Some(size) = style.font_size_pt {
        let half = pt_to_half_points(size).to_string();
        write_empty(w, "w:sz", &[("w:val", half.as_str())])?;
        write_empty(w, "w:szCs", &[("w:val", half.as_str())])?;
    }
    if let Some(underline) = style.underline {
        let val = if underline { "single" } else { "none" };
        write_empty(w, "w:u", &[("w:val", val)])?;
    }
    write_end(w, "w:rPr")
}

fn write_page_break(w: &mut XmlWriter) -> Result<(), DocIoError> {
    write_start(w, "w:p")?;
    write_start(w, "w:r")?;
    write_empty(w, "w:br", &[("w:type", "page")])?;
    write_end(w, "w:r")?;
    write_end(w, "w:p")
}

fn write_table(w: &mut XmlWriter, table: &TableBuilder) -> Result<(), DocIoError> {
    write_start(w, "w:tbl")?;
    write_start(w, "w:tblPr")?;
    write_empty(w, "w:tblW", &[("w:w", "0"), ("w:type", "auto")])?;
    if let Some(borders) = &table.borders {
        write_border_set(w, "w:tblBorders", borders)?;
    }
    write_end(w, "w:tblPr")?;

    write_start(w, "w:tblGrid")?;
    for col in 0..table.cols {
        let width = table.col_widths[col];
        if width > 0 {
            let width_attr = width.to_string();
            write_empty(w, "w:gridCol", &[("w:w", width_attr.as_str())])?;
        } else {
            write_empty(w, "w:gridCol", &[])?;
        }
    }
    write_end(w, "w:tblGrid")?;

    for row in 0..table.rows {
        write_start(w, "w:tr")?;
        let height = table.row_heights[row];
        if height > 0 {
            let height_attr = height.to_string();
            write_start(w, "w:trPr")?;
            write_empty(
                w,
                "w:trHeight",
                &[("w:val", height_attr.as_str()), ("w:hRule", "exact")],
            )?;
            write_end(w, "w:trPr")?;
        }
        for col in 0..table.cols {
            let cell = table.cell(row, col);
            if cell.h_covered {
                continue;
            }
            write_cell_element(w, table, cell, col)?;
        }
        write_end(w, "w:tr")?;
    }
    write_end(w, "w:tbl")
}

fn write_cell_element(
    w: &mut XmlWriter,
    table: &TableBuilder,
    cell: &CellOut,
    col: usize,
) -> Result<(), DocIoError> {
    write_start(w, "w:tc")?;
    let span = cell.grid_span.max(1);
    // A spanning cell is as wide as all of the grid columns it covers.
    let width: i64 = (col..col + span)
        .map(|c| table.col_widths.get(c).copied().unwrap_or(0))
        .sum();
    let has_tcpr = width > 0
        || span > 1
        || cell.v_merge != VMerge::None
        || cell.borders.is_some()
        || cell.margins.is_some();
    if has_tcpr {
        write_start(w, "w:tcPr")?;
        if width > 0 {
            let width_attr = width.to_string();
            write_empty(w, "w:tcW", &[("w:w", width_attr.as_str()), ("w:type", "dxa")])?;
        }
        if span > 1 {
            let span_attr = span.to_string();
            write_empty(w, "w:gridSpan", &[("w:val", span_attr.as_str())])?;
        }
        match cell.v_merge {
            VMerge::Restart => write_empty(w, "w:vMerge", &[("w:val", "restart")])?,
            VMerge::Continue => write_empty(w, "w:vMerge", &[])?,
            VMerge::None => {}
        }
        if let Some(borders) = &cell.borders {
            write_border_set(w, "w:tcBorders", borders)?;
        }
        if let Some((top, bottom)) = cell.margins {
            let top_attr = top.to_string();
            let bottom_attr = bottom.to_string();
            write_start(w, "w:tcMar")?;
            write_empty(w, "w:top", &[("w:w", top_attr.as_str()), ("w:type", "dxa")])?;
            write_empty(w, "w:bottom", &[("w:w", bottom_attr.as_str()), ("w:type", "dxa")])?;
            write_end(w, "w:tcMar")?;
        }
        write_end(w, "w:tcPr")?;
    }
    match &cell.text {
        Some(text) => write_paragraph(w, text, cell.alignment, cell.style.as_ref())?,
        None => w.write_event(Event::Empty(BytesStart::new("w:p")))?,
    }
    write_end(w, "w:tc")
}

fn write_border_set(w: &mut XmlWriter, name: &'static str, spec: &BorderSpec) -> Result<(), DocIoError> {
    write_start(w, name)?;
    let sides = [
        ("w:top", &spec.top),
        ("w:left", &spec.left),
        ("w:bottom", &spec.bottom),
        ("w:right", &spec.right),
        ("w:insideH", &spec.inside_h),
        ("w:insideV", &spec.inside_v),
    ];
    for (tag, side) in sides {
        if let Some(side) = side {
            write_border_side(w, tag, side)?;
        }
    }
    write_end(w, name)
}

fn write_border_side(w: &mut XmlWriter, tag: &'static str, side: &BorderSide) -> Result<(), DocIoError> {
    let mut el = BytesStart::new(tag);
    el.push_attribute(("w:val", side.val.as_str()));
    el.push_attribute(("w:sz", side.size.as_deref().unwrap_or("4")));
    el.push_attribute(("w:color", side.color.as_deref().unwrap_or("000000")));
    if let Some(space) = &side.space {
        el.push_attribute(("w:space", space.as_str()));
    }
    w.write_event(Event::Empty(el))?;
    Ok(())
}

fn write_sect_pr(w: &mut XmlWriter, settings: &PageSettings, continuous: bool) -> Result<(), DocIoError> {
    write_start(w, "w:sectPr")?;
    if continuous {
        write_empty(w, "w:type", &[("w:val", "continuous")])?;
    }
    let orient = match settings.orientation {
        Orientation::Portrait => "portrait",
        Orientation::Landscape => "landscape",
    };
    let width = cm_to_twips(settings.width_cm).to_string();
    let height = cm_to_twips(settings.height_cm).to_string();
    write_empty(
        w,
        "w:pgSz",
        &[
            ("w:w", width.as_str()),
            ("w:h", height.as_str()),
            ("w:orient", orient),
        ],
    )?;
    let top = cm_to_twips(settings.top_margin_cm).to_string();
    let right = cm_to_twips(settings.right_margin_cm).to_string();
    let bottom = cm_to_twips(settings.bottom_margin_cm).to_string();
    let left = cm_to_twips(settings.left_margin_cm).to_string();
    let header = cm_to_twips(settings.header_distance_cm).to_string();
    let footer = cm_to_twips(settings.footer_distance_cm).to_string();
    let gutter = cm_to_twips(settings.gutter_cm).to_string();
    write_empty(
        w,
        "w:pgMar",
        &[
            ("w:top", top.as_str()),
            ("w:right", right.as_str()),
            ("w:bottom", bottom.as_str()),
            ("w:left", left.as_str()),
            ("w:header", header.as_str()),
            ("w:footer", footer.as_str()),
            ("w:gutter", gutter.as_str()),
        ],
    )?;
    write_empty(w, "w:cols", &[("w:space", "708")])?;
    write_empty(w, "w:docGrid", &[("w:linePitch", "360")])?;
    write_end(w, "w:sectPr")
}

const CONTENT_TYPES_XML: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
    "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
    "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
    "<Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>",
    "<Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>",
    "</Types>",
);

const ROOT_RELS_XML: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    "<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"word/document.xml\"/>",
    "<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\" Target=\"docProps/core.xml\"/>",
    "</Relationships>",
);

const DOCUMENT_RELS_XML: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\"/>",
);

fn build_core_xml() -> String {
    let stamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
            "<cp:coreProperties",
            " xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\"",
            " xmlns:dc=\"http://purl.org/dc/elements/1.1/\"",
            " xmlns:dcterms=\"http://purl.org/dc/terms/\"",
            " xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">",
            "<dc:creator>formfill</dc:creator>",
            "<cp:lastModifiedBy>formfill</cp:lastModifiedBy>",
            "<dcterms:created xsi:type=\"dcterms:W3CDTF\">{stamp}</dcterms:created>",
            "<dcterms:modified xsi:type=\"dcterms:W3CDTF\">{stamp}</dcterms:modified>",
            "</cp:coreProperties>",
        ),
        stamp = stamp,
    )
}

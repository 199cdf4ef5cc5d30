//! DOCX template reader: lifts `word/document.xml` into a [`TemplateModel`].
//!
//! The walk is a single streaming pass over the body. Paragraph-level
//! `w:sectPr` elements close template pages as they appear; the body-level
//! `w:sectPr` closes the last one. Cell addresses are assigned on a per-row
//! grid cursor: a `gridSpan` cell is recorded once per column it covers, so
//! the pre-merge grid stays dense and downstream passes can collapse the
//! duplicates back into a single merged cell.

use crate::DocIoError;
use layout_model::units::{half_points_to_pt, twips_to_cm};
use layout_model::{
    Alignment, BorderSide, BorderSpec, CellModel, ContentBlock, Orientation, PageSettings,
    PageTemplate, ParagraphModel, RunStyle, TableModel, TemplateModel, VMerge,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;

const DOCUMENT_ENTRY: &str = "word/document.xml";

fn local_name(q: &[u8]) -> &[u8] {
    match q.iter().position(|&b| b == b':') {
        Some(i) => &q[i + 1..],
        None => q,
    }
}

fn attr_val(e: &BytesStart<'_>, key_local: &[u8]) -> Option<String> {
    for a in e.attributes().with_checks(false) {
        if let Ok(attr) = a {
            let k = local_name(attr.key.as_ref());
            if k == key_local {
                return Some(String::from_utf8_lossy(&attr.value).into_owned());
            }
        }
    }
    None
}

/// OOXML on/off toggle: the bare element means "on".
fn read_on_off(e: &BytesStart<'_>) -> bool {
    match attr_val(e, b"val").as_deref() {
        Some("0") | Some("false") | Some("off") | Some("none") => false,
        _ => true,
    }
}

/// Read a template `.docx` into its structural model.
pub fn read_template(path: &str) -> Result<TemplateModel, DocIoError> {
    let file = File::open(path)?;
    let mut zip = zip::ZipArchive::new(file)?;
    let mut doc_xml = String::new();
    match zip.by_name(DOCUMENT_ENTRY) {
        Ok(mut entry) => {
            entry.read_to_string(&mut doc_xml)?;
        }
        Err(_) => {
            return Err(DocIoError::MissingEntry {
                path: path.to_string(),
                entry: DOCUMENT_ENTRY.to_string(),
            })
        }
    }
    parse_document(&doc_xml)
}

/// Parse the raw `word/document.xml` markup. Split out so reader tests can
/// feed hand-written bodies without packing a zip.
pub fn parse_document(doc_xml: &str) -> Result<TemplateModel, DocIoError> {
    let mut reader = Reader::from_str(doc_xml);
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut parser = DocumentParser::default();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => parser.handle_start(&e),
            Ok(Event::Empty(e)) => parser.handle_empty(&e),
            Ok(Event::End(e)) => parser.handle_end(local_name(e.name().as_ref())),
            Ok(Event::Text(t)) => {
                if parser.in_t && parser.skip_depth == 0 {
                    if let Ok(cow) = t.unescape() {
                        parser.push_text(&cow);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocIoError::Xml(e)),
            _ => {}
        }
    }

    // A well-formed body closed itself; salvage whatever a truncated one left.
    if !parser.body_closed && (!parser.blocks.is_empty() || parser.pages.is_empty()) {
        parser.close_final_page();
    }
    Ok(TemplateModel {
        pages: parser.pages,
    })
}

#[derive(Default)]
struct RunAccum {
    text: String,
    font_name: Option<String>,
    font_size_pt: Option<f32>,
    bold: Option<bool>,
    italic: Option<bool>,
    underline: Option<bool>,
    color: Option<String>,
}

impl RunAccum {
    fn into_style(self) -> RunStyle {
        RunStyle {
            text: self.text,
            font_name: self.font_name,
            font_size_pt: self.font_size_pt,
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            color: self.color,
        }
    }
}

#[derive(Default)]
struct ParaAccum {
    runs: Vec<RunStyle>,
    alignment: Option<Alignment>,
}

struct CellAccum {
    grid_span: usize,
    vmerge: VMerge,
    borders: Option<BorderSpec>,
    width_dxa: Option<f64>,
    paragraphs: Vec<ParagraphModel>,
}

impl CellAccum {
    fn new() -> Self {
        Self {
            grid_span: 1,
            vmerge: VMerge::None,
            borders: None,
            width_dxa: None,
            paragraphs: Vec::new(),
        }
    }
}

#[derive(Default)]
struct RowAccum {
    height_dxa: Option<f64>,
    height_rule: Option<String>,
    col_cursor: usize,
}

#[derive(Default)]
struct TableAccum {
    borders: Option<BorderSpec>,
    cells: Vec<CellModel>,
    next_row: usize,
}

#[derive(Default)]
struct DocumentParser {
    pages: Vec<PageTemplate>,
    blocks: Vec<ContentBlock>,
    table_index: usize,

    para: Option<ParaAccum>,
    run: Option<RunAccum>,
    in_t: bool,
    in_ppr: bool,
    in_rpr: bool,

    table: Option<TableAccum>,
    row: Option<RowAccum>,
    cell: Option<CellAccum>,
    in_tcpr: bool,
    in_trpr: bool,
    in_tc_borders: bool,
    in_tbl_borders: bool,

    sect: Option<PageSettings>,
    /// Paragraph-level sectPr parsed but waiting for its `</w:p>`.
    pending_page_close: Option<PageSettings>,
    body_sect: Option<PageSettings>,
    body_closed: bool,

    /// Name and depth of a subtree being ignored (nested tables, text boxes).
    skip_tag: Option<Vec<u8>>,
    skip_depth: usize,
}

impl DocumentParser {
    fn handle_start(&mut self, e: &BytesStart<'_>) {
        let qname = e.name();
        let name = local_name(qname.as_ref());
        if self.skip_depth > 0 {
            if Some(name) == self.skip_tag.as_deref() {
                self.skip_depth += 1;
            }
            return;
        }
        match name {
            b"tbl" => {
                if self.table.is_some() {
                    // Nested table: the cell keeps only its direct paragraphs.
                    self.skip_tag = Some(name.to_vec());
                    self.skip_depth = 1;
                } else {
                    self.table = Some(TableAccum::default());
                }
            }
            b"txbxContent" => {
                self.skip_tag = Some(name.to_vec());
                self.skip_depth = 1;
            }
            b"tr" => {
                if self.table.is_some() {
                    self.row = Some(RowAccum::default());
                }
            }
            b"tc" => {
                if self.row.is_some() {
                    self.cell = Some(CellAccum::new());
                }
            }
            b"p" => {
                self.para = Some(ParaAccum::default());
            }
            b"r" => {
                if self.para.is_some() {
                    self.run = Some(RunAccum::default());
                }
            }
            b"t" => {
                if self.run.is_some() {
                    self.in_t = true;
                }
            }
            b"pPr" => {
                if self.para.is_some() {
                    self.in_ppr = true;
                }
            }
            b"rPr" => {
                self.in_rpr = true;
            }
            b"tcPr" => {
                if self.cell.is_some() {
                    self.in_tcpr = true;
                }
            }
            b"trPr" => {
                if self.row.is_some() {
                    self.in_trpr = true;
                }
            }
            b"tcBorders" => {
                if self.in_tcpr {
                    self.in_tc_borders = true;
                }
            }
            b"tblBorders" => {
                if self.table.is_some() && self.cell.is_none() {
                    self.in_tbl_borders = true;
                }
            }
            b"sectPr" => {
                self.sect = Some(PageSettings::default());
            }
            other => self.handle_property(other, e),
        }
    }

    fn handle_empty(&mut self, e: &BytesStart<'_>) {
        if self.skip_depth > 0 {
            return;
        }
        let qname = e.name();
        let name = local_name(qname.as_ref());
        match name {
            // Empty paragraphs are routine inside table cells.
            b"p" => {
                self.para = Some(ParaAccum::default());
                self.end_paragraph();
            }
            b"sectPr" => {
                self.sect = Some(PageSettings::default());
                self.end_sect_pr();
            }
            b"tbl" | b"tr" | b"tc" | b"t" | b"r" | b"pPr" | b"rPr" | b"tcPr" | b"trPr"
            | b"tcBorders" | b"tblBorders" => {}
            other => self.handle_property(other, e),
        }
    }

    fn handle_property(&mut self, name: &[u8], e: &BytesStart<'_>) {
        match name {
            b"jc" => {
                if self.in_ppr {
                    if let (Some(para), Some(val)) = (self.para.as_mut(), attr_val(e, b"val")) {
                        para.alignment = Alignment::from_jc_val(&val);
                    }
                }
            }
            b"rFonts" => {
                if self.in_rpr {
                    if let Some(run) = self.run.as_mut() {
                        let font = attr_val(e, b"ascii")
                            .or_else(|| attr_val(e, b"eastAsia"))
                            .or_else(|| attr_val(e, b"hAnsi"));
                        if font.is_some() {
                            run.font_name = font;
                        }
                    }
                }
            }
            b"sz" => {
                if self.in_rpr {
                    if let Some(run) = self.run.as_mut() {
                        if let Some(half) = attr_val(e, b"val").and_then(|v| v.parse::<f64>().ok())
                        {
                            run.font_size_pt = Some(half_points_to_pt(half));
                        }
                    }
                }
            }
            b"b" => {
                if self.in_rpr {
                    if let Some(run) = self.run.as_mut() {
                        run.bold = Some(read_on_off(e));
                    }
                }
            }
            b"i" => {
                if self.in_rpr {
                    if let Some(run) = self.run.as_mut() {
                        run.italic = Some(read_on_off(e));
                    }
                }
            }
            b"u" => {
                if self.in_rpr {
                    if let Some(run) = self.run.as_mut() {
                        let on = attr_val(e, b"val").map(|v| v != "none").unwrap_or(true);
                        run.underline = Some(on);
                    }
                }
            }
            b"color" => {
                if self.in_rpr {
                    if let Some(run) = self.run.as_mut() {
                        if let Some(val) = attr_val(e, b"val") {
                            if val != "auto" {
                                run.color = Some(val);
                            }
                        }
                    }
                }
            }
            b"tab" => {
                if let Some(run) = self.run.as_mut() {
                    run.text.push('\t');
                }
            }
            b"br" | b"cr" => {
                if let Some(run) = self.run.as_mut() {
                    run.text.push('\n');
                }
            }
            b"gridSpan" => {
                if self.in_tcpr {
                    if let Some(cell) = self.cell.as_mut() {
                        if let Some(span) = attr_val(e, b"val").and_then(|v| v.parse::<usize>().ok())
                        {
                            cell.grid_span = span.max(1);
                        }
                    }
                }
            }
            b"vMerge" => {
                if self.in_tcpr {
                    if let Some(cell) = self.cell.as_mut() {
                        // A valueless vMerge continues the merge above.
                        cell.vmerge = match attr_val(e, b"val").as_deref() {
                            Some("restart") => VMerge::Restart,
                            _ => VMerge::Continue,
                        };
                    }
                }
            }
            b"tcW" => {
                if self.in_tcpr {
                    if let Some(cell) = self.cell.as_mut() {
                        let dxa = match attr_val(e, b"type").as_deref() {
                            Some("dxa") | None => true,
                            _ => false,
                        };
                        if dxa {
                            if let Some(width) =
                                attr_val(e, b"w").and_then(|v| v.parse::<f64>().ok())
                            {
                                cell.width_dxa = Some(width);
                            }
                        }
                    }
                }
            }
            b"trHeight" => {
                if self.in_trpr {
                    if let Some(row) = self.row.as_mut() {
                        row.height_dxa = attr_val(e, b"val").and_then(|v| v.parse::<f64>().ok());
                        row.height_rule = attr_val(e, b"hRule");
                    }
                }
            }
            b"top" | b"left" | b"start" | b"bottom" | b"right" | b"end" | b"insideH"
            | b"insideV" => {
                self.handle_border_side(name, e);
            }
            b"pgSz" => {
                if let Some(sect) = self.sect.as_mut() {
                    if let Some(w) = attr_val(e, b"w").and_then(|v| v.parse::<f64>().ok()) {
                        sect.width_cm = twips_to_cm(w);
                    }
                    if let Some(h) = attr_val(e, b"h").and_then(|v| v.parse::<f64>().ok()) {
                        sect.height_cm = twips_to_cm(h);
                    }
                    sect.orientation = match attr_val(e, b"orient").as_deref() {
                        Some("landscape") => Orientation::Landscape,
                        _ => Orientation::Portrait,
                    };
                }
            }
            b"pgMar" => {
                if let Some(sect) = self.sect.as_mut() {
                    let read = |key: &[u8]| attr_val(e, key).and_then(|v| v.parse::<f64>().ok());
                    if let Some(v) = read(b"top") {
                        sect.top_margin_cm = twips_to_cm(v);
                    }
                    if let Some(v) = read(b"bottom") {
                        sect.bottom_margin_cm = twips_to_cm(v);
                    }
                    if let Some(v) = read(b"left") {
                        sect.left_margin_cm = twips_to_cm(v);
                    }
                    if let Some(v) = read(b"right") {
                        sect.right_margin_cm = twips_to_cm(v);
                    }
                    if let Some(v) = read(b"header") {
                        sect.header_distance_cm = twips_to_cm(v);
                    }
                    if let Some(v) = read(b"footer") {
                        sect.footer_distance_cm = twips_to_cm(v);
                    }
                    if let Some(v) = read(b"gutter") {
                        sect.gutter_cm = twips_to_cm(v);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_border_side(&mut self, name: &[u8], e: &BytesStart<'_>) {
        if !self.in_tc_borders && !self.in_tbl_borders {
            return;
        }
        let side = BorderSide {
            val: attr_val(e, b"val").unwrap_or_else(|| "single".to_string()),
            size: attr_val(e, b"sz"),
            color: attr_val(e, b"color"),
            space: attr_val(e, b"space"),
        };
        let spec = if self.in_tc_borders {
            match self.cell.as_mut() {
                Some(cell) => cell.borders.get_or_insert_with(BorderSpec::default),
                None => return,
            }
        } else {
            match self.table.as_mut() {
                Some(table) => table.borders.get_or_insert_with(BorderSpec::default),
                None => return,
            }
        };
        match name {
            b"top" => spec.top = Some(side),
            b"left" | b"start" => spec.left = Some(side),
            b"bottom" => spec.bottom = Some(side),
            b"right" | b"end" => spec.right = Some(side),
            b"insideH" => spec.inside_h = Some(side),
            b"insideV" => spec.inside_v = Some(side),
            _ => {}
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        if self.skip_depth > 0 {
            if Some(name) == self.skip_tag.as_deref() {
                self.skip_depth -= 1;
                if self.skip_depth == 0 {
                    self.skip_tag = None;
                }
            }
            return;
        }
        match name {
            b"t" => self.in_t = false,
            b"r" => {
                if let Some(run) = self.run.take() {
                    if let Some(para) = self.para.as_mut() {
                        para.runs.push(run.into_style());
                    }
                }
            }
            b"rPr" => self.in_rpr = false,
            b"pPr" => self.in_ppr = false,
            b"p" => self.end_paragraph(),
            b"tcPr" => self.in_tcpr = false,
            b"trPr" => self.in_trpr = false,
            b"tcBorders" => self.in_tc_borders = false,
            b"tblBorders" => self.in_tbl_borders = false,
            b"tc" => self.end_cell(),
            b"tr" => self.end_row(),
            b"tbl" => self.end_table(),
            b"sectPr" => self.end_sect_pr(),
            b"body" => self.close_final_page(),
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    fn end_paragraph(&mut self) {
        self.in_ppr = false;
        if let Some(para) = self.para.take() {
            let model = ParagraphModel::from_runs(para.runs, para.alignment);
            if let Some(cell) = self.cell.as_mut() {
                cell.paragraphs.push(model);
            } else if self.table.is_none() {
                self.blocks.push(ContentBlock::Paragraph(model));
                if let Some(settings) = self.pending_page_close.take() {
                    self.close_page(settings);
                }
            }
        }
    }

    fn end_sect_pr(&mut self) {
        if let Some(settings) = self.sect.take() {
            if self.table.is_some() || self.cell.is_some() {
                // Sections cannot legally end inside a table; drop it.
            } else if self.para.is_some() {
                self.pending_page_close = Some(settings);
            } else {
                self.body_sect = Some(settings);
            }
        }
    }

    fn end_cell(&mut self) {
        if let Some(cell) = self.cell.take() {
            if let (Some(row), Some(table)) = (self.row.as_mut(), self.table.as_mut()) {
                let span = cell.grid_span.max(1);
                // A spanning cell surfaces once per covered grid column, so
                // pre-merge addresses stay dense and every column position
                // carries the owning cell's attributes.
                for offset in 0..span {
                    let mut model = CellModel::new(table.next_row, row.col_cursor + offset);
                    model.grid_span = cell.grid_span;
                    model.vmerge = cell.vmerge;
                    model.borders = cell.borders.clone();
                    model.width_dxa = cell.width_dxa;
                    model.height_dxa = row.height_dxa;
                    model.height_rule = row.height_rule.clone();
                    model.paragraphs = cell.paragraphs.clone();
                    table.cells.push(model);
                }
                row.col_cursor += span;
            }
        }
    }

    fn end_row(&mut self) {
        self.row = None;
        if let Some(table) = self.table.as_mut() {
            table.next_row += 1;
        }
    }

    fn end_table(&mut self) {
        if let Some(table) = self.table.take() {
            let borders = table.borders;
            let cells = table
                .cells
                .into_iter()
                .map(|mut cell| {
                    cell.borders =
                        BorderSpec::cell_with_table_fallback(cell.borders.take(), borders.as_ref());
                    cell
                })
                .collect();
            self.blocks.push(ContentBlock::Table(TableModel {
                index: self.table_index,
                borders,
                cells,
            }));
            self.table_index += 1;
        }
        self.row = None;
        self.cell = None;
    }

    fn close_page(&mut self, settings: PageSettings) {
        let blocks = std::mem::take(&mut self.blocks);
        self.pages.push(PageTemplate {
            index: self.pages.len(),
            settings,
            blocks,
        });
        self.table_index = 0;
    }

    fn close_final_page(&mut self) {
        if self.body_closed {
            return;
        }
        self.body_closed = true;
        let settings = self.body_sect.take().unwrap_or_default();
        self.close_page(settings);
    }
}

//! Template replay. One output section per (extracted page, template page)
//! pair; inside a section the template's blocks are walked in body order and
//! table cells in row-major pre-collapse order, the two orders the merge
//! bookkeeping and the text flow each depend on.

use doc_io::{DocxWriter, ExtractedPage, TableBuilder};
use embedding_provider::Embedder;
use keyword_match::{KeywordIndex, LineNormalizer};
use layout_model::{CellModel, ContentBlock, ParagraphModel, TableModel, TemplateModel, VMerge};
use regex::Regex;
use std::collections::HashSet;

use crate::pool::LinePool;
use crate::{PageReport, RestoreError, RestoreOptions, RestoreReport};

/// How many rows below a `restart` cell the continue scan may reach.
const VMERGE_SCAN_LIMIT: usize = 20;

/// Replay every template page against every extracted page, appending the
/// reconstructed sections to `writer`. The template's `filled_value`
/// annotations are rewritten per extracted page; after the call they reflect
/// the last page processed.
pub fn restore(
    template: &mut TemplateModel,
    pages: &[ExtractedPage],
    embedder: &dyn Embedder,
    writer: &mut DocxWriter,
    options: &RestoreOptions,
) -> Result<RestoreReport, RestoreError> {
    let index = KeywordIndex::build(&template.text_inventory(), embedder)?;
    let normalizer = LineNormalizer::new(index, options.threshold);
    let label_key = Regex::new(r"[^\w\s]").unwrap();

    let mut report = RestoreReport::default();

    for page in pages {
        clear_annotations(template);

        let normalized = normalizer.normalize_all(&page.lines, embedder)?;
        for (original, updated) in page.lines.iter().zip(&normalized) {
            if original != updated {
                log::debug!(
                    "page {}: line `{original}` normalized to `{updated}`",
                    page.number
                );
            }
        }

        let mut pool = LinePool::new(normalized);
        let mut counts = PageReport {
            page_number: page.number,
            lines_offered: pool.len(),
            ..PageReport::default()
        };

        // The pool carries across template pages: a line consumed by an
        // earlier template page stays consumed for the later ones.
        for template_page in template.pages.iter_mut() {
            writer.start_section(&template_page.settings);
            for block in template_page.blocks.iter_mut() {
                match block {
                    ContentBlock::Paragraph(paragraph) => {
                        restore_paragraph(paragraph, &pool, writer, &mut counts);
                    }
                    ContentBlock::Table(table) => {
                        restore_table(table, &mut pool, writer, &label_key, &mut counts);
                    }
                }
            }
            writer.add_page_break();
        }

        counts.lines_consumed = pool.consumed_count();
        report.pages.push(counts);
    }

    Ok(report)
}

fn clear_annotations(template: &mut TemplateModel) {
    for page in template.pages.iter_mut() {
        for block in page.blocks.iter_mut() {
            if let ContentBlock::Table(table) = block {
                for cell in table.cells.iter_mut() {
                    cell.filled_value = None;
                }
            }
        }
    }
}

/// Body paragraphs reuse pool lines without consuming them, so several
/// paragraphs may echo the same source line.
fn restore_paragraph(
    paragraph: &ParagraphModel,
    pool: &LinePool,
    writer: &mut DocxWriter,
    counts: &mut PageReport,
) {
    let final_text = match pool.find_containing(&paragraph.text) {
        Some(idx) => pool.get(idx).unwrap_or(paragraph.text.as_str()).to_string(),
        None => paragraph.text.clone(),
    };
    log::debug!("paragraph `{}` -> `{final_text}`", paragraph.text);
    writer.add_paragraph(&final_text, paragraph.alignment, paragraph.first_run());
    counts.paragraphs_written += 1;
}

fn restore_table(
    table: &mut TableModel,
    pool: &mut LinePool,
    writer: &mut DocxWriter,
    label_key: &Regex,
    counts: &mut PageReport,
) {
    let mut out = match TableBuilder::new(table.row_count(), table.col_count()) {
        Ok(out) => out,
        Err(err) => {
            log::warn!("table {} skipped: {err}", table.index);
            return;
        }
    };
    if let Some(borders) = &table.borders {
        out.set_table_borders(borders);
    }
    for (col, width) in table.column_widths().iter().enumerate() {
        if *width > 0.0 {
            if let Err(err) = out.set_col_width(col, *width) {
                log::warn!("table {}: column {col} width rejected: {err}", table.index);
            }
        }
    }
    for (row, height) in table.row_heights().iter().enumerate() {
        if *height > 0.0 {
            if let Err(err) = out.set_row_height(row, *height) {
                log::warn!("table {}: row {row} height rejected: {err}", table.index);
            }
        }
    }

    let mut merged_away: HashSet<(usize, usize)> = HashSet::new();
    for idx in 0..table.cells.len() {
        let row = table.cells[idx].row;
        let col = table.cells[idx].col;
        if merged_away.contains(&(row, col)) {
            continue;
        }

        if let Some(borders) = table.cells[idx].borders.clone() {
            if let Err(err) = out.set_cell_borders(row, col, &borders) {
                log::warn!("cell ({row},{col}) borders rejected: {err}");
            }
        }
        if let Err(err) = out.set_cell_margins(row, col, 0, 0) {
            log::warn!("cell ({row},{col}) margins rejected: {err}");
        }

        let span = table.cells[idx].grid_span;
        if span > 1 {
            match out.merge_right(row, col, span) {
                Ok(()) => {
                    counts.merges_applied += 1;
                    for k in 1..span {
                        merged_away.insert((row, col + k));
                    }
                }
                Err(err) => {
                    counts.merges_skipped += 1;
                    log::warn!("horizontal merge at ({row},{col}) skipped: {err}");
                }
            }
        }

        let mut absorbed: Vec<usize> = Vec::new();
        match table.cells[idx].vmerge {
            VMerge::Restart => {
                let mut run: Vec<usize> = Vec::new();
                for step in 1..VMERGE_SCAN_LIMIT {
                    let below = table.cells.iter().position(|c| {
                        c.row == row + step && c.col == col && c.vmerge == VMerge::Continue
                    });
                    match below {
                        Some(j) => run.push(j),
                        None => break,
                    }
                }
                if !run.is_empty() {
                    match out.merge_down(row, col, run.len() + 1) {
                        Ok(()) => {
                            counts.merges_applied += 1;
                            for step in 1..=run.len() {
                                for c in col..col + span.max(1) {
                                    merged_away.insert((row + step, c));
                                }
                            }
                            absorbed = run;
                        }
                        Err(err) => {
                            counts.merges_skipped += 1;
                            log::warn!("vertical merge at ({row},{col}) skipped: {err}");
                        }
                    }
                }
            }
            VMerge::Continue => {
                // Not absorbed by any restart above; stays an empty cell.
                continue;
            }
            VMerge::None => {}
        }

        let raw_text = table.cells[idx].first_text().to_string();
        let key = label_key.replace_all(&raw_text, "").into_owned();
        match pool.find_containing(&key) {
            Some(line_idx) => {
                let line = pool.get(line_idx).unwrap_or("").to_string();
                pool.consume(line_idx);
                match parse_label_value(&raw_text, &line) {
                    Some(value) => {
                        // The cell keeps its label; the value moves on.
                        table.cells[idx].filled_value = Some(raw_text.clone());
                        propagate_value(&mut table.cells, idx, value, &merged_away);
                    }
                    None => {
                        table.cells[idx].filled_value = Some(line);
                    }
                }
            }
            None => {
                if table.cells[idx].filled_value.is_none() {
                    table.cells[idx].filled_value = Some(raw_text.clone());
                }
            }
        }

        let final_text = table.cells[idx].filled_value.clone().unwrap_or_default();
        let style = table.cells[idx].first_run().cloned();
        let alignment = if style.is_some() {
            table.cells[idx].first_alignment()
        } else {
            None
        };
        match out.write_cell(row, col, &final_text, alignment, style.as_ref()) {
            Ok(()) => counts.cells_written += 1,
            Err(err) => log::warn!("cell ({row},{col}) not written: {err}"),
        }
        log::debug!("cell ({row},{col}) filled with `{final_text}`");

        // Absorbed continue cells carry their anchor's value.
        for j in absorbed {
            table.cells[j].filled_value = Some(final_text.clone());
        }
    }

    writer.push_table(out);
}

/// Split a matched line into label and value, anchored on the raw cell text.
fn parse_label_value(raw_text: &str, line: &str) -> Option<String> {
    let pattern = format!(r"^{}\s*[:：]\s*(.*)", regex::escape(raw_text));
    let matcher = match Regex::new(&pattern) {
        Ok(matcher) => matcher,
        Err(err) => {
            log::debug!("label pattern for `{raw_text}` did not compile: {err}");
            return None;
        }
    };
    matcher
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|value| value.as_str().trim().to_string())
}

/// Hand a parsed value to the cell that should display it: the adjacent
/// same-row blank first, else the first blank below in the same column.
/// Positions already consumed by a merge never receive values; writing there
/// would vanish into the covering cell.
fn propagate_value(
    cells: &mut [CellModel],
    idx: usize,
    value: String,
    merged_away: &HashSet<(usize, usize)>,
) {
    let row = cells[idx].row;
    let col = cells[idx].col;

    if let Some(next) = cells.get(idx + 1) {
        let eligible = next.row == row
            && next.grid_span == 1
            && next.vmerge != VMerge::Continue
            && !merged_away.contains(&(next.row, next.col))
            && next.is_template_blank()
            && next.filled_value.is_none();
        let target = (next.row, next.col);
        if eligible {
            cells[idx + 1].filled_value = Some(value);
            log::debug!("value propagated to adjacent cell ({},{})", target.0, target.1);
            return;
        }
    }

    for j in idx + 1..cells.len() {
        if cells[j].col == col
            && cells[j].vmerge != VMerge::Continue
            && !merged_away.contains(&(cells[j].row, cells[j].col))
            && cells[j].is_template_blank()
            && cells[j].filled_value.is_none()
        {
            let target_row = cells[j].row;
            cells[j].filled_value = Some(value);
            log::debug!("value propagated down to cell ({target_row},{col})");
            return;
        }
    }

    log::debug!("no blank cell in column {col} accepts the value; dropped");
}

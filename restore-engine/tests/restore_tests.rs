use std::collections::HashMap;

use doc_io::{read_template, DocxWriter, ExtractedPage};
use embedding_provider::{Embedder, EmbedderError, EmbedderInfo, ProviderKind};
use layout_model::{
    Alignment, CellModel, ContentBlock, Orientation, PageSettings, PageTemplate, ParagraphModel,
    RunStyle, TableModel, TemplateModel, VMerge,
};
use restore_engine::{restore, RestoreOptions, RestoreReport};
use tempfile::tempdir;

/// Test embedder with hand-picked vectors so cosine scores are exact.
/// Unknown texts map to a reserved axis orthogonal to every mapped vector,
/// which keeps values and noise from ever reaching the match threshold.
struct FixedEmbedder {
    info: EmbedderInfo,
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
}

impl FixedEmbedder {
    fn new(entries: &[(&str, Vec<f32>)]) -> Self {
        let dimension = entries.first().map(|(_, v)| v.len()).unwrap_or(4);
        let mut fallback = vec![0.0; dimension];
        fallback[dimension - 1] = 1.0;

        Self {
            info: EmbedderInfo {
                provider: ProviderKind::Hashed,
                model_id: "fixed-test".into(),
                dimension,
            },
            vectors: entries
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.clone()))
                .collect(),
            fallback,
        }
    }

    /// One orthogonal axis per label; axis 7 stays reserved for unknowns.
    fn for_labels(labels: &[&str]) -> Self {
        let entries: Vec<(&str, Vec<f32>)> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let mut v = vec![0.0f32; 8];
                v[i] = 1.0;
                (*label, v)
            })
            .collect();
        Self::new(&entries)
    }
}

impl Embedder for FixedEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    fn info(&self) -> &EmbedderInfo {
        &self.info
    }
}

fn text_run(text: &str) -> RunStyle {
    RunStyle {
        text: text.to_string(),
        ..RunStyle::default()
    }
}

fn paragraph(text: &str) -> ContentBlock {
    ContentBlock::Paragraph(ParagraphModel::from_runs(vec![text_run(text)], None))
}

fn label_cell(row: usize, col: usize, text: &str) -> CellModel {
    let mut cell = CellModel::new(row, col);
    cell.paragraphs
        .push(ParagraphModel::from_runs(vec![text_run(text)], None));
    cell
}

fn blank_cell(row: usize, col: usize) -> CellModel {
    let mut cell = CellModel::new(row, col);
    cell.paragraphs
        .push(ParagraphModel::from_runs(Vec::new(), None));
    cell
}

fn table_block(cells: Vec<CellModel>) -> ContentBlock {
    ContentBlock::Table(TableModel {
        index: 0,
        borders: None,
        cells,
    })
}

fn one_page_template(blocks: Vec<ContentBlock>) -> TemplateModel {
    TemplateModel {
        pages: vec![PageTemplate {
            index: 0,
            settings: PageSettings::default(),
            blocks,
        }],
    }
}

fn page(number: u32, lines: &[&str]) -> ExtractedPage {
    ExtractedPage {
        number,
        lines: lines.iter().map(|l| l.to_string()).collect(),
    }
}

/// Run the engine, save the package, read it back.
fn reconstruct(
    template: &mut TemplateModel,
    pages: &[ExtractedPage],
    embedder: &dyn Embedder,
    options: &RestoreOptions,
) -> (RestoreReport, TemplateModel) {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("out.docx");
    let path = path.to_str().expect("utf-8 path");

    let mut writer = DocxWriter::new();
    let report = restore(template, pages, embedder, &mut writer, options).expect("restore");
    writer.save(path).expect("save docx");
    let round = read_template(path).expect("read back");
    (report, round)
}

fn first_table(page: &PageTemplate) -> &TableModel {
    page.blocks
        .iter()
        .find_map(|b| match b {
            ContentBlock::Table(t) => Some(t),
            _ => None,
        })
        .expect("page has a table")
}

fn cell<'a>(table: &'a TableModel, row: usize, col: usize) -> &'a CellModel {
    table
        .cell_at(row, col)
        .unwrap_or_else(|| panic!("no cell at ({row},{col})"))
}

fn filled(template: &TemplateModel, row: usize, col: usize) -> Option<String> {
    let table = template.pages[0].blocks.iter().find_map(|b| match b {
        ContentBlock::Table(t) => Some(t),
        _ => None,
    });
    table.and_then(|t| cell(t, row, col).filled_value.clone())
}

#[test]
fn label_value_split_fills_the_adjacent_cell() {
    let embedder = FixedEmbedder::for_labels(&["성명"]);
    let mut template = one_page_template(vec![table_block(vec![
        label_cell(0, 0, "성명"),
        blank_cell(0, 1),
    ])]);
    let pages = [page(1, &["성명 : 홍길동"])];

    let (report, round) =
        reconstruct(&mut template, &pages, &embedder, &RestoreOptions::default());

    assert_eq!(filled(&template, 0, 0), Some("성명".to_string()));
    assert_eq!(filled(&template, 0, 1), Some("홍길동".to_string()));

    let table = first_table(&round.pages[0]);
    assert_eq!(cell(table, 0, 0).first_text(), "성명");
    assert_eq!(cell(table, 0, 1).first_text(), "홍길동");

    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.pages[0].lines_consumed, 1);
    assert_eq!(report.pages[0].cells_written, 2);
    assert_eq!(report.pages[0].paragraphs_written, 0);
}

#[test]
fn unmatched_labels_keep_their_template_text() {
    let embedder = FixedEmbedder::for_labels(&["주소"]);
    let mut template = one_page_template(vec![table_block(vec![
        label_cell(0, 0, "주소"),
        blank_cell(0, 1),
    ])]);
    let pages = [page(1, &["전혀 다른 내용"])];

    let (report, round) =
        reconstruct(&mut template, &pages, &embedder, &RestoreOptions::default());

    assert_eq!(filled(&template, 0, 0), Some("주소".to_string()));
    assert_eq!(filled(&template, 0, 1), Some("".to_string()));
    assert_eq!(report.pages[0].lines_consumed, 0);

    let table = first_table(&round.pages[0]);
    assert_eq!(cell(table, 0, 0).first_text(), "주소");
    assert!(cell(table, 0, 1).is_template_blank());
}

#[test]
fn matched_paragraph_takes_the_whole_line() {
    let embedder = FixedEmbedder::for_labels(&["신청서"]);
    let mut template = one_page_template(vec![paragraph("신청서")]);
    let pages = [page(1, &["신청서"])];

    let (report, round) =
        reconstruct(&mut template, &pages, &embedder, &RestoreOptions::default());

    match &round.pages[0].blocks[0] {
        ContentBlock::Paragraph(p) => assert_eq!(p.text, "신청서"),
        other => panic!("expected a paragraph, got {other:?}"),
    }
    assert_eq!(report.pages[0].paragraphs_written, 1);
    assert_eq!(report.pages[0].lines_consumed, 0);
}

#[test]
fn paragraphs_reuse_lines_without_consuming_them() {
    let embedder = FixedEmbedder::for_labels(&["신청서"]);
    let mut template = one_page_template(vec![
        paragraph("신청서"),
        table_block(vec![label_cell(0, 0, "신청서")]),
    ]);
    let pages = [page(1, &["신청서 제출본"])];

    let (report, round) =
        reconstruct(&mut template, &pages, &embedder, &RestoreOptions::default());

    // The paragraph borrowed the line, the cell consumed it; both carry
    // the full line because it has no label separator to split on.
    match &round.pages[0].blocks[0] {
        ContentBlock::Paragraph(p) => assert_eq!(p.text, "신청서 제출본"),
        other => panic!("expected a paragraph, got {other:?}"),
    }
    assert_eq!(filled(&template, 0, 0), Some("신청서 제출본".to_string()));
    assert_eq!(report.pages[0].lines_consumed, 1);
    assert_eq!(report.pages[0].paragraphs_written, 1);
    assert_eq!(report.pages[0].cells_written, 1);
}

#[test]
fn value_propagates_down_the_column_when_the_row_has_no_blank() {
    let embedder = FixedEmbedder::for_labels(&["성명", "연락처"]);
    let mut template = one_page_template(vec![table_block(vec![
        label_cell(0, 0, "성명"),
        label_cell(0, 1, "연락처"),
        blank_cell(1, 0),
        blank_cell(1, 1),
    ])]);
    let pages = [page(1, &["성명 : 홍길동", "연락처 : 010-1234-5678"])];

    let (report, round) =
        reconstruct(&mut template, &pages, &embedder, &RestoreOptions::default());

    assert_eq!(filled(&template, 1, 0), Some("홍길동".to_string()));
    assert_eq!(filled(&template, 1, 1), Some("010-1234-5678".to_string()));

    let table = first_table(&round.pages[0]);
    assert_eq!(cell(table, 1, 0).first_text(), "홍길동");
    assert_eq!(cell(table, 1, 1).first_text(), "010-1234-5678");

    assert_eq!(report.pages[0].lines_consumed, 2);
    assert_eq!(report.pages[0].cells_written, 4);
}

#[test]
fn absorbed_merge_cells_mirror_their_anchor() {
    let embedder = FixedEmbedder::for_labels(&["구분", "비고"]);
    let mut restart = label_cell(0, 0, "구분");
    restart.vmerge = VMerge::Restart;
    let mut cont_1 = blank_cell(1, 0);
    cont_1.vmerge = VMerge::Continue;
    let mut cont_2 = blank_cell(2, 0);
    cont_2.vmerge = VMerge::Continue;

    let mut template = one_page_template(vec![table_block(vec![
        restart,
        blank_cell(0, 1),
        cont_1,
        label_cell(1, 1, "비고"),
        cont_2,
        blank_cell(2, 1),
    ])]);
    let pages = [page(1, &["구분 : 값A"])];

    let (report, round) =
        reconstruct(&mut template, &pages, &embedder, &RestoreOptions::default());

    // The anchor keeps its label, the value lands beside it, and the two
    // absorbed cells report the anchor's text.
    assert_eq!(filled(&template, 0, 0), Some("구분".to_string()));
    assert_eq!(filled(&template, 0, 1), Some("값A".to_string()));
    assert_eq!(filled(&template, 1, 0), Some("구분".to_string()));
    assert_eq!(filled(&template, 2, 0), Some("구분".to_string()));

    let table = first_table(&round.pages[0]);
    assert_eq!(cell(table, 0, 0).vmerge, VMerge::Restart);
    assert_eq!(cell(table, 0, 0).first_text(), "구분");
    assert_eq!(cell(table, 1, 0).vmerge, VMerge::Continue);
    assert!(cell(table, 1, 0).is_template_blank());
    assert_eq!(cell(table, 2, 0).vmerge, VMerge::Continue);

    assert_eq!(report.pages[0].merges_applied, 1);
    assert_eq!(report.pages[0].merges_skipped, 0);
    assert_eq!(report.pages[0].cells_written, 4);
}

#[test]
fn vertical_merges_widen_narrow_continue_rows() {
    let embedder = FixedEmbedder::for_labels(&["구분"]);
    let mut restart = label_cell(0, 0, "구분");
    restart.vmerge = VMerge::Restart;
    restart.grid_span = 2;
    let mut restart_dup = restart.clone();
    restart_dup.col = 1;
    let mut cont = blank_cell(1, 0);
    cont.vmerge = VMerge::Continue;

    // The anchor spans two columns, the continue row below only one; the
    // merged region is rectangular so the continue row is widened and the
    // blank beside it absorbed.
    let mut template = one_page_template(vec![table_block(vec![
        restart,
        restart_dup,
        cont,
        blank_cell(1, 1),
    ])]);
    let pages = [page(1, &["구분 내역"])];

    let (report, round) =
        reconstruct(&mut template, &pages, &embedder, &RestoreOptions::default());

    assert_eq!(report.pages[0].merges_applied, 2);
    assert_eq!(report.pages[0].merges_skipped, 0);
    assert_eq!(report.pages[0].cells_written, 1);
    assert_eq!(filled(&template, 1, 0), Some("구분 내역".to_string()));

    let table = first_table(&round.pages[0]);
    assert_eq!(table.cells.len(), 4);
    assert_eq!(cell(table, 0, 0).grid_span, 2);
    assert_eq!(cell(table, 0, 0).vmerge, VMerge::Restart);
    assert_eq!(cell(table, 0, 0).first_text(), "구분 내역");
    assert_eq!(cell(table, 1, 0).grid_span, 2);
    assert_eq!(cell(table, 1, 0).vmerge, VMerge::Continue);
}

#[test]
fn each_line_feeds_at_most_one_cell() {
    let embedder = FixedEmbedder::for_labels(&["성명"]);
    let mut template = one_page_template(vec![table_block(vec![
        label_cell(0, 0, "성명"),
        blank_cell(0, 1),
        label_cell(1, 0, "성명"),
        blank_cell(1, 1),
    ])]);
    let pages = [page(1, &["성명 : 홍길동"])];

    let (report, _round) =
        reconstruct(&mut template, &pages, &embedder, &RestoreOptions::default());

    // The first label consumed the only line; the second falls back to
    // its template text and its neighbour stays blank.
    assert_eq!(filled(&template, 0, 1), Some("홍길동".to_string()));
    assert_eq!(filled(&template, 1, 0), Some("성명".to_string()));
    assert_eq!(filled(&template, 1, 1), Some("".to_string()));
    assert_eq!(report.pages[0].lines_consumed, 1);
}

#[test]
fn threshold_gates_fuzzy_segment_normalization() {
    // cos([3,4,0,0], [1,0,0,0]) is exactly 0.6.
    let embedder = FixedEmbedder::new(&[
        ("성명", vec![1.0, 0.0, 0.0, 0.0]),
        ("성 명", vec![3.0, 4.0, 0.0, 0.0]),
    ]);
    let blocks = vec![table_block(vec![
        label_cell(0, 0, "성명"),
        blank_cell(0, 1),
    ])];
    let pages = [page(1, &["성 명 : 홍길동"])];

    // At 0.6 the mangled segment normalizes back to the template spelling
    // and the label/value split succeeds.
    let mut lenient = one_page_template(blocks.clone());
    let options = RestoreOptions { threshold: 0.6 };
    let (report, _round) = reconstruct(&mut lenient, &pages, &embedder, &options);
    assert_eq!(filled(&lenient, 0, 1), Some("홍길동".to_string()));
    assert_eq!(report.pages[0].lines_consumed, 1);

    // At the default 0.70 the score falls short, the line stays mangled
    // and the label never matches it.
    let mut strict = one_page_template(blocks);
    let (report, _round) =
        reconstruct(&mut strict, &pages, &embedder, &RestoreOptions::default());
    assert_eq!(filled(&strict, 0, 0), Some("성명".to_string()));
    assert_eq!(filled(&strict, 0, 1), Some("".to_string()));
    assert_eq!(report.pages[0].lines_consumed, 0);
}

#[test]
fn spanned_cells_rebuild_their_grid_geometry() {
    let embedder = FixedEmbedder::for_labels(&["제목"]);
    let mut banner = label_cell(0, 0, "제목");
    banner.grid_span = 2;
    let mut banner_dup = banner.clone();
    banner_dup.col = 1;
    let mut left = blank_cell(1, 0);
    left.width_dxa = Some(1200.0);
    let mut right = blank_cell(1, 1);
    right.width_dxa = Some(800.0);

    let mut template =
        one_page_template(vec![table_block(vec![banner, banner_dup, left, right])]);
    let pages = [page(1, &["제목"])];

    let (report, round) =
        reconstruct(&mut template, &pages, &embedder, &RestoreOptions::default());

    // The duplicate entry collapses into the banner instead of being
    // written a second time.
    assert_eq!(report.pages[0].merges_applied, 1);
    assert_eq!(report.pages[0].cells_written, 3);

    let table = first_table(&round.pages[0]);
    assert_eq!(table.cells.len(), 4);
    assert_eq!(cell(table, 0, 0).grid_span, 2);
    // A spanning cell is as wide as the columns it covers, and the covered
    // position reports the same merged geometry.
    assert_eq!(cell(table, 0, 0).width_dxa, Some(2000.0));
    assert_eq!(cell(table, 0, 1).grid_span, 2);
    assert_eq!(cell(table, 0, 1).width_dxa, Some(2000.0));
    assert_eq!(cell(table, 1, 0).width_dxa, Some(1200.0));
    assert_eq!(cell(table, 1, 1).width_dxa, Some(800.0));
}

#[test]
fn every_template_page_replays_per_extracted_page() {
    let embedder = FixedEmbedder::for_labels(&["첫 장", "둘째 장"]);
    let mut template = TemplateModel {
        pages: vec![
            PageTemplate {
                index: 0,
                settings: PageSettings::default(),
                blocks: vec![paragraph("첫 장")],
            },
            PageTemplate {
                index: 1,
                settings: PageSettings::default(),
                blocks: vec![paragraph("둘째 장")],
            },
        ],
    };
    let pages = [page(1, &["알파"]), page(2, &["베타"])];

    let (report, round) =
        reconstruct(&mut template, &pages, &embedder, &RestoreOptions::default());

    assert_eq!(round.pages.len(), 4);
    let texts: Vec<&str> = round
        .pages
        .iter()
        .map(|p| match &p.blocks[0] {
            ContentBlock::Paragraph(para) => para.text.as_str(),
            other => panic!("expected a paragraph, got {other:?}"),
        })
        .collect();
    assert_eq!(texts, vec!["첫 장", "둘째 장", "첫 장", "둘째 장"]);

    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.pages[0].page_number, 1);
    assert_eq!(report.pages[1].page_number, 2);
    assert_eq!(report.pages[0].paragraphs_written, 2);
    assert_eq!(report.pages[1].paragraphs_written, 2);
}

#[test]
fn annotations_reset_between_extracted_pages() {
    let embedder = FixedEmbedder::for_labels(&["성명"]);
    let mut template = one_page_template(vec![table_block(vec![
        label_cell(0, 0, "성명"),
        blank_cell(0, 1),
    ])]);
    let pages = [page(1, &["성명 : 홍길동"]), page(2, &["성명 : 김철수"])];

    let (report, round) =
        reconstruct(&mut template, &pages, &embedder, &RestoreOptions::default());

    // Each output section carries its own page's value, and the template
    // annotations end up reflecting the last page only.
    assert_eq!(
        cell(first_table(&round.pages[0]), 0, 1).first_text(),
        "홍길동"
    );
    assert_eq!(
        cell(first_table(&round.pages[1]), 0, 1).first_text(),
        "김철수"
    );
    assert_eq!(filled(&template, 0, 1), Some("김철수".to_string()));

    assert_eq!(report.pages[0].lines_consumed, 1);
    assert_eq!(report.pages[1].lines_consumed, 1);
    assert_eq!(report.total_lines_consumed(), 2);
}

#[test]
fn two_runs_over_the_same_inputs_agree() {
    let embedder = FixedEmbedder::for_labels(&["성명", "연락처"]);
    let blocks = vec![table_block(vec![
        label_cell(0, 0, "성명"),
        label_cell(0, 1, "연락처"),
        blank_cell(1, 0),
        blank_cell(1, 1),
    ])];
    let pages = [page(1, &["성명 : 홍길동", "연락처 : 010-1234-5678"])];

    let mut first = one_page_template(blocks.clone());
    let (report_a, round_a) =
        reconstruct(&mut first, &pages, &embedder, &RestoreOptions::default());

    let mut second = one_page_template(blocks);
    let (report_b, round_b) =
        reconstruct(&mut second, &pages, &embedder, &RestoreOptions::default());

    assert_eq!(report_a, report_b);
    assert_eq!(first, second);
    assert_eq!(round_a, round_b);
}

#[test]
fn template_styles_flow_into_written_cells() {
    let embedder = FixedEmbedder::for_labels(&["성명"]);
    let mut label = CellModel::new(0, 0);
    label.paragraphs.push(ParagraphModel::from_runs(
        vec![RunStyle {
            text: "성명".to_string(),
            font_name: Some("바탕".to_string()),
            font_size_pt: Some(11.0),
            bold: Some(true),
            ..RunStyle::default()
        }],
        Some(Alignment::Center),
    ));

    let settings = PageSettings {
        width_cm: 29.7,
        height_cm: 21.0,
        orientation: Orientation::Landscape,
        ..PageSettings::default()
    };
    let mut template = TemplateModel {
        pages: vec![PageTemplate {
            index: 0,
            settings: settings.clone(),
            blocks: vec![table_block(vec![label, blank_cell(0, 1)])],
        }],
    };
    let pages = [page(1, &["성명 : 홍길동"])];

    let (_report, round) =
        reconstruct(&mut template, &pages, &embedder, &RestoreOptions::default());

    assert_eq!(round.pages[0].settings, settings);

    let table = first_table(&round.pages[0]);
    let run = cell(table, 0, 0).first_run().expect("styled run");
    assert_eq!(run.font_name.as_deref(), Some("바탕"));
    assert_eq!(run.font_size_pt, Some(11.0));
    assert_eq!(run.bold, Some(true));
    assert_eq!(cell(table, 0, 0).first_alignment(), Some(Alignment::Center));

    // The blank neighbour had no template run, so the writer's default
    // style applies.
    let value_run = cell(table, 0, 1).first_run().expect("default run");
    assert_eq!(value_run.font_name.as_deref(), Some("맑은 고딕"));
    assert_eq!(value_run.font_size_pt, Some(10.5));
    assert_eq!(value_run.bold, Some(false));
}

#[test]
fn tables_without_cells_are_skipped() {
    let embedder = FixedEmbedder::for_labels(&["본문"]);
    let mut template = one_page_template(vec![table_block(Vec::new()), paragraph("본문")]);
    let pages = [page(1, &[])];

    let (report, round) =
        reconstruct(&mut template, &pages, &embedder, &RestoreOptions::default());

    assert_eq!(report.pages[0].lines_offered, 0);
    assert_eq!(report.pages[0].cells_written, 0);
    assert_eq!(report.pages[0].paragraphs_written, 1);
    assert!(round.pages[0]
        .blocks
        .iter()
        .all(|b| matches!(b, ContentBlock::Paragraph(_))));
}

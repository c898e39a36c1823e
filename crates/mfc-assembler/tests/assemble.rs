//! End-to-end assembly over a dataset directory built in a temp dir

use std::fs;
use std::path::Path;

use docx_rs::{BreakType, Docx, Paragraph, Run};
use mfc_assembler::{run_assembly, run_queries, AssemblyError, AssemblyReport, CorpusRow};
use mfc_core::{AppConfig, CorpusError};
use mfc_parser::write_docx;
use serde_json::json;

fn config_for(base: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.paths.base_dir = base.to_path_buf();
    config
}

fn write_metadata(base: &Path) {
    let metadata = json!({
        "A1": {
            "title": "Border Crisis Grows",
            "source": "New York Times",
            "year": 2006,
            "month": 5,
            "byline": "Jane Doe",
            "annotations": {
                "framing": {
                    "annotator1_1.0_r": [{"code": 10.2}, {"code": 5.0}],
                    "annotator2_2.0_r": [{"code": 10.0}]
                },
                "tone": {
                    "annotator1_1.0_r": [{"code": 17.0}]
                }
            }
        },
        "D1": {"title": "Editorial Notebook", "source": "New York Times", "year": 2001, "month": 1},
        "D2": {"title": "Editorial Notebook", "source": "New York Times", "year": 2001, "month": 2},
        "W1": {"title": "Border Crisis Grows", "source": "Washington Post", "year": 2006, "month": 5},
        "N9": {"title": "Never Downloaded", "source": "New York Times", "year": null, "month": null}
    });
    fs::write(base.join("immigration.json"), metadata.to_string()).unwrap();
    fs::write(base.join("codes.json"), r#"{"1.0": "Economic", "17.0": "Pro"}"#).unwrap();
}

fn read_report(base: &Path) -> AssemblyReport {
    serde_json::from_str(&fs::read_to_string(base.join("assembly_report.json")).unwrap()).unwrap()
}

fn read_rows(base: &Path) -> Vec<CorpusRow> {
    let mut reader = csv::Reader::from_path(base.join("immigration_corpus.csv")).unwrap();
    reader.deserialize().map(|r| r.unwrap()).collect()
}

#[test]
fn test_assembles_filename_and_content_matches() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    write_metadata(base);

    let batch = base.join("downloads").join("batch_01");
    fs::create_dir_all(&batch).unwrap();
    write_docx(
        &batch.join("Border Crisis Grows.docx"),
        &[
            "Border Crisis Grows",
            "By Jane Doe",
            "BODY",
            "  First paragraph.  ",
            "Second paragraph.",
        ],
    )
    .unwrap();
    write_docx(
        &batch.join("Document (3).docx"),
        &["Weather Report", "Body", "Sunny."],
    )
    .unwrap();

    let report = run_assembly(&config_for(base)).unwrap();

    assert_eq!(report.total_articles, 4);
    assert_eq!(report.documents_found, 2);
    assert_eq!(report.matched, 1);
    assert_eq!(report.matched_by_filename, 1);
    assert_eq!(report.unmatched_files_count, 1);
    assert_eq!(report.unmatched_files[0].filename_title, "Document (3)");
    assert_eq!(
        report.unmatched_files[0].content_title.as_deref(),
        Some("Weather Report")
    );
    assert_eq!(report.missing_articles_sample, vec!["D1", "D2", "N9"]);
    assert_eq!(read_report(base), report);

    let rows = read_rows(base);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.article_id, "A1");
    assert_eq!(row.match_method, "filename");
    assert_eq!(row.text, "First paragraph.\nSecond paragraph.");
    assert_eq!(row.byline.as_deref(), Some("Jane Doe"));
    assert_eq!(
        row.frame_annotations,
        r#"{"annotator1":[5,10],"annotator2":[10]}"#
    );
    assert_eq!(row.tone_annotations, r#"{"annotator1":["pro"]}"#);
    assert_eq!(
        row.docx_file,
        Path::new("downloads")
            .join("batch_01")
            .join("Border Crisis Grows.docx")
            .display()
            .to_string()
    );

    let jsonl = fs::read_to_string(base.join("immigration_corpus.jsonl")).unwrap();
    assert_eq!(jsonl.lines().count(), 1);
    assert!(base.join("immigration_corpus.parquet").exists());
}

#[test]
fn test_headline_with_line_break_matches_by_content() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    write_metadata(base);

    let batch = base.join("downloads").join("batch_01");
    fs::create_dir_all(&batch).unwrap();
    let file = fs::File::create(batch.join("Document (7).docx")).unwrap();
    Docx::new()
        .add_paragraph(
            Paragraph::new().add_run(
                Run::new()
                    .add_text("Border")
                    .add_break(BreakType::TextWrapping)
                    .add_text("Crisis Grows"),
            ),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Body")))
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Text.")))
        .build()
        .pack(file)
        .unwrap();

    let report = run_assembly(&config_for(base)).unwrap();

    assert_eq!(report.matched_by_content, 1);
    let rows = read_rows(base);
    assert_eq!(rows[0].article_id, "A1");
    assert_eq!(rows[0].match_method, "content");
    assert_eq!(rows[0].text, "Text.");
}

#[test]
fn test_duplicate_titles_claim_distinct_articles() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    write_metadata(base);

    let batch = base.join("downloads").join("batch_01");
    fs::create_dir_all(&batch).unwrap();
    write_docx(&batch.join("a.docx"), &["Editorial Notebook", "Body", "One."]).unwrap();
    write_docx(&batch.join("b.docx"), &["Editorial Notebook", "Body", "Two."]).unwrap();

    let report = run_assembly(&config_for(base)).unwrap();

    assert_eq!(report.matched_by_content, 2);
    assert_eq!(report.reclaimed_matches, 0);
    let ids: Vec<_> = read_rows(base).into_iter().map(|r| r.article_id).collect();
    assert_eq!(ids, vec!["D1", "D2"]);
}

#[test]
fn test_no_matches_writes_only_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    write_metadata(base);
    fs::create_dir_all(base.join("downloads").join("batch_01")).unwrap();

    let report = run_assembly(&config_for(base)).unwrap();

    assert_eq!(report.matched, 0);
    assert_eq!(report.missing_articles_count, 4);
    assert!(base.join("assembly_report.json").exists());
    assert!(!base.join("immigration_corpus.csv").exists());
    assert!(!base.join("immigration_corpus.jsonl").exists());
    assert!(!base.join("immigration_corpus.parquet").exists());
}

#[test]
fn test_missing_downloads_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    write_metadata(base);

    let err = run_assembly(&config_for(base)).unwrap_err();

    assert!(matches!(
        err,
        AssemblyError::Corpus(CorpusError::MissingInput { .. })
    ));
    assert!(!base.join("assembly_report.json").exists());
}

#[test]
fn test_missing_metadata_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("downloads")).unwrap();

    let err = run_assembly(&config_for(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        AssemblyError::Corpus(CorpusError::MissingInput { .. })
    ));
}

#[test]
fn test_query_batches_cover_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    write_metadata(base);

    let manifest = run_queries(&config_for(base)).unwrap();

    assert_eq!(manifest.total_batches, 1);
    assert_eq!(manifest.total_articles, 4);
    let ids: Vec<_> = manifest.batches[0]
        .articles
        .iter()
        .map(|a| a.id.as_str())
        .collect();
    // undated first, then by (year, month)
    assert_eq!(ids, vec!["N9", "D1", "D2", "A1"]);
    assert!(base.join("search_queries").join("batch_01.txt").exists());
    assert!(base.join("search_queries").join("manifest.json").exists());
}

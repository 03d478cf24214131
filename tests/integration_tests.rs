use seo_compare::analyzers::aggregate::average;
use seo_compare::analyzers::compare::ComparisonSession;
use seo_compare::analyzers::types::{MergedRecord, SEO_FIELDS, Slot, TargetFieldSet};
use seo_compare::export::render::{ChartView, SvgChartRenderer};
use seo_compare::export::ExportCoordinator;
use seo_compare::fetch::{BasicClient, ScrapingService};
use seo_compare::output::{ComparisonReport, write_csv};
use seo_compare::parser::TableParser;

const DATASET_A: &str = include_str!("fixtures/dataset_a.csv");
const DATASET_B: &str = include_str!("fixtures/dataset_b.csv");

fn find<'a>(merged: &'a [MergedRecord], field: &str) -> &'a MergedRecord {
    merged
        .iter()
        .find(|r| r.field == field)
        .unwrap_or_else(|| panic!("no merged record for {field}"))
}

#[test]
fn test_full_pipeline() {
    let mut session = ComparisonSession::default();
    session.load(Slot::First, DATASET_A, "dataset_a.csv").unwrap();
    session.load(Slot::Second, DATASET_B, "dataset_b.csv").unwrap();

    let merged = session.merged();
    assert_eq!(merged.len(), SEO_FIELDS.len());

    let fields: Vec<_> = merged.iter().map(|r| r.field.as_str()).collect();
    assert_eq!(fields, SEO_FIELDS);

    let h1 = find(&merged, "tot h1");
    assert_eq!(h1.first, 2.0);
    assert_eq!(h1.second, 5.0);

    let title = find(&merged, "lunghezza title");
    assert_eq!(title.first, 10.33);
    assert_eq!(title.second, 5.33);

    let words = find(&merged, "total_words");
    assert_eq!(words.first, 806.67);
    // `n/a` counts as zero but the row still counts.
    assert_eq!(words.second, 266.67);

    let keywords = find(&merged, "keyword_count");
    assert_eq!(keywords.first, 8.33);
    // Empty cell on a short row.
    assert_eq!(keywords.second, 1.67);

    let density = find(&merged, "keyword_density");
    assert!((density.first - 1.07).abs() < 1e-9);
    assert_eq!(density.second, 0.5);

    let h6 = find(&merged, "tot h6");
    assert_eq!(h6.first, 0.0);
    assert_eq!(h6.second, 0.0);
}

#[test]
fn test_only_first_dataset() {
    let mut session = ComparisonSession::default();
    session.load(Slot::First, DATASET_A, "dataset_a.csv").unwrap();

    let rows = TableParser::new().parse(DATASET_A).unwrap();
    let expected = average(&rows, &TargetFieldSet::seo());

    let merged = session.merged();
    assert_eq!(merged.len(), expected.len());
    for (record, avg) in merged.iter().zip(&expected) {
        assert_eq!(record.field, avg.field);
        assert_eq!(record.first, avg.average);
        assert_eq!(record.second, 0.0);
    }
}

#[test]
fn test_multiline_cells_do_not_split_rows() {
    let rows = TableParser::new().parse(DATASET_A).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("h2"), Some("Road\nTrail"));
    assert_eq!(rows[1].get("url"), Some("https://b.example/run"));
}

#[test]
fn test_reupload_replaces_only_that_slot() {
    let mut session = ComparisonSession::default();
    session.load(Slot::First, DATASET_A, "dataset_a.csv").unwrap();
    session.load(Slot::Second, DATASET_B, "dataset_b.csv").unwrap();

    session.load(Slot::First, DATASET_B, "dataset_b_again.csv").unwrap();

    let h1 = find(&session.merged(), "tot h1").clone();
    assert_eq!(h1.first, 5.0);
    assert_eq!(h1.second, 5.0);
    assert_eq!(session.label(Slot::First), Some("dataset_b_again.csv"));
    assert_eq!(session.label(Slot::Second), Some("dataset_b.csv"));
}

#[test]
fn test_csv_export_of_merged_series() {
    let mut session = ComparisonSession::new(TargetFieldSet::new(["tot h1", "tot h2"]));
    session.load(Slot::First, DATASET_A, "dataset_a.csv").unwrap();
    session.load(Slot::Second, DATASET_B, "dataset_b.csv").unwrap();

    let merged = session.merged();
    let report = ComparisonReport::new(
        session.label(Slot::First),
        session.label(Slot::Second),
        &merged,
    );
    let mut buf = Vec::new();
    write_csv(&mut buf, &report).unwrap();

    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "field,dataset_a.csv,dataset_b.csv\ntot h1,2.00,5.00\ntot h2,1.00,1.33\n"
    );
}

#[tokio::test]
async fn test_snapshot_of_loaded_comparison() {
    let mut session = ComparisonSession::default();
    session.load(Slot::First, DATASET_A, "dataset_a.csv").unwrap();
    session.load(Slot::Second, DATASET_B, "dataset_b.csv").unwrap();

    let service = ScrapingService::new(BasicClient::new(), "http://127.0.0.1:9").unwrap();
    let mut exporter = ExportCoordinator::new(service, SvgChartRenderer::new());
    exporter.renderer_mut().register(
        "chart",
        ChartView {
            title: "dataset_a.csv vs dataset_b.csv".to_string(),
            first_label: "dataset_a.csv".to_string(),
            second_label: "dataset_b.csv".to_string(),
            series: session.merged(),
        },
    );

    let snapshot = exporter
        .export_snapshot("chart", "dataset_a.csv", "dataset_b.csv")
        .await
        .unwrap();

    assert_eq!(snapshot.file_name, "dataset_a vs dataset_b.svg");
    let svg = std::str::from_utf8(&snapshot.bytes).unwrap();
    assert!(svg.contains("keyword_density"));
}

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use simple_excel_writer::{Row, Workbook};
use tempfile::TempDir;

use diamond_analyzer::analysis::{
    compute_correlation_matrix, compute_missing_report, compute_summary_stats,
    compute_unique_report, dataset_info, fit_linear_trend, prepare_plot, ColumnSummary, PlotData,
    PlotKind, Statistic, StatValue, UniqueLimits, DEFAULT_BINS, DEFAULT_PROBLEMATIC_PERCENT,
};
use diamond_analyzer::export::export_summary_csv;
use diamond_analyzer::{load_dataset, AnalysisError, CellValue, ColumnKind, Session};

const DIAMONDS: &str = "\
carat,cut,color,clarity,depth,table,price,x,y,z
0.23,Ideal,E,SI2,61.5,55,326,3.95,3.98,2.43
0.21,Premium,E,SI1,59.8,61,326,3.89,3.84,2.31
0.23,Good,E,VS1,56.9,65,327,4.05,4.07,2.31
0.29,Premium,I,VS2,62.4,58,334,4.20,4.23,2.63
0.31,Good,J,SI2,63.3,58,335,4.34,4.35,2.75
0.24,Very Good,J,VVS2,62.8,57,336,3.94,3.96,2.48
1.01,Ideal,G,VS1,61.6,56,5100,6.41,6.44,3.96
1.52,Premium,H,SI1,,58,8670,7.38,7.32,4.54
";

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn write_parquet(path: &Path) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("carat", DataType::Float64, true),
        Field::new("cut", DataType::Utf8, true),
        Field::new("price", DataType::Int64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(vec![Some(0.23), Some(0.21), None])),
        Arc::new(StringArray::from(vec![Some("Ideal"), None, Some("Good")])),
        Arc::new(Int64Array::from(vec![326, 326, 327])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

    let file = fs::File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

fn sheet_row(cells: &[&str]) -> Row {
    let mut row = Row::new();
    for cell in cells {
        match cell.parse::<f64>() {
            Ok(v) => row.add_cell(v),
            Err(_) => row.add_cell(*cell),
        }
    }
    row
}

/// Two sheets; the first holds the data, the second must be ignored.
fn write_workbook(path: &Path) {
    let mut workbook = Workbook::create(path.to_str().unwrap());

    let mut data = workbook.create_sheet("diamonds");
    workbook
        .write_sheet(&mut data, |sheet| {
            sheet.append_row(sheet_row(&["carat", "cut", "price"]))?;
            sheet.append_row(sheet_row(&["0.23", "Ideal", "326"]))?;
            sheet.append_row(sheet_row(&["0.21", "Premium"]))?;
            sheet.append_row(sheet_row(&["0.29", "NA", "334"]))
        })
        .unwrap();

    let mut other = workbook.create_sheet("notes");
    workbook
        .write_sheet(&mut other, |sheet| {
            sheet.append_row(sheet_row(&["comment"]))?;
            sheet.append_row(sheet_row(&["not data"]))
        })
        .unwrap();

    workbook.close().unwrap();
}

#[test]
fn small_csv_with_missing_numeric_cell() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "small.csv", "a,b\n1,x\n,y\n3,x\n");

    let ds = load_dataset(&path).unwrap();
    assert_eq!(ds.row_count(), 3);
    assert_eq!(ds.column("a").unwrap().kind(), ColumnKind::Numeric);
    assert_eq!(ds.column("b").unwrap().kind(), ColumnKind::Categorical);

    let stats = compute_summary_stats(&ds).unwrap();
    assert_eq!(stats.get("b").unwrap().count(), 3);
    match stats.get("a").unwrap() {
        ColumnSummary::Numeric(s) => {
            assert_eq!(s.count, 2);
            assert_eq!(s.mean, Some(2.0));
            assert_eq!(s.median, Some(2.0));
        }
        other => panic!("expected numeric summary, got {other:?}"),
    }

    let missing = compute_missing_report(&ds, DEFAULT_PROBLEMATIC_PERCENT);
    let a = missing.get("a").unwrap();
    assert_eq!(a.missing, 1);
    assert!((a.percent - 33.333).abs() < 0.01);
    assert!(a.problematic);
    assert_eq!(missing.get("b").unwrap().missing, 0);
}

#[test]
fn full_pipeline_on_diamonds_sample() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "diamonds.csv", DIAMONDS);
    let ds = load_dataset(&path).unwrap();

    let info = dataset_info(&ds);
    assert_eq!(info.rows, 8);
    assert_eq!(info.columns, 10);
    assert_eq!(info.numeric_columns, 7);
    assert_eq!(info.categorical_columns, 3);

    let stats = compute_summary_stats(&ds).unwrap();
    let table = stats.table();
    assert_eq!(
        table.cell(Statistic::Top, "cut"),
        Some(&StatValue::Text("Premium".into()))
    );
    assert_eq!(table.cell(Statistic::Count, "depth"), Some(&StatValue::Count(7)));
    assert_eq!(table.cell(Statistic::Mean, "cut"), None);

    let corr = compute_correlation_matrix(&ds).unwrap();
    assert_eq!(corr.len(), 7);
    let r = corr.get("carat", "price").unwrap();
    assert!(r > 0.99, "carat/price correlation was {r}");
    assert_eq!(corr.get("carat", "price"), corr.get("price", "carat"));

    let ranked = corr.ranked_against("price").unwrap();
    assert_eq!(ranked.len(), 6);
    assert!(ranked.iter().all(|(name, _)| name != "price"));
    assert_eq!(ranked[0].0, "carat");

    let unique = compute_unique_report(&ds, UniqueLimits::default());
    let color = unique.get("color").unwrap();
    assert_eq!(color.distinct, 5);
    assert!(!color.truncated);
    assert_eq!(color.values[0], CellValue::Text("E".into()));

    let fit = fit_linear_trend(&ds, "carat", "price").unwrap();
    assert_eq!(fit.n, 8);
    assert!(fit.slope > 0.0);
    assert!(fit.r_squared > 0.98);

    match prepare_plot(&ds, "carat", "price", PlotKind::HistogramY, DEFAULT_BINS).unwrap() {
        PlotData::Histogram(h) => assert_eq!(h.total(), 8),
        other => panic!("expected histogram, got {other:?}"),
    }
}

#[test]
fn tsv_and_json_load_like_csv() {
    let dir = TempDir::new().unwrap();
    let tsv = write(&dir, "d.tsv", "carat\tcut\n0.23\tIdeal\n0.21\tPremium\n");
    let json = write(
        &dir,
        "d.json",
        r#"[{"carat": 0.23, "cut": "Ideal"}, {"cut": "Premium", "carat": 0.21}]"#,
    );

    for path in [tsv, json] {
        let ds = load_dataset(&path).unwrap();
        assert_eq!(ds.column_names().collect::<Vec<_>>(), vec!["carat", "cut"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column("carat").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(ds.source(), Some(path.as_path()));
    }
}

#[test]
fn parquet_keeps_arrow_types() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("d.parquet");
    write_parquet(&path);

    let ds = load_dataset(&path).unwrap();
    assert_eq!(ds.row_count(), 3);
    assert_eq!(ds.numeric_column("price").unwrap(), &[Some(326.0), Some(326.0), Some(327.0)]);
    assert_eq!(ds.column("carat").unwrap().missing_count(), 1);
    assert_eq!(ds.column("cut").unwrap().kind(), ColumnKind::Categorical);
    assert_eq!(ds.column("cut").unwrap().missing_count(), 1);
}

#[test]
fn workbook_reads_first_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("d.xlsx");
    write_workbook(&path);

    let ds = load_dataset(&path).unwrap();
    assert_eq!(ds.column_names().collect::<Vec<_>>(), vec!["carat", "cut", "price"]);
    assert_eq!(ds.row_count(), 3);
    assert_eq!(ds.numeric_column("carat").unwrap(), &[Some(0.23), Some(0.21), Some(0.29)]);
    assert_eq!(ds.numeric_column("price").unwrap(), &[Some(326.0), None, Some(334.0)]);

    let cut = ds.column("cut").unwrap();
    assert_eq!(cut.kind(), ColumnKind::Categorical);
    assert_eq!(cut.missing_count(), 1);
    assert!(ds.column("comment").is_none());
}

#[test]
fn infinite_cells_never_reach_the_statistics() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "inf.csv", "price\n1\ninf\n3\n");
    let ds = load_dataset(&path).unwrap();

    let stats = compute_summary_stats(&ds).unwrap();
    match stats.get("price").unwrap() {
        ColumnSummary::Numeric(s) => {
            assert_eq!(s.count, 2);
            assert_eq!(s.mean, Some(2.0));
            assert!(s.std.unwrap().is_finite());
        }
        other => panic!("expected numeric summary, got {other:?}"),
    }

    let out = dir.path().join("stats.csv");
    export_summary_csv(&stats, &out).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert!(!text.to_lowercase().contains("nan"));
    assert!(!text.contains("inf"));
}

#[test]
fn signed_zeros_are_one_value() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "zeros.csv", "x\n0\n-0\n0.0\n-0.0\n");
    let ds = load_dataset(&path).unwrap();

    let unique = compute_unique_report(&ds, UniqueLimits::default());
    let x = unique.get("x").unwrap();
    assert_eq!(x.distinct, 1);
    assert_eq!(x.values, vec![CellValue::Number(0.0)]);
}

#[test]
fn load_errors() {
    let dir = TempDir::new().unwrap();

    let txt = write(&dir, "d.txt", "a,b\n1,2\n");
    assert!(matches!(
        load_dataset(&txt),
        Err(AnalysisError::UnsupportedFormat { .. })
    ));

    let ragged = write(&dir, "bad.csv", "a,b\n1,2\n3,4,5\n");
    assert!(matches!(load_dataset(&ragged), Err(AnalysisError::Parse { .. })));

    let empty = write(&dir, "empty.csv", "");
    assert!(matches!(load_dataset(&empty), Err(AnalysisError::Parse { .. })));

    assert!(matches!(
        load_dataset(&dir.path().join("absent.csv")),
        Err(AnalysisError::FileNotFound(_))
    ));
}

#[test]
fn export_writes_merged_table() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "diamonds.csv", DIAMONDS);
    let ds = load_dataset(&path).unwrap();
    let stats = compute_summary_stats(&ds).unwrap();

    let out = dir.path().join("diamond_statistics.csv");
    export_summary_csv(&stats, &out).unwrap();

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(header[0], "");
    assert_eq!(&header[1..], ds.column_names().collect::<Vec<_>>().as_slice());

    let labels: Vec<String> = reader
        .records()
        .map(|r| r.unwrap().get(0).unwrap().to_string())
        .collect();
    let expected: Vec<&str> = Statistic::ALL.iter().map(|s| s.label()).collect();
    assert_eq!(labels, expected);
}

#[test]
fn session_survives_bad_input() {
    let dir = TempDir::new().unwrap();
    let good = write(&dir, "diamonds.csv", DIAMONDS);
    let bad = write(&dir, "bad.csv", "a,b\n1,2,3\n");

    let mut session = Session::default();
    session.load(&good).unwrap();
    assert!(session.load(&bad).is_err());
    assert_eq!(session.dataset().unwrap().row_count(), 8);

    let fit = session.run("trend", |ds| fit_linear_trend(ds, "cut", "price"));
    assert!(fit.is_none());
    assert!(session.run("statistics", compute_summary_stats).is_some());
}

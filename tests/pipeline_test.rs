mod common;

use std::fs;

use common::{config_with_extract, extract_line, sample_lines};
use delivery_analytics::analysis::kpi_summary;
use delivery_analytics::report::processed::summarize_processed;
use delivery_analytics::{DeliveryError, LoadStatus, SqliteStore, run};

#[test]
fn test_run_end_to_end() -> delivery_analytics::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_extract(dir.path(), &sample_lines());

    let outcome = run(&config)?;
    let report = &outcome.report;

    assert_eq!(report.input_rows, 8);
    assert_eq!(report.output_rows, 5);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.rejected["missing_order_id"], 1);
    assert_eq!(report.rejected["invalid_order_date"], 1);
    assert!(report.is_balanced());
    assert_eq!(report.field("agent_rating").unwrap().out_of_range, 1);
    assert_eq!(report.field("weather").unwrap().imputed, 1);
    assert_eq!(report.load_status, LoadStatus::Succeeded { rows: 5 });
    assert_eq!(outcome.loaded_rows, Some(5));
    assert!(report.generated_at.is_some());

    let text = fs::read_to_string(&config.report.report_path).unwrap();
    assert!(text.contains("DELIVERIES DATA - VALIDATION REPORT"));
    assert!(text.contains("succeeded (5 rows committed)"));

    let store = SqliteStore::open(&config.store)?;
    let kpi = kpi_summary(&store)?;
    assert_eq!(kpi.total_deliveries, 5);
    assert_eq!(kpi.active_days, 5);
    assert_eq!(kpi.areas_covered, 3);
    // 120, 110 (Grocery median), 100, 150, 140
    assert_eq!(kpi.avg_delivery_time_min, Some(124.0));

    let summary = summarize_processed(&config.processed_dataset)?;
    assert_eq!(summary.rows, 5);
    assert_eq!(summary.column("delivery_time").unwrap().missing, 0);
    Ok(())
}

#[test]
fn test_rerun_is_a_full_refresh() -> delivery_analytics::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_extract(dir.path(), &sample_lines());
    run(&config)?;

    common::write_extract(
        &config.raw_dataset,
        &[extract_line("z1", "2022-04-01", "30", "5.0", "Urban", "Sunny", "Toys")],
    );
    run(&config)?;

    let store = SqliteStore::open(&config.store)?;
    assert_eq!(store.row_count()?, 1);
    Ok(())
}

#[test]
fn test_report_written_when_load_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_extract(dir.path(), &sample_lines());
    // Not an SQLite file, so the first statement of the load fails
    let garbage = vec![b'x'; 4096];
    fs::write(&config.store.path, &garbage).unwrap();

    let err = run(&config).unwrap_err();
    assert!(matches!(err, DeliveryError::Persistence(_)), "got {err}");

    let text = fs::read_to_string(&config.report.report_path).unwrap();
    assert!(text.contains("Load status: FAILED"));
    assert!(text.contains("Output rows:        5"));
    assert!(config.processed_dataset.exists());
    assert_eq!(fs::read(&config.store.path).unwrap(), garbage);
}

#[test]
fn test_input_error_aborts_before_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = delivery_analytics::PipelineConfig::with_data_dir(dir.path());

    let err = run(&config).unwrap_err();
    assert!(matches!(err, DeliveryError::Input(_)));
    assert!(!config.store.path.exists());
    assert!(!config.report.report_path.exists());
}

#[test]
fn test_missing_required_column_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = delivery_analytics::PipelineConfig::with_data_dir(dir.path());
    fs::create_dir_all(config.raw_dataset.parent().unwrap()).unwrap();
    fs::write(&config.raw_dataset, "Order_ID,Order_Date\n1,2022-01-01\n").unwrap();

    let err = run(&config).unwrap_err();
    assert!(err.to_string().contains("missing required columns"));
    assert!(!config.store.path.exists());
}

#[test]
fn test_skip_load_and_json_report() -> delivery_analytics::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_with_extract(dir.path(), &sample_lines());
    config.skip_load = true;
    config.report.write_json = true;

    let outcome = run(&config)?;
    assert_eq!(outcome.loaded_rows, None);
    assert_eq!(outcome.report.load_status, LoadStatus::Skipped);
    assert!(!config.store.path.exists());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(config.report.json_path()).unwrap()).unwrap();
    assert_eq!(json["load_status"]["status"], "skipped");
    assert_eq!(json["output_rows"], 5);
    assert_eq!(json["rejections"][0]["kind"], "missing_order_id");
    Ok(())
}

#[test]
fn test_unreachable_store_fails_load_with_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_with_extract(dir.path(), &sample_lines());
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "plain file").unwrap();
    config.store.path = blocker.join("sub").join("deliveries.db");

    let err = run(&config).unwrap_err();
    assert!(matches!(err, DeliveryError::Persistence(_)), "got {err}");

    let text = fs::read_to_string(&config.report.report_path).unwrap();
    assert!(text.contains("Load status: FAILED"));
    assert!(config.processed_dataset.exists());
}

#[test]
fn test_fully_rejected_extract_empties_table() -> delivery_analytics::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_extract(dir.path(), &sample_lines());
    run(&config)?;

    common::write_extract(
        &config.raw_dataset,
        &[extract_line("", "2022-04-01", "30", "5.0", "Urban", "Sunny", "Toys")],
    );
    let outcome = run(&config)?;
    assert_eq!(outcome.report.output_rows, 0);
    assert_eq!(outcome.report.rejected["missing_order_id"], 1);
    assert_eq!(outcome.report.load_status, LoadStatus::Succeeded { rows: 0 });

    let store = SqliteStore::open_read_only(&config.store)?;
    assert!(store.table_exists()?);
    assert_eq!(store.row_count()?, 0);
    Ok(())
}

// tests/analysis_integration_test.rs

use std::fs;

use chrono::Duration;
use pq_csv_render::constants::{COL_CHECK_PQS, COL_DIFF, COL_DIFF_PERCENTAGE, COL_DIFF_PQS, COL_SSUM_CAL};
use pq_csv_render::data_analysis::consumption::{calculate_consumption, energy_columns, Period};
use pq_csv_render::data_analysis::power_checks::{add_check_columns, find_min_value};
use pq_csv_render::data_analysis::reference_compare::{
    add_difference_columns, align_to_grid, charger_columns,
};
use pq_csv_render::data_input::csv_loader::{load_directory, load_reference_file};

const METER_CSV: &str = "\
Time,S1,P1,Q1,Psum_kW,Qsum_kvar,Ssum_kVA,EP_TOTAL_kWh
2024-12-09 10:00:00,5.0,3.0,4.0,30.0,40.0,50.0,1000.0
2024-12-09 10:01:00,7.5,3.0,4.0,12.0,5.0,13.0,1001.0
2024-12-09 10:02:00,4.0,3.0,4.0,9.0,0.0,9.0,1002.5
2024-12-10 09:00:00,5.0,3.0,4.0,8.0,6.0,10.0,1010.0
";

#[test]
fn test_check_and_consumption_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("meter.csv"), METER_CSV).unwrap();
    let mut frame = load_directory(dir.path(), "Time").unwrap();

    let summary = add_check_columns(&mut frame, 1.0);
    assert!(summary.skipped.is_empty());
    assert_eq!(summary.added, vec![COL_DIFF_PQS, COL_CHECK_PQS, COL_SSUM_CAL]);
    assert_eq!(summary.rows_checked, 4);
    assert_eq!(summary.rows_within_tolerance, 3);

    assert_eq!(
        frame.column(COL_SSUM_CAL).unwrap().to_vec(),
        vec![50.0, 13.0, 9.0, 10.0]
    );
    let min = find_min_value(&frame, COL_DIFF_PQS).unwrap().unwrap();
    assert_eq!(min.value, -1.0);
    assert_eq!(min.timestamp, frame.index()[2]);

    let energy = energy_columns(&frame);
    assert_eq!(energy, vec!["EP_TOTAL_kWh"]);
    let daily = calculate_consumption(&frame, &energy, Period::Daily).unwrap();
    let values: Vec<Option<f64>> = daily.rows.iter().map(|r| r.values[0]).collect();
    assert_eq!(values, vec![Some(2.5), Some(0.0)]);

    let out = dir.path().join("daily.csv");
    daily.export_csv(&out).unwrap();
    let exported = fs::read_to_string(out).unwrap();
    assert!(exported.starts_with("Date,Daily_EP_TOTAL_kWh_Consumption\n2024-12-09,2.5000\n"));
}

#[test]
fn test_reference_comparison_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let meter_dir = dir.path().join("meter");
    fs::create_dir(&meter_dir).unwrap();
    fs::write(
        meter_dir.join("meter.csv"),
        "Time,Psum_kW\n\
         2024-12-09 09:58:00,1.0\n\
         2024-12-09 10:00:00,22.0\n\
         2024-12-09 10:01:00,15.0\n\
         2024-12-09 10:02:00,40.0\n",
    )
    .unwrap();
    let cms_path = dir.path().join("cms.csv");
    fs::write(
        &cms_path,
        "timestamp,site_power,charger_1,charger_2\n\
         2024-12-09T10:00:00Z,20.0,10.0,10.0\n\
         2024-12-09T10:01:00Z,20.0,12.0,8.0\n\
         2024-12-09T10:03:00Z,20.0,11.0,9.0\n",
    )
    .unwrap();

    let meter = load_directory(&meter_dir, "Time").unwrap();
    let cms = load_reference_file(&cms_path, "timestamp").unwrap();
    let (mut meter, mut cms) = align_to_grid(&meter, &cms, Duration::minutes(1)).unwrap();
    assert_eq!(meter.len(), 3);
    assert_eq!(meter.index(), cms.index());

    add_difference_columns(&mut meter, &mut cms, "Psum_kW", "site_power").unwrap();
    let diff = meter.column(COL_DIFF).unwrap();
    assert_eq!(diff[0], 2.0);
    assert_eq!(diff[1], -5.0);
    assert!(diff[2].is_nan());

    let pct = cms.column(COL_DIFF_PERCENTAGE).unwrap();
    assert_eq!(pct[0], 10.0);
    assert_eq!(pct[1], 0.0);
    assert!(pct[2].is_nan());

    assert_eq!(charger_columns(&cms), vec!["site_power", "charger_1", "charger_2"]);
}

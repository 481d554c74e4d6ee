// src/constants.rs

// Plot dimensions (14x8 inch figure at 100 dpi).
pub const PLOT_WIDTH: u32 = 1400;
pub const PLOT_HEIGHT: u32 = 800;

// Stroke widths for lines
pub const LINE_WIDTH_PLOT: u32 = 1;
pub const LINE_WIDTH_LEGEND: u32 = 2;

// Font sizes
pub const FONT_SIZE_MAIN_TITLE: i32 = 24;
pub const FONT_SIZE_CHART_TITLE: i32 = 18;
pub const FONT_SIZE_AXIS_LABEL: i32 = 13;
pub const FONT_SIZE_LEGEND: i32 = 12;
pub const FONT_SIZE_MESSAGE: i32 = 20;

// Default input column names.
pub const DEFAULT_TIME_COLUMN: &str = "Time";
pub const DEFAULT_REFERENCE_TIME_COLUMN: &str = "timestamp";

// Default reference (CMS) dataset location.
pub const DEFAULT_REFERENCE_FILE: &str = "./data/mth_meter_data_2024-12-09.csv";

// Reference alignment grid step (one minute).
pub const DEFAULT_ALIGN_STEP_SECONDS: i64 = 60;
pub const MAX_ALIGN_STEP_SECONDS: i64 = 86_400;

// Allowed S - sqrt(P^2 + Q^2) residual before a row fails the check (kVA).
pub const DEFAULT_APPARENT_POWER_TOLERANCE: f64 = 1.0;

// Meter vs reference comparison columns.
pub const DEFAULT_METER_POWER_COLUMN: &str = "Psum_kW";
pub const DEFAULT_REFERENCE_POWER_COLUMN: &str = "site_power";

// Derived column names.
pub const COL_DIFF_PQS: &str = "diff_pqs";
pub const COL_CHECK_PQS: &str = "check_pqs";
pub const COL_SSUM_CAL: &str = "Ssum_cal";
pub const COL_DIFF: &str = "diff";
pub const COL_DIFF_PERCENTAGE: &str = "diff_site_power_percentage";

// Energy register markers used to detect consumption columns.
pub const ENERGY_COLUMN_MARKERS: [&str; 2] = ["EP_TOTAL", "EQ_TOTAL"];

// Percentage difference clip bounds.
pub const PERCENTAGE_CLIP_MIN: f64 = 0.0;
pub const PERCENTAGE_CLIP_MAX: f64 = 100.0;

// src/constants.rs

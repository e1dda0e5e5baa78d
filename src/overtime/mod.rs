//! Rolling 13-week overtime aggregation.
//!
//! Summaries are computed from imported weekly rows and memoized in the
//! store until the next import. Reports filter, sort and paginate one
//! summary row per employee.

mod report;
mod summary;

pub use report::{
    DEFAULT_PER_PAGE, MAX_PER_PAGE, MAX_SORT_KEYS, OvertimeReportQuery, SortDirection, SortField,
    SortKey, build_report, employee_summary, overtime_report,
};
pub use summary::{ROLLING_WINDOW_WEEKS, TREND_THRESHOLD, check_alert, classify_trend, summarize};

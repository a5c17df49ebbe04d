// src/scheduler/window.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Start/end timestamps bounding a predictor run.
///
/// Runs currently always use [`ExecutionWindow::fixed`]; the bounds are not
/// derived from configuration or from the last recorded execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ExecutionWindow {
    /// 1970-01-01T00:00:00Z .. 2022-01-01T00:00:00Z
    pub fn fixed() -> Self {
        Self {
            start: midnight_utc(1970, 1, 1),
            end: midnight_utc(2022, 1, 1),
        }
    }

    /// Dates in the `YYYY-MM-DD` form the run endpoint expects.
    pub fn as_query_dates(&self) -> (String, String) {
        (
            self.start.format("%Y-%m-%d").to_string(),
            self.end.format("%Y-%m-%d").to_string(),
        )
    }
}

impl Default for ExecutionWindow {
    fn default() -> Self {
        Self::fixed()
    }
}

fn midnight_utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_window_matches_literal_bounds() {
        let window = ExecutionWindow::fixed();
        assert_eq!(window.start.to_rfc3339(), "1970-01-01T00:00:00+00:00");
        assert_eq!(window.end.to_rfc3339(), "2022-01-01T00:00:00+00:00");
        assert_eq!(
            window.as_query_dates(),
            ("1970-01-01".to_string(), "2022-01-01".to_string())
        );
    }
}

//! Maps the fetched report and the view state to what the screen shows.
//!
//! Everything here is a pure function of its inputs; drawing the result to a
//! terminal lives in [`crate::render`].

use crate::error::FetchError;
use crate::format::Formatter;
use crate::report::{HouseRecord, MaintenanceReport, Period, Totals};
use crate::view::{Tab, ViewState};

/// One household line in the active list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub house_id: String,
    pub address: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Nothing received yet, a fetch is outstanding
    Loading,
    /// Nothing received yet, the last fetch failed
    Failed { message: String, retry_hint: String },
    Report {
        counters: Totals,
        active_tab: Tab,
        rows: Vec<Row>,
        /// Set when the active list is empty
        empty_message: Option<String>,
        /// Set when the last fetch failed and older data is shown
        stale: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub period_label: String,
    pub refreshing: bool,
    pub body: Body,
}

impl Frame {
    /// Number of record rows rendered for the active tab
    pub fn record_count(&self) -> usize {
        match &self.body {
            Body::Report { rows, .. } => rows.len(),
            _ => 0,
        }
    }
}

pub fn present(
    report: Option<&MaintenanceReport>,
    loading: bool,
    error: Option<&FetchError>,
    view: &ViewState,
    fmt: &dyn Formatter,
) -> Frame {
    let labels = fmt.labels();

    let body = match report {
        None if !loading && error.is_some() => Body::Failed {
            message: format!(
                "{}: {}",
                labels.load_failed,
                error.map(ToString::to_string).unwrap_or_default()
            ),
            retry_hint: labels.retry_hint.to_string(),
        },
        None => Body::Loading,
        Some(report) => {
            let records = match view.active_tab {
                Tab::Paid => &report.paid_records,
                Tab::Unpaid => &report.unpaid_records,
            };
            let rows: Vec<Row> = records
                .iter()
                .map(|record| Row {
                    house_id: record.house_id.clone(),
                    address: record.address.clone(),
                    detail: detail_label(record, view.active_tab, fmt),
                })
                .collect();
            let empty_message = rows.is_empty().then(|| {
                match view.active_tab {
                    Tab::Paid => labels.empty_paid,
                    Tab::Unpaid => labels.empty_unpaid,
                }
                .to_string()
            });
            let stale = error.map(|e| format!("{} ({e}). {}", labels.stale_data, labels.retry_hint));

            Body::Report {
                counters: report.totals,
                active_tab: view.active_tab,
                rows,
                empty_message,
                stale,
            }
        }
    };

    Frame {
        period_label: period_label(report.and_then(|r| r.period.as_ref()), fmt),
        refreshing: view.refresh_in_flight,
        body,
    }
}

/// Localized "month year" for the report period, empty when there is none
pub fn period_label(period: Option<&Period>, fmt: &dyn Formatter) -> String {
    period
        .and_then(Period::first_day)
        .map(|day| fmt.month_year(day))
        .unwrap_or_default()
}

/// Per-row text: payment summary on the paid tab, arrears on the unpaid tab
pub fn detail_label(record: &HouseRecord, tab: Tab, fmt: &dyn Formatter) -> String {
    let labels = fmt.labels();
    match tab {
        Tab::Paid => {
            let amount = record
                .last_payment_amount
                .map(|a| fmt.currency(a))
                .unwrap_or_else(|| labels.payment_recorded.to_string());
            let date = record
                .last_payment_date
                .map(|d| fmt.short_date(d))
                .unwrap_or_else(|| labels.no_date.to_string());
            format!("{amount} · {date}")
        }
        Tab::Unpaid if record.months_overdue > 0 => labels.months_overdue(record.months_overdue),
        Tab::Unpaid => labels.pending_current_period.to_string(),
    }
}

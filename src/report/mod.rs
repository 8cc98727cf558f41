mod client;
mod model;

pub use client::{decode_report, report_url, ReportClient, ReportSource, REPORT_PATH};
pub use model::{HouseRecord, MaintenanceReport, Period, Totals};

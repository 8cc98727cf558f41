pub mod config;
pub mod error;
pub mod format;
pub mod live;
pub mod presenter;
pub mod render;
pub mod report;
pub mod screen;
pub mod view;

pub use config::{Config, Connection};
pub use error::{AppError, FetchError, Result};
pub use format::{Formatter, Locale, LocaleFormatter};
pub use presenter::{present, Body, Frame, Row};
pub use report::{HouseRecord, MaintenanceReport, Period, ReportClient, ReportSource, Totals};
pub use screen::ReportScreen;
pub use view::{Tab, ViewState};

use tabled::{builder::Builder, settings::Style};

use crate::format::Formatter;
use crate::presenter::{Body, Frame, Row};
use crate::view::Tab;

/// Draw a frame as plain terminal text
pub fn to_text(frame: &Frame, fmt: &dyn Formatter) -> String {
    let labels = fmt.labels();
    let mut out = String::new();

    if frame.period_label.is_empty() {
        out.push_str(labels.title);
    } else {
        out.push_str(&format!("{} · {}", labels.title, frame.period_label));
    }
    out.push('\n');

    if frame.refreshing {
        out.push_str(labels.refreshing);
        out.push('\n');
    }

    match &frame.body {
        Body::Loading => {
            out.push_str(labels.loading);
            out.push('\n');
        }
        Body::Failed {
            message,
            retry_hint,
        } => {
            out.push_str(message);
            out.push('\n');
            out.push_str(retry_hint);
            out.push('\n');
        }
        Body::Report {
            counters,
            active_tab,
            rows,
            empty_message,
            stale,
        } => {
            let mut builder = Builder::default();
            builder.push_record([labels.total, labels.paid, labels.unpaid]);
            builder.push_record([
                counters.total.to_string(),
                counters.paid.to_string(),
                counters.unpaid.to_string(),
            ]);
            out.push_str(&builder.build().with(Style::rounded()).to_string());
            out.push('\n');

            out.push_str(&tab_selector(*active_tab, fmt));
            out.push('\n');

            if let Some(stale) = stale {
                out.push_str(&format!("! {stale}\n"));
            }

            match empty_message {
                Some(message) => {
                    out.push_str(message);
                    out.push('\n');
                }
                None => {
                    out.push_str(&record_table(rows, fmt));
                    out.push('\n');
                }
            }
        }
    }

    out
}

fn tab_selector(active: Tab, fmt: &dyn Formatter) -> String {
    let labels = fmt.labels();
    let mark = |tab: Tab, name: &str| {
        if tab == active {
            format!("[{name}]")
        } else {
            format!(" {name} ")
        }
    };
    format!(
        "{}  {}",
        mark(Tab::Unpaid, labels.tab_unpaid),
        mark(Tab::Paid, labels.tab_paid)
    )
}

fn record_table(rows: &[Row], fmt: &dyn Formatter) -> String {
    let labels = fmt.labels();
    let mut builder = Builder::default();
    builder.push_record([labels.house, labels.address, labels.detail]);
    for row in rows {
        builder.push_record([row.house_id.as_str(), row.address.as_str(), row.detail.as_str()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Locale, LocaleFormatter};
    use crate::report::Totals;

    fn en() -> LocaleFormatter {
        LocaleFormatter::new(Locale::EnUs, "$")
    }

    #[test]
    fn renders_counters_rows_and_active_tab() {
        let frame = Frame {
            period_label: "March 2024".into(),
            refreshing: false,
            body: Body::Report {
                counters: Totals { total: 3, paid: 1, unpaid: 2 },
                active_tab: Tab::Unpaid,
                rows: vec![Row {
                    house_id: "B-7".into(),
                    address: "Olmos 7".into(),
                    detail: "2 month(s) overdue".into(),
                }],
                empty_message: None,
                stale: None,
            },
        };
        let text = to_text(&frame, &en());
        assert!(text.starts_with("Maintenance report · March 2024"));
        assert!(text.contains("[Pending]"));
        assert!(text.contains(" Paid "));
        assert!(text.contains("B-7"));
        assert!(text.contains("2 month(s) overdue"));
        assert!(text.contains('╭'));
    }

    #[test]
    fn renders_loading_and_refreshing() {
        let frame = Frame {
            period_label: String::new(),
            refreshing: true,
            body: Body::Loading,
        };
        let text = to_text(&frame, &en());
        assert!(text.contains("Refreshing..."));
        assert!(text.contains("Loading report..."));
    }

    #[test]
    fn renders_empty_message_instead_of_table() {
        let frame = Frame {
            period_label: String::new(),
            refreshing: false,
            body: Body::Report {
                counters: Totals::default(),
                active_tab: Tab::Paid,
                rows: Vec::new(),
                empty_message: Some("No payments recorded this period".into()),
                stale: Some("Refresh failed".into()),
            },
        };
        let text = to_text(&frame, &en());
        assert!(text.contains("No payments recorded this period"));
        assert!(text.contains("! Refresh failed"));
        assert!(!text.contains("HOUSE"));
    }
}

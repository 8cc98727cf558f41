use crate::error::FetchError;
use crate::format::Formatter;
use crate::presenter::{present, Frame};
use crate::report::{MaintenanceReport, ReportSource};
use crate::view::{Tab, ViewState};

/// Controller for one maintenance report screen.
///
/// Owns the cached report, the last fetch failure and the [`ViewState`].
/// Every settled fetch replaces the report wholesale; a failed one leaves the
/// previous report in place and is kept for the presenter to show.
pub struct ReportScreen<S> {
    source: S,
    report: Option<MaintenanceReport>,
    last_error: Option<FetchError>,
    loading: bool,
    view: ViewState,
    fetches: usize,
    on_back: Option<Box<dyn FnMut()>>,
}

impl<S: ReportSource> ReportScreen<S> {
    pub fn new(source: S, tab: Tab) -> Self {
        Self {
            source,
            report: None,
            last_error: None,
            loading: false,
            view: ViewState::with_tab(tab),
            fetches: 0,
            on_back: None,
        }
    }

    /// Callback run when the user asks to leave the screen
    pub fn with_on_back(mut self, on_back: impl FnMut() + 'static) -> Self {
        self.on_back = Some(Box::new(on_back));
        self
    }

    /// Initial load when the screen becomes active
    pub fn mount(&mut self) -> bool {
        self.load()
    }

    /// Background re-fetch from the poller; leaves the refresh flag alone
    pub fn poll(&mut self) -> bool {
        self.load()
    }

    /// Local tab switch, never fetches
    pub fn select_tab(&mut self, tab: Tab) {
        self.view.active_tab = tab;
    }

    /// Manual refresh
    pub fn refresh(&mut self) -> bool {
        self.refresh_with(|_| {})
    }

    /// Manual refresh, calling `in_flight` while the request is outstanding
    pub fn refresh_with(&mut self, in_flight: impl FnOnce(&Self)) -> bool {
        self.view.refresh_in_flight = true;
        self.loading = true;
        in_flight(self);
        let ok = self.load();
        self.view.refresh_in_flight = false;
        ok
    }

    pub fn back(&mut self) {
        if let Some(on_back) = self.on_back.as_mut() {
            on_back();
        }
    }

    pub fn frame(&self, fmt: &dyn Formatter) -> Frame {
        present(
            self.report.as_ref(),
            self.loading,
            self.last_error.as_ref(),
            &self.view,
            fmt,
        )
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn report(&self) -> Option<&MaintenanceReport> {
        self.report.as_ref()
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Number of fetches issued so far
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    fn load(&mut self) -> bool {
        self.loading = true;
        self.fetches += 1;
        let result = self.source.fetch();
        self.loading = false;

        match result {
            Ok(report) => {
                log::info!(
                    "report loaded: {} paid, {} unpaid",
                    report.paid_records.len(),
                    report.unpaid_records.len()
                );
                self.report = Some(report);
                self.last_error = None;
                true
            }
            Err(e) => {
                log::warn!("report fetch failed: {e}");
                self.last_error = Some(e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::LocaleFormatter;
    use crate::presenter::Body;
    use crate::report::{HouseRecord, Period, Totals};
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Replays canned results, one per fetch
    struct Scripted(VecDeque<Result<MaintenanceReport, FetchError>>);

    impl ReportSource for Scripted {
        fn fetch(&mut self) -> Result<MaintenanceReport, FetchError> {
            self.0
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Transport("script exhausted".into())))
        }
    }

    fn report(unpaid: usize) -> MaintenanceReport {
        let houses = (0..unpaid)
            .map(|i| HouseRecord {
                house_id: format!("H-{i}"),
                address: format!("Calle {i}"),
                months_overdue: 1,
                last_payment_date: None,
                last_payment_amount: None,
            })
            .collect();
        MaintenanceReport {
            period: Some(Period { month: 6, year: 2024 }),
            paid_records: Vec::new(),
            unpaid_records: houses,
            totals: Totals {
                total: unpaid as u64,
                paid: 0,
                unpaid: unpaid as u64,
            },
        }
    }

    fn screen(results: Vec<Result<MaintenanceReport, FetchError>>) -> ReportScreen<Scripted> {
        ReportScreen::new(Scripted(results.into()), Tab::default())
    }

    #[test]
    fn tab_switch_does_not_fetch() {
        let mut screen = screen(vec![Ok(report(2))]);
        screen.mount();
        let before = screen.fetch_count();
        screen.select_tab(Tab::Paid);
        screen.select_tab(Tab::Unpaid);
        assert_eq!(screen.fetch_count(), before);
        assert_eq!(screen.view().active_tab, Tab::Unpaid);
    }

    #[test]
    fn refresh_flag_is_set_while_in_flight() {
        let mut screen = screen(vec![Ok(report(1)), Ok(report(2))]);
        screen.mount();
        let seen = Cell::new(false);
        assert!(screen.refresh_with(|s| seen.set(s.view().refresh_in_flight)));
        assert!(seen.get());
        assert!(!screen.view().refresh_in_flight);
        assert_eq!(screen.report().unwrap().unpaid_records.len(), 2);
    }

    #[test]
    fn failed_refresh_clears_flag_and_keeps_data() {
        let mut screen = screen(vec![Ok(report(3)), Err(FetchError::Status(502))]);
        screen.mount();
        assert!(!screen.refresh());
        assert!(!screen.view().refresh_in_flight);
        assert_eq!(screen.report().unwrap().unpaid_records.len(), 3);
        assert!(matches!(screen.last_error(), Some(FetchError::Status(502))));

        let frame = screen.frame(&LocaleFormatter::default());
        assert_eq!(frame.record_count(), 3);
    }

    #[test]
    fn latest_settled_fetch_wins() {
        let mut screen = screen(vec![Ok(report(1)), Ok(report(4))]);
        screen.mount();
        screen.poll();
        assert_eq!(screen.report().unwrap().unpaid_records.len(), 4);
        assert!(screen.last_error().is_none());
    }

    #[test]
    fn first_load_failure_then_retry() {
        let mut screen = screen(vec![Err(FetchError::Decode("eof".into())), Ok(report(1))]);
        screen.mount();
        let fmt = LocaleFormatter::default();
        assert!(matches!(screen.frame(&fmt).body, Body::Failed { .. }));
        screen.refresh();
        assert_eq!(screen.frame(&fmt).record_count(), 1);
    }

    #[test]
    fn back_runs_callback() {
        let called = Rc::new(Cell::new(0));
        let hook = Rc::clone(&called);
        let mut screen = screen(vec![]).with_on_back(move || hook.set(hook.get() + 1));
        screen.back();
        assert_eq!(called.get(), 1);
    }
}

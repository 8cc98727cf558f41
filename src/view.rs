use clap::ValueEnum;

/// Which record subset the screen lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Tab {
    Paid,
    #[default]
    Unpaid,
}

/// Local state of one report screen; not shared, not persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub active_tab: Tab,
    pub refresh_in_flight: bool,
}

impl ViewState {
    pub fn with_tab(tab: Tab) -> Self {
        Self {
            active_tab: tab,
            ..Self::default()
        }
    }
}

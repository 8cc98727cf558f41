//! Locale-bound presentation: money, dates and the screen's fixed texts.
//!
//! The presenter only talks to [`Formatter`], so adding a locale means adding
//! a [`Locale`] variant and its [`Labels`].

use chrono::{NaiveDate, NaiveTime};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    EsMx,
    EnUs,
}

impl Locale {
    fn chrono(self) -> chrono::Locale {
        match self {
            Locale::EsMx => chrono::Locale::es_MX,
            Locale::EnUs => chrono::Locale::en_US,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::EsMx => write!(f, "es-MX"),
            Locale::EnUs => write!(f, "en-US"),
        }
    }
}

impl FromStr for Locale {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "es" | "es-mx" => Ok(Locale::EsMx),
            "en" | "en-us" => Ok(Locale::EnUs),
            _ => Err(AppError::InvalidLocale(s.to_string())),
        }
    }
}

/// Fixed user-facing texts of the report screen
#[derive(Debug)]
pub struct Labels {
    pub title: &'static str,
    pub loading: &'static str,
    pub refreshing: &'static str,
    pub tab_paid: &'static str,
    pub tab_unpaid: &'static str,
    pub total: &'static str,
    pub paid: &'static str,
    pub unpaid: &'static str,
    pub house: &'static str,
    pub address: &'static str,
    pub detail: &'static str,
    pub payment_recorded: &'static str,
    pub no_date: &'static str,
    pub pending_current_period: &'static str,
    pub empty_paid: &'static str,
    pub empty_unpaid: &'static str,
    pub load_failed: &'static str,
    pub stale_data: &'static str,
    pub retry_hint: &'static str,
    pub keys_hint: &'static str,
    overdue_suffix: &'static str,
}

impl Labels {
    pub fn months_overdue(&self, months: u32) -> String {
        format!("{months} {}", self.overdue_suffix)
    }
}

static ES_MX: Labels = Labels {
    title: "Reporte de mantenimiento",
    loading: "Cargando reporte...",
    refreshing: "Actualizando...",
    tab_paid: "Pagadas",
    tab_unpaid: "Pendientes",
    total: "Total",
    paid: "Pagadas",
    unpaid: "Pendientes",
    house: "CASA",
    address: "DIRECCIÓN",
    detail: "DETALLE",
    payment_recorded: "Pago registrado",
    no_date: "Sin fecha",
    pending_current_period: "Pendiente del periodo actual",
    empty_paid: "No hay pagos registrados en este periodo",
    empty_unpaid: "No hay casas pendientes en este periodo",
    load_failed: "No se pudo cargar el reporte",
    stale_data: "No se pudo actualizar; mostrando los últimos datos",
    retry_hint: "Presiona r para reintentar",
    keys_hint: "[p] pagadas  [u] pendientes  [r] actualizar  [q] volver",
    overdue_suffix: "mes(es) de adeudo",
};

static EN_US: Labels = Labels {
    title: "Maintenance report",
    loading: "Loading report...",
    refreshing: "Refreshing...",
    tab_paid: "Paid",
    tab_unpaid: "Pending",
    total: "Total",
    paid: "Paid",
    unpaid: "Pending",
    house: "HOUSE",
    address: "ADDRESS",
    detail: "DETAIL",
    payment_recorded: "Payment recorded",
    no_date: "No date",
    pending_current_period: "Pending for current period",
    empty_paid: "No payments recorded this period",
    empty_unpaid: "No pending houses this period",
    load_failed: "Could not load the report",
    stale_data: "Refresh failed; showing the last data received",
    retry_hint: "Press r to retry",
    keys_hint: "[p] paid  [u] pending  [r] refresh  [q] back",
    overdue_suffix: "month(s) overdue",
};

/// Formatting capability used by the presenter
pub trait Formatter {
    fn currency(&self, amount: f64) -> String;
    fn short_date(&self, date: NaiveDate) -> String;
    fn month_year(&self, date: NaiveDate) -> String;
    fn labels(&self) -> &Labels;
}

#[derive(Debug, Clone)]
pub struct LocaleFormatter {
    locale: Locale,
    currency_symbol: String,
}

impl LocaleFormatter {
    pub fn new(locale: Locale, currency_symbol: impl Into<String>) -> Self {
        Self {
            locale,
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

impl Default for LocaleFormatter {
    fn default() -> Self {
        Self::new(Locale::EsMx, "$")
    }
}

impl Formatter for LocaleFormatter {
    fn currency(&self, amount: f64) -> String {
        format_money(amount, &self.currency_symbol)
    }

    fn short_date(&self, date: NaiveDate) -> String {
        let pattern = match self.locale {
            Locale::EsMx => "%-d/%-m/%Y",
            Locale::EnUs => "%-m/%-d/%Y",
        };
        date.format(pattern).to_string()
    }

    fn month_year(&self, date: NaiveDate) -> String {
        let pattern = match self.locale {
            Locale::EsMx => "%B de %Y",
            Locale::EnUs => "%B %Y",
        };
        date.and_time(NaiveTime::default())
            .and_utc()
            .format_localized(pattern, self.locale.chrono())
            .to_string()
    }

    fn labels(&self) -> &Labels {
        match self.locale {
            Locale::EsMx => &ES_MX,
            Locale::EnUs => &EN_US,
        }
    }
}

/// Format a money amount with two decimal places and thousands separators
pub fn format_money(value: f64, currency_symbol: &str) -> String {
    if !value.is_finite() {
        return format!("{currency_symbol}{value}");
    }

    let rounded = format!("{:.2}", value.abs());
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let grouped = format_grouped_digits(whole);

    if value < 0.0 && rounded != "0.00" {
        format!("-{currency_symbol}{grouped}.{frac}")
    } else {
        format!("{currency_symbol}{grouped}.{frac}")
    }
}

fn format_grouped_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_has_two_decimals_and_grouping() {
        assert_eq!(format_money(123.5, "$"), "$123.50");
        assert_eq!(format_money(0.0, "$"), "$0.00");
        assert_eq!(format_money(1234567.891, "$"), "$1,234,567.89");
        assert_eq!(format_money(-42.0, "$"), "-$42.00");
    }

    #[test]
    fn money_never_collapses_to_zero() {
        assert_eq!(format_money(1e20, "$"), "$100,000,000,000,000,000,000.00");
        assert_eq!(format_money(f64::NAN, "$"), "$NaN");
        assert_eq!(format_money(f64::INFINITY, "$"), "$inf");
    }

    #[test]
    fn month_year_is_localized() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let en = LocaleFormatter::new(Locale::EnUs, "$");
        let es = LocaleFormatter::new(Locale::EsMx, "$");
        assert_eq!(en.month_year(date), "March 2024");
        assert_eq!(es.month_year(date), "marzo de 2024");
    }

    #[test]
    fn short_dates_follow_locale_order() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(LocaleFormatter::new(Locale::EsMx, "$").short_date(date), "5/3/2024");
        assert_eq!(LocaleFormatter::new(Locale::EnUs, "$").short_date(date), "3/5/2024");
    }

    #[test]
    fn parses_locale_names() {
        assert_eq!("es-MX".parse::<Locale>().unwrap(), Locale::EsMx);
        assert_eq!("en_us".parse::<Locale>().unwrap(), Locale::EnUs);
        assert!("fr-FR".parse::<Locale>().is_err());
    }

    #[test]
    fn overdue_label() {
        assert_eq!(ES_MX.months_overdue(3), "3 mes(es) de adeudo");
        assert_eq!(EN_US.months_overdue(1), "1 month(s) overdue");
    }
}

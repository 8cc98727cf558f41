use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize};

/// The (month, year) pair a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    /// First day of the period, `None` when the month is out of range
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

/// Household counters as sent by the server; `total == paid + unpaid` is not checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Totals {
    pub total: u64,
    pub paid: u64,
    pub unpaid: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HouseRecord {
    pub house_id: String,
    pub address: String,
    /// Consecutive unpaid billing cycles
    #[serde(rename = "adeudos_months", default)]
    pub months_overdue: u32,
    #[serde(default, deserialize_with = "payment_date")]
    pub last_payment_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "payment_amount")]
    pub last_payment_amount: Option<f64>,
}

/// One month of maintenance payments, replaced wholesale on every fetch
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MaintenanceReport {
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(rename = "paid")]
    pub paid_records: Vec<HouseRecord>,
    #[serde(rename = "unpaid")]
    pub unpaid_records: Vec<HouseRecord>,
    pub totals: Totals,
}

fn parse_payment_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

fn payment_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_payment_date(s)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid payment date '{s}'"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

// Decimal columns often arrive as strings
fn payment_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = match Option::<RawAmount>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(RawAmount::Number(n)) => n,
        Some(RawAmount::Text(s)) if s.trim().is_empty() => return Ok(None),
        Some(RawAmount::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid payment amount '{s}'")))?,
    };

    // amounts are finite and non-negative
    if !amount.is_finite() || amount < 0.0 {
        return Err(de::Error::custom(format!(
            "invalid payment amount '{amount}'"
        )));
    }
    Ok(Some(amount))
}

//! Expiry policy: plan label → last valid instant.
//!
//! Labels are free text typed by an operator ("1 Month", "6 Month",
//! "1 Year", "TRIAL 7", ...). They are parsed once into a [`PlanLabel`]
//! and the duration is applied on the calendar of the caller's time zone.
//! The result always lands on 23:59:59.999 of the target day.
//!
//! The policy is total. Labels without a recognised unit fall back to one
//! month instead of failing issuance.

use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime, TimeZone};

/// Quantity assumed when a label has no usable number.
pub const DEFAULT_QUANTITY: u32 = 1;

/// Last representable millisecond of a day.
pub const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_milli_opt(23, 59, 59, 999) {
    Some(time) => time,
    None => panic!("23:59:59.999 is a valid time"),
};

/// Latest calendar date an expiry can land on. Its end of day stays inside a
/// four-digit RFC 3339 year under any UTC offset, so the record survives a
/// JSON round trip.
pub const LATEST_EXPIRY_DATE: NaiveDate = match NaiveDate::from_ymd_opt(9999, 12, 30) {
    Some(date) => date,
    None => panic!("9999-12-30 is a valid date"),
};

/// Duration unit named by a plan label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanUnit {
    /// Calendar months.
    Month,
    /// Calendar years.
    Year,
    /// Days (also selected by the `trial` keyword).
    Day,
    /// No recognised keyword.
    Unknown,
}

impl PlanUnit {
    /// Detects the unit keyword in a label.
    ///
    /// Precedence is month, then year, then day/trial, so a label naming
    /// several units resolves to the first in that order.
    #[must_use]
    pub fn detect(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("month") {
            Self::Month
        } else if label.contains("year") {
            Self::Year
        } else if label.contains("day") || label.contains("trial") {
            Self::Day
        } else {
            Self::Unknown
        }
    }
}

/// A parsed plan label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanLabel {
    /// How many units the plan lasts.
    pub quantity: u32,
    /// The unit of `quantity`.
    pub unit: PlanUnit,
}

impl PlanLabel {
    /// Parses a free-text plan label.
    ///
    /// The quantity is the first run of digits anywhere in the label.
    /// Parsing is deliberately lenient: a missing number, a zero or a
    /// number too large for `u32` all become [`DEFAULT_QUANTITY`].
    #[must_use]
    pub fn parse(label: &str) -> Self {
        Self {
            quantity: parse_quantity(label),
            unit: PlanUnit::detect(label),
        }
    }

    /// Returns the expiry instant for a plan starting at `now`.
    ///
    /// `Unknown` labels ignore their quantity and last one month. Month
    /// arithmetic clamps to the end of shorter months (Jan 31 + 1 month is
    /// the last day of February). Arithmetic past the calendar range
    /// saturates at [`LATEST_EXPIRY_DATE`].
    #[must_use]
    pub fn expires_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let start = now.date_naive();
        let target = self
            .advance(start)
            .map_or(LATEST_EXPIRY_DATE, |date| date.min(LATEST_EXPIRY_DATE));
        end_of_day(&now.timezone(), target)
    }

    fn advance(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self.unit {
            PlanUnit::Month => start.checked_add_months(Months::new(self.quantity)),
            PlanUnit::Year => self
                .quantity
                .checked_mul(12)
                .and_then(|months| start.checked_add_months(Months::new(months))),
            PlanUnit::Day => start.checked_add_days(Days::new(u64::from(self.quantity))),
            PlanUnit::Unknown => start.checked_add_months(Months::new(1)),
        }
    }
}

impl From<&str> for PlanLabel {
    fn from(label: &str) -> Self {
        Self::parse(label)
    }
}

/// Computes the expiry instant for `label` issued at `now`.
#[must_use]
pub fn compute_expiry<Tz: TimeZone>(label: &str, now: &DateTime<Tz>) -> DateTime<Tz> {
    PlanLabel::parse(label).expires_after(now)
}

fn parse_quantity(label: &str) -> u32 {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();

    match digits.parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => DEFAULT_QUANTITY,
    }
}

/// 23:59:59.999 on `date` in `tz`. A wall time that does not exist in the
/// zone (DST gap) is read as UTC.
fn end_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let local = date.and_time(END_OF_DAY);
    tz.from_local_datetime(&local)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&local))
}

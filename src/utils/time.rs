use chrono::NaiveDate;

/// This is the standard way of converting a date to a ledger key in scrolltime.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

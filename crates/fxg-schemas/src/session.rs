//! Session classification.
//!
//! London and New York observe DST on different dates, so the buckets are
//! computed on the local clocks rather than fixed UTC offsets.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::America::New_York;
use chrono_tz::Europe::London;

use crate::Session;

/// Map a UTC timestamp to its trading session.
///
/// | Bucket      | Local window                         |
/// |-------------|--------------------------------------|
/// | ny-overlap  | 08:00–11:59 New York (London open)   |
/// | london-open | 07:00–11:59 London                   |
/// | late-ny     | 12:00–16:59 New York                 |
/// | asian       | everything else, and weekends        |
pub fn classify_session(ts: DateTime<Utc>) -> Session {
    let ny = ts.with_timezone(&New_York);
    let ldn = ts.with_timezone(&London);

    if matches!(ny.weekday(), Weekday::Sat | Weekday::Sun) {
        return Session::Asian;
    }

    let ny_h = ny.hour();
    let ldn_h = ldn.hour();

    if (8..12).contains(&ny_h) {
        Session::NyOverlap
    } else if (7..12).contains(&ldn_h) {
        Session::LondonOpen
    } else if (12..17).contains(&ny_h) {
        Session::LateNy
    } else {
        Session::Asian
    }
}

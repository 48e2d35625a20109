use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Clock abstracts access to the current timestamp so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn current_year(&self) -> i32 {
        self.today().year()
    }
}

/// Wall clock used outside of tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Midnight UTC of the given calendar date. Falls back to the Unix epoch for invalid dates.
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        let instant = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .unwrap_or_default();
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

use chrono::{Local, NaiveDateTime, SubsecRound};

/// Source of "now" for attendance timestamps (server local time).
///
/// Attendance columns are `DATETIME`, so readings are whole seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local().trunc_subsecs(0)
    }
}

#[cfg(test)]
pub use fixed::FixedClock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    ops::{Add, Sub},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// The current POSIX time in seconds
pub fn now() -> u64 {
    Time::now().unix().max(0) as u64
}

/// A point in time that travels through JSON as an integer number of seconds
/// since the Unix epoch, rather than as a calendar string.
///
/// The epoch itself is the zero value: a zero [Time] is treated as "not set"
/// wherever claims are assembled or checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(SystemTime);

impl Time {
    pub fn now() -> Self {
        Time(SystemTime::now())
    }

    pub fn zero() -> Self {
        Time(UNIX_EPOCH)
    }

    pub fn from_unix(seconds: i64) -> Self {
        let offset = Duration::from_secs(seconds.unsigned_abs());
        if seconds >= 0 {
            Time(UNIX_EPOCH + offset)
        } else {
            Time(UNIX_EPOCH - offset)
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0 == UNIX_EPOCH
    }

    /// Whole seconds since the Unix epoch; negative for earlier times
    pub fn unix(&self) -> i64 {
        match self.0.duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_secs() as i64,
            Err(error) => -(error.duration().as_secs() as i64),
        }
    }

    pub fn is_before(&self, other: &Time) -> bool {
        self.unix() < other.unix()
    }

    pub fn is_after(&self, other: &Time) -> bool {
        self.unix() > other.unix()
    }
}

impl Default for Time {
    fn default() -> Self {
        Time::zero()
    }
}

impl From<SystemTime> for Time {
    fn from(value: SystemTime) -> Self {
        Time(value)
    }
}

impl From<Time> for SystemTime {
    fn from(value: Time) -> Self {
        value.0
    }
}

impl Add<Duration> for Time {
    type Output = Time;

    fn add(self, rhs: Duration) -> Self::Output {
        Time(self.0 + rhs)
    }
}

impl Sub<Duration> for Time {
    type Output = Time;

    fn sub(self, rhs: Duration) -> Self::Output {
        Time(self.0 - rhs)
    }
}

impl Serialize for Time {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.unix())
    }
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Time::from_unix(i64::deserialize(deserializer)?))
    }
}

//! Time primitives used by the timer
//!
//! - `DualTime` - a pair of optional real / game time durations
//! - `TimingMethod` - selects one component of a `DualTime`
//! - `Clock` - source of monotonic and wall-clock time

mod clock;
mod dual_time;

pub use clock::{AtomicDateTime, Clock, ManualClock, SystemClock, TimeStamp};
pub use dual_time::{improves_on, DualTime, TimingMethod};

/// Serde helpers storing `TimeDelta` values as whole milliseconds
pub(crate) mod serde_millis {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        value.num_milliseconds().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        Ok(TimeDelta::milliseconds(i64::deserialize(deserializer)?))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<TimeDelta>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            value.map(|d| d.num_milliseconds()).serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<TimeDelta>, D::Error> {
            Ok(Option::<i64>::deserialize(deserializer)?.map(TimeDelta::milliseconds))
        }
    }
}

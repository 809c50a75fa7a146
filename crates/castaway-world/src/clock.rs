//! Day cycle derived from the tick counter.
//!
//! One tick is one hour. Hour, day index, and day/night are always computed
//! from the tick number and never stored independently, except for the
//! cached `is_day` flag on the world which [`crate::World::advance_clock`]
//! keeps in sync.

/// Ticks in one simulated day.
pub const TICKS_PER_DAY: u64 = 24;

/// First daytime hour (inclusive).
pub const DAY_START_HOUR: u64 = 6;

/// First nighttime hour after the day window (exclusive end of day).
pub const DAY_END_HOUR: u64 = 18;

/// Hour of the day, in `[0, 24)`.
pub const fn hour_of(tick: u64) -> u64 {
    tick.rem_euclid(TICKS_PER_DAY)
}

/// Zero-based day index.
pub const fn day_of(tick: u64) -> u64 {
    tick.div_euclid(TICKS_PER_DAY)
}

/// Whether `tick` falls in the daytime window `[6, 18)`.
pub const fn is_daytime(tick: u64) -> bool {
    let hour = hour_of(tick);
    hour >= DAY_START_HOUR && hour < DAY_END_HOUR
}

/// Whether `tick` is the first hour of a day (meal counters reset).
pub const fn is_day_start(tick: u64) -> bool {
    hour_of(tick) == 0
}

/// Whether `tick` is the last hour of a day (nutrition check).
pub const fn is_day_end(tick: u64) -> bool {
    hour_of(tick) == TICKS_PER_DAY.saturating_sub(1)
}

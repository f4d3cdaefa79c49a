//! Performance ratio scoring
//!
//! Views relative to the channel's audience, scaled by 100. Channels at or
//! below the subscriber floor always score 0.

/// Channels with this many subscribers or fewer are not scored
pub const MIN_SCORED_SUBSCRIBERS: u64 = 100;

/// Compute the performance ratio for a video, rounded to one decimal place
pub fn performance_ratio(views: u64, subscribers: u64) -> f64 {
    if subscribers <= MIN_SCORED_SUBSCRIBERS {
        return 0.0;
    }

    let ratio = views as f64 / subscribers as f64 * 100.0;
    (ratio * 10.0).round() / 10.0
}

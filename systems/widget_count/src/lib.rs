#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure widget-count randomization policy.

use widget_reroll_core::{SharedRandom, FALLBACK_WIDGET_COUNT};
use widget_reroll_settings::ConfigurationRecord;

/// Computes the widget count to write for the next bomb.
///
/// The shared random source is reseeded before the draw because the host's
/// own generation step resets it to a fixed seed just beforehand; without
/// the reseed every bomb would replay the same sequence. Both the reseed
/// and the draw happen unconditionally so the source's state evolves
/// identically across settings permutations; when randomization is
/// disabled the drawn value is discarded in favor of the fixed fallback.
///
/// Out-of-order bounds are symmetrized, never rejected.
#[must_use]
pub fn compute(config: &ConfigurationRecord, seed: u64, random: &mut dyn SharedRandom) -> i32 {
    random.reseed(seed);

    let lo = config.min_widget_count.min(config.max_widget_count);
    let hi = config.min_widget_count.max(config.max_widget_count);
    let drawn = random.range_inclusive(lo, hi);

    if config.allow_widget_count_change {
        drawn
    } else {
        FALLBACK_WIDGET_COUNT
    }
}

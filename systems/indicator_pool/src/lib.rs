#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that builds and selects the indicator label pool.
//!
//! The universe of candidate labels is enumerated exactly once per process:
//! its membership never changes, so every subsequent refresh reshuffles the
//! same backing vector in place and takes a fresh prefix rather than paying
//! for a rebuild.

use widget_reroll_core::{
    Label, SharedRandom, INDICATOR_ALPHABET, NON_CUSTOM_WIDGET_KINDS, RESERVED_LABEL,
};
use widget_reroll_settings::ConfigurationRecord;

/// Process-lifetime pool of candidate custom indicator labels.
#[derive(Clone, Debug)]
pub struct IndicatorPool {
    known: Vec<Label>,
    universe: Vec<Label>,
}

impl IndicatorPool {
    /// Builds the pool from the host's built-in indicator labels.
    ///
    /// The universe holds every three-letter code in lexicographic nested
    /// order, minus the reserved label and every element of `known`.
    #[must_use]
    pub fn new(known: &[Label]) -> Self {
        let mut universe = Vec::with_capacity(
            INDICATOR_ALPHABET.len() * INDICATOR_ALPHABET.len() * INDICATOR_ALPHABET.len(),
        );
        for first in INDICATOR_ALPHABET {
            for second in INDICATOR_ALPHABET {
                for third in INDICATOR_ALPHABET {
                    let label = Label::from_ascii([*first, *second, *third]);
                    if label != RESERVED_LABEL && !known.contains(&label) {
                        universe.push(label);
                    }
                }
            }
        }

        Self {
            known: known.to_vec(),
            universe,
        }
    }

    /// Read-only view of the candidate universe in its current order.
    #[must_use]
    pub fn universe(&self) -> &[Label] {
        &self.universe
    }

    /// Number of custom labels the configuration admits per refresh.
    ///
    /// The host's non-custom widget kinds are subtracted from the maximum
    /// widget count before the remainder is attributed to custom
    /// indicators, which deliberately ties pool size to the widget budget.
    #[must_use]
    pub fn select_count(&self, config: &ConfigurationRecord) -> usize {
        // Widened arithmetic: the bounds come from a user-edited file and
        // may sit anywhere in the i32 range.
        let requested = (i64::from(config.max_widget_count) - i64::from(NON_CUSTOM_WIDGET_KINDS))
            .max(i64::from(config.min_custom_indicators));
        usize::try_from(requested)
            .unwrap_or(0)
            .min(self.universe.len())
    }

    /// Reshuffles the universe in place with a Fisher-Yates pass.
    pub fn shuffle(&mut self, random: &mut dyn SharedRandom) {
        shuffle_in_place(&mut self.universe, random);
    }

    /// Produces the label set to write into the host for the next bomb.
    ///
    /// With custom indicators disabled the built-in labels are returned
    /// unchanged, reserved label included nowhere. Otherwise the result is
    /// the built-in labels, the reserved label, and a freshly shuffled
    /// prefix of the universe sized by [`select_count`].
    ///
    /// [`select_count`]: IndicatorPool::select_count
    #[must_use]
    pub fn active_set(
        &mut self,
        config: &ConfigurationRecord,
        random: &mut dyn SharedRandom,
    ) -> Vec<Label> {
        if !config.allow_custom_indicators {
            return self.known.clone();
        }

        self.shuffle(random);
        let count = self.select_count(config);

        let mut labels = Vec::with_capacity(self.known.len() + 1 + count);
        labels.extend_from_slice(&self.known);
        labels.push(RESERVED_LABEL);
        labels.extend_from_slice(&self.universe[..count]);

        tracing::debug!(
            custom = count,
            labels = %join_labels(&self.universe[..count]),
            "selected custom indicator labels"
        );

        labels
    }
}

/// Uniformly permutes the slice: for `n` from `len - 1` down to `1`, swap
/// element `n` with a uniformly chosen element in `[0, n]`.
pub fn shuffle_in_place(labels: &mut [Label], random: &mut dyn SharedRandom) {
    let mut n = labels.len();
    while n > 1 {
        n -= 1;
        let k = random.index_below(n + 1);
        labels.swap(k, n);
    }
}

fn join_labels(labels: &[Label]) -> String {
    let mut joined = String::with_capacity(labels.len() * 5);
    for label in labels {
        if !joined.is_empty() {
            joined.push_str(", ");
        }
        joined.push_str(label.as_str());
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::IndicatorPool;
    use widget_reroll_core::Label;

    #[test]
    fn universe_excludes_known_and_reserved() {
        let known = [Label::parse("SND").expect("label")];
        let pool = IndicatorPool::new(&known);
        assert_eq!(pool.universe().len(), 26 * 26 * 26 - 2);
    }
}

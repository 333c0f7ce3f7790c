#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the widget-reroll engine.
//!
//! This crate defines the surface that connects the host to the pure
//! systems. The host feeds [`Notification`] values into the refresh system,
//! which mutates host-owned state exclusively through the capability traits
//! declared here ([`WidgetPorts`], [`SerialPorts`], [`SharedRandom`]). The
//! engine never reaches into host internals directly; a port returning
//! "absent" is the normal not-ready-yet state, not a fault.

use std::fmt;

/// Alphabet used to enumerate candidate indicator labels.
pub const INDICATOR_ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Sentinel indicator label meaning "no label".
pub const RESERVED_LABEL: Label = Label::from_ascii(*b"NLL");

/// Full character superset written into a serial-number unit's allowed set.
pub const SERIAL_CHARACTER_SUPERSET: [char; 36] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Widget count written when randomization is disabled in the configuration.
pub const FALLBACK_WIDGET_COUNT: i32 = 5;

/// Number of non-custom widget kinds the host budgets for before custom
/// indicators are attributed any share of the maximum widget count.
pub const NON_CUSTOM_WIDGET_KINDS: i32 = 12;

/// Lifecycle stage broadcast by the host while preparing or playing a bomb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The player is browsing the bomb selection area.
    Setup,
    /// A new bomb is being generated and staged.
    Transitioning,
    /// The bomb is live and being defused.
    Gameplay,
    /// The bomb exploded or was defused; results are on display.
    PostGame,
    /// The host process is shutting down.
    Quitting,
    /// Progression content is being unlocked.
    Unlock,
    /// Any intermediate stage the host does not further specify.
    Intermediate,
}

/// Notifications the host delivers to the engine between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification {
    /// The host entered a new lifecycle phase.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
    },
    /// The room lighting toggled on or off.
    LightsChanged {
        /// Indicates whether the lights are now on.
        lights_on: bool,
    },
}

/// Three-letter indicator code over the uppercase ASCII alphabet.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label([u8; 3]);

impl Label {
    /// Creates a label from three ASCII bytes without validation.
    #[must_use]
    pub const fn from_ascii(code: [u8; 3]) -> Self {
        Self(code)
    }

    /// Parses a label from a string of exactly three uppercase ASCII letters.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != 3 {
            return None;
        }
        if !bytes.iter().all(u8::is_ascii_uppercase) {
            return None;
        }
        Some(Self([bytes[0], bytes[1], bytes[2]]))
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Constructors only admit ASCII bytes.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Display for Label {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Label({})", self.as_str())
    }
}

/// Opaque reference to the host's widget generator object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorHandle(u32);

impl GeneratorHandle {
    /// Creates a new generator handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Opaque reference to one per-bomb serial-number unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SerialHandle(u32);

impl SerialHandle {
    /// Creates a new serial handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Write/read accessors into host-owned widget generation state.
pub trait WidgetPorts {
    /// Locates the widget generator, or reports it absent (not ready yet).
    fn widget_generator(&self) -> Option<GeneratorHandle>;

    /// Overwrites the number of widgets the generator will produce.
    fn set_widget_count(&mut self, generator: GeneratorHandle, count: i32);

    /// Reads the host's built-in indicator labels. Read once at startup;
    /// the set is treated as immutable for the process lifetime.
    fn known_indicator_labels(&self) -> Vec<Label>;

    /// Replaces the label pool offered to newly spawned indicator widgets.
    fn set_indicator_labels(&mut self, labels: Vec<Label>);
}

/// Write/read accessors into host-owned serial-number state.
pub trait SerialPorts {
    /// Enumerates every serial-number unit currently known to the host.
    fn serial_handles(&self) -> Vec<SerialHandle>;

    /// Reads the generated serial string, or reports the unit absent.
    /// An empty string means the serial has not been realized yet.
    fn serial_string(&self, handle: SerialHandle) -> Option<String>;

    /// Overwrites the character set the unit draws its serial from.
    fn set_allowed_characters(&mut self, handle: SerialHandle, characters: &[char]);
}

/// Process-wide random source shared with the host's own generation step.
///
/// The host resets this source to a fixed seed immediately before bomb
/// generation, so consumers that need fresh entropy must [`reseed`] before
/// drawing. Reseed-then-draw ordering is a correctness invariant, not a
/// style preference.
///
/// [`reseed`]: SharedRandom::reseed
pub trait SharedRandom {
    /// Re-seeds the source, typically from a time-derived value.
    fn reseed(&mut self, seed: u64);

    /// Draws uniformly from the inclusive range `[lo, hi]`.
    fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32;

    /// Draws a uniform index in `[0, bound)`. `bound` must be non-zero.
    fn index_below(&mut self, bound: usize) -> usize;
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! In-memory stand-in for the puzzle host.
//!
//! [`Host`] models exactly the slice of host state the engine mutates
//! through its ports: the widget generator's count field, the indicator
//! label slot, and per-bomb serial-number units. [`HostRandom`] models the
//! host's process-wide random source, including the quirk the engine must
//! defend against: the host resets the source to a fixed seed right before
//! bomb generation.
//!
//! System tests drive this crate the way adapters would drive the real
//! host; it is also the reference for writing real port bindings.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use widget_reroll_core::{GeneratorHandle, Label, SerialHandle, SerialPorts, SharedRandom, WidgetPorts};

/// Seed the host's rule manager resets the shared source to before
/// generating a bomb.
pub const HOST_FIXED_SEED: u64 = 1;

const SERIAL_LENGTH: usize = 6;
const GENERATOR_HANDLE: GeneratorHandle = GeneratorHandle::new(1);

/// Indicator labels built into the host.
pub const BUILTIN_INDICATOR_LABELS: [Label; 11] = [
    Label::from_ascii(*b"SND"),
    Label::from_ascii(*b"CLR"),
    Label::from_ascii(*b"CAR"),
    Label::from_ascii(*b"IND"),
    Label::from_ascii(*b"FRQ"),
    Label::from_ascii(*b"SIG"),
    Label::from_ascii(*b"NSA"),
    Label::from_ascii(*b"MSA"),
    Label::from_ascii(*b"TRN"),
    Label::from_ascii(*b"BOB"),
    Label::from_ascii(*b"FRK"),
];

/// Process-wide random source shared between the host and the engine.
#[derive(Clone, Debug)]
pub struct HostRandom {
    rng: ChaCha8Rng,
}

impl HostRandom {
    /// Creates the source in the state the host boots with.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(HOST_FIXED_SEED),
        }
    }

    /// Reproduces the host's pre-generation reset to the fixed seed.
    pub fn reset_for_generation(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(HOST_FIXED_SEED);
    }
}

impl Default for HostRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedRandom for HostRandom {
    fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        self.rng.gen_range(lo..=hi)
    }

    fn index_below(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}

#[derive(Clone, Debug)]
struct SerialUnit {
    handle: SerialHandle,
    allowed: Vec<char>,
    serial: String,
}

/// Host-owned state reachable through the engine's mutation ports.
#[derive(Debug)]
pub struct Host {
    generator_count: Option<i32>,
    indicator_labels: Vec<Label>,
    indicator_writes: usize,
    serial_units: Vec<SerialUnit>,
    next_serial_id: u32,
}

impl Host {
    /// Creates a host with the built-in indicator labels and no generator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            generator_count: None,
            indicator_labels: BUILTIN_INDICATOR_LABELS.to_vec(),
            indicator_writes: 0,
            serial_units: Vec::new(),
            next_serial_id: 1,
        }
    }

    /// Brings the widget generator object into existence.
    pub fn spawn_generator(&mut self, initial_count: i32) {
        self.generator_count = Some(initial_count);
    }

    /// Count currently stored on the generator, if it exists.
    #[must_use]
    pub fn widget_count(&self) -> Option<i32> {
        self.generator_count
    }

    /// Labels currently offered to newly spawned indicator widgets.
    #[must_use]
    pub fn indicator_labels(&self) -> &[Label] {
        &self.indicator_labels
    }

    /// Number of times the indicator label slot was overwritten.
    #[must_use]
    pub fn indicator_write_count(&self) -> usize {
        self.indicator_writes
    }

    /// Creates a serial-number unit with the host's default alphabet and an
    /// unrealized (empty) serial string.
    pub fn spawn_serial_unit(&mut self) -> SerialHandle {
        let handle = SerialHandle::new(self.next_serial_id);
        self.next_serial_id += 1;
        self.serial_units.push(SerialUnit {
            handle,
            allowed: ('A'..='Z').collect(),
            serial: String::new(),
        });
        handle
    }

    /// Allowed characters currently configured on the unit.
    #[must_use]
    pub fn allowed_characters(&self, handle: SerialHandle) -> Option<&[char]> {
        self.unit(handle).map(|unit| unit.allowed.as_slice())
    }

    /// Generates the unit's serial string from its allowed character set,
    /// mimicking the host's own realization step. Idempotent per unit.
    pub fn realize_serial(&mut self, handle: SerialHandle, random: &mut HostRandom) {
        let Some(unit) = self
            .serial_units
            .iter_mut()
            .find(|unit| unit.handle == handle)
        else {
            return;
        };
        if !unit.serial.is_empty() || unit.allowed.is_empty() {
            return;
        }
        for _ in 0..SERIAL_LENGTH {
            let index = random.index_below(unit.allowed.len());
            unit.serial.push(unit.allowed[index]);
        }
    }

    fn unit(&self, handle: SerialHandle) -> Option<&SerialUnit> {
        self.serial_units.iter().find(|unit| unit.handle == handle)
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetPorts for Host {
    fn widget_generator(&self) -> Option<GeneratorHandle> {
        self.generator_count.map(|_| GENERATOR_HANDLE)
    }

    fn set_widget_count(&mut self, generator: GeneratorHandle, count: i32) {
        if generator == GENERATOR_HANDLE && self.generator_count.is_some() {
            self.generator_count = Some(count);
        }
    }

    fn known_indicator_labels(&self) -> Vec<Label> {
        BUILTIN_INDICATOR_LABELS.to_vec()
    }

    fn set_indicator_labels(&mut self, labels: Vec<Label>) {
        self.indicator_labels = labels;
        self.indicator_writes += 1;
    }
}

impl SerialPorts for Host {
    fn serial_handles(&self) -> Vec<SerialHandle> {
        self.serial_units.iter().map(|unit| unit.handle).collect()
    }

    fn serial_string(&self, handle: SerialHandle) -> Option<String> {
        self.unit(handle).map(|unit| unit.serial.clone())
    }

    fn set_allowed_characters(&mut self, handle: SerialHandle, characters: &[char]) {
        if let Some(unit) = self
            .serial_units
            .iter_mut()
            .find(|unit| unit.handle == handle)
        {
            unit.allowed = characters.to_vec();
        }
    }
}

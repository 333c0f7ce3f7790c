#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cancellable background task that widens serial-number character sets.
//!
//! The host creates serial-number units at an unspecified point during bomb
//! staging, so the task first waits for one to exist, then rewrites the
//! allowed-character set of every unit whose serial has not been realized
//! yet. Each [`tick`] performs one cooperative step and returns control to
//! the host scheduler; the task never loops internally.
//!
//! [`tick`]: ReplacementTask::tick

use std::collections::HashSet;

use widget_reroll_core::{Phase, SerialHandle, SerialPorts, SERIAL_CHARACTER_SUPERSET};

/// Observable lifecycle of a [`ReplacementTask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// Polling for at least one serial-number unit to appear.
    WaitingForTarget,
    /// Rewriting allowed-character sets until the lights come on.
    Replacing,
    /// The lights-on signal arrived; no further writes will happen.
    Done,
    /// The task was disabled or the bomb was abandoned before a unit appeared.
    Aborted,
}

impl TaskState {
    /// Reports whether the task will react to further ticks.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

/// Single-flight task replacing serial alphabets for one bomb staging.
///
/// Exclusivity across stagings belongs to the orchestrator: spawning a
/// replacement task for a new bomb drops the previous instance, which is
/// the explicit cancellation of its remaining effect.
#[derive(Clone, Debug)]
pub struct ReplacementTask {
    state: TaskState,
    visited: HashSet<SerialHandle>,
}

impl ReplacementTask {
    /// Spawns a task for a fresh bomb staging.
    ///
    /// A disabled task moves straight to [`TaskState::Aborted`] and never
    /// touches the ports.
    #[must_use]
    pub fn spawn(enabled: bool) -> Self {
        let state = if enabled {
            TaskState::WaitingForTarget
        } else {
            TaskState::Aborted
        };
        Self {
            state,
            visited: HashSet::new(),
        }
    }

    /// Current lifecycle state of the task.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Performs one cooperative step.
    ///
    /// While waiting, the task aborts if the lifecycle falls back to Setup
    /// or PostGame before any unit appeared. While replacing, the tick that
    /// observes the lights-on signal completes the task without processing;
    /// otherwise every unvisited unit is inspected once: a realized serial
    /// is never overwritten, an unrealized one gets the full character
    /// superset.
    pub fn tick(&mut self, ports: &mut impl SerialPorts, phase: Phase, lights_on: bool) {
        match self.state {
            TaskState::WaitingForTarget => {
                if matches!(phase, Phase::Setup | Phase::PostGame) {
                    tracing::debug!(?phase, "bomb abandoned before a serial unit appeared");
                    self.state = TaskState::Aborted;
                    return;
                }
                if ports.serial_handles().is_empty() {
                    return;
                }
                self.state = TaskState::Replacing;
                self.replace_pending(ports, lights_on);
            }
            TaskState::Replacing => self.replace_pending(ports, lights_on),
            TaskState::Done | TaskState::Aborted => {}
        }
    }

    fn replace_pending(&mut self, ports: &mut impl SerialPorts, lights_on: bool) {
        if lights_on {
            tracing::debug!(units = self.visited.len(), "lights on, serial replacement done");
            self.state = TaskState::Done;
            return;
        }

        // New units may appear on any tick in multi-bomb configurations.
        for handle in ports.serial_handles() {
            if self.visited.contains(&handle) {
                continue;
            }

            let realized = ports
                .serial_string(handle)
                .is_some_and(|serial| !serial.is_empty());
            if realized {
                let _ = self.visited.insert(handle);
                continue;
            }

            ports.set_allowed_characters(handle, &SERIAL_CHARACTER_SUPERSET);
            tracing::debug!(unit = handle.get(), "widened serial character set");
            let _ = self.visited.insert(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ReplacementTask, TaskState};
    use widget_reroll_core::{Phase, SerialHandle, SerialPorts};

    #[derive(Default)]
    struct FakeSerialPorts {
        units: Vec<(SerialHandle, String)>,
        writes: Vec<SerialHandle>,
    }

    impl FakeSerialPorts {
        fn add_unit(&mut self, id: u32, serial: &str) {
            self.units.push((SerialHandle::new(id), serial.to_owned()));
        }
    }

    impl SerialPorts for FakeSerialPorts {
        fn serial_handles(&self) -> Vec<SerialHandle> {
            self.units.iter().map(|(handle, _)| *handle).collect()
        }

        fn serial_string(&self, handle: SerialHandle) -> Option<String> {
            self.units
                .iter()
                .find(|(candidate, _)| *candidate == handle)
                .map(|(_, serial)| serial.clone())
        }

        fn set_allowed_characters(&mut self, handle: SerialHandle, _characters: &[char]) {
            self.writes.push(handle);
        }
    }

    #[test]
    fn disabled_task_aborts_immediately() {
        let task = ReplacementTask::spawn(false);
        assert_eq!(task.state(), TaskState::Aborted);
        assert!(task.state().is_terminal());
        assert!(!ReplacementTask::spawn(true).state().is_terminal());
    }

    #[test]
    fn waiting_aborts_when_phase_resets() {
        for phase in [Phase::Setup, Phase::PostGame] {
            let mut ports = FakeSerialPorts::default();
            let mut task = ReplacementTask::spawn(true);
            task.tick(&mut ports, phase, false);
            assert_eq!(task.state(), TaskState::Aborted);
        }
    }

    #[test]
    fn waiting_persists_while_no_unit_exists() {
        let mut ports = FakeSerialPorts::default();
        let mut task = ReplacementTask::spawn(true);

        for _ in 0..5 {
            task.tick(&mut ports, Phase::Transitioning, false);
            assert_eq!(task.state(), TaskState::WaitingForTarget);
        }
        assert!(ports.writes.is_empty());
    }

    #[test]
    fn unrealized_unit_is_widened_on_the_discovery_tick() {
        let mut ports = FakeSerialPorts::default();
        ports.add_unit(1, "");
        let mut task = ReplacementTask::spawn(true);

        task.tick(&mut ports, Phase::Transitioning, false);
        assert_eq!(task.state(), TaskState::Replacing);
        assert_eq!(ports.writes, vec![SerialHandle::new(1)]);
    }

    #[test]
    fn realized_serial_is_never_overwritten() {
        let mut ports = FakeSerialPorts::default();
        ports.add_unit(1, "AB3DE6");
        let mut task = ReplacementTask::spawn(true);

        for _ in 0..3 {
            task.tick(&mut ports, Phase::Gameplay, false);
        }
        assert!(ports.writes.is_empty(), "realized serials must be left alone");
    }

    #[test]
    fn visited_units_are_not_rewritten_across_ticks() {
        let mut ports = FakeSerialPorts::default();
        ports.add_unit(1, "");
        let mut task = ReplacementTask::spawn(true);

        task.tick(&mut ports, Phase::Gameplay, false);
        task.tick(&mut ports, Phase::Gameplay, false);
        task.tick(&mut ports, Phase::Gameplay, false);
        assert_eq!(ports.writes.len(), 1, "one write per unit");
    }

    #[test]
    fn late_units_are_picked_up_while_replacing() {
        let mut ports = FakeSerialPorts::default();
        ports.add_unit(1, "");
        let mut task = ReplacementTask::spawn(true);
        task.tick(&mut ports, Phase::Gameplay, false);

        ports.add_unit(2, "");
        task.tick(&mut ports, Phase::Gameplay, false);
        assert_eq!(
            ports.writes,
            vec![SerialHandle::new(1), SerialHandle::new(2)]
        );
    }

    #[test]
    fn lights_on_completes_without_processing() {
        let mut ports = FakeSerialPorts::default();
        ports.add_unit(1, "");
        let mut task = ReplacementTask::spawn(true);
        task.tick(&mut ports, Phase::Gameplay, false);

        ports.add_unit(2, "");
        task.tick(&mut ports, Phase::Gameplay, true);
        assert_eq!(task.state(), TaskState::Done);
        assert_eq!(ports.writes, vec![SerialHandle::new(1)], "no write after lights on");

        task.tick(&mut ports, Phase::Gameplay, false);
        assert_eq!(task.state(), TaskState::Done, "terminal state ignores ticks");
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Phase-driven orchestrator that decides when a bomb refresh happens.
//!
//! The host calls [`Refresh::handle`] once per tick with whatever
//! notifications arrived since the previous tick. Notification processing
//! always completes before the per-tick widget-count retry so a phase
//! change and its first write land in the expected order. Nothing in this
//! crate panics or propagates an error past `handle`: a broken refresh
//! attempt is logged and abandoned, never allowed to destabilize the
//! host's own loop.

use std::time::Duration;

use widget_reroll_core::{Label, Notification, Phase, SerialPorts, SharedRandom, WidgetPorts};
use widget_reroll_settings::{ConfigurationRecord, SettingsStore};
use widget_reroll_system_indicator_pool::IndicatorPool;
use widget_reroll_system_serial_number::{ReplacementTask, TaskState};

/// Orchestrates settings reloads, pool selection, widget-count writes, and
/// serial replacement across the host lifecycle.
#[derive(Debug)]
pub struct Refresh {
    phase: Phase,
    lights_on: bool,
    refresh_pending: bool,
    config: ConfigurationRecord,
    pool: IndicatorPool,
    task: ReplacementTask,
}

impl Refresh {
    /// Creates the orchestrator from the host's built-in indicator labels,
    /// read once at startup.
    #[must_use]
    pub fn new(known_labels: &[Label]) -> Self {
        Self {
            phase: Phase::Setup,
            lights_on: false,
            refresh_pending: false,
            config: ConfigurationRecord::default(),
            pool: IndicatorPool::new(known_labels),
            task: ReplacementTask::spawn(false),
        }
    }

    /// Marks a refresh due without a phase transition.
    ///
    /// Supports hosts that only emit a Gameplay notification; the write
    /// uses the most recently loaded configuration.
    pub fn request_refresh(&mut self) {
        self.refresh_pending = true;
    }

    /// Reports whether a widget-count write is still owed.
    #[must_use]
    pub const fn refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// Lifecycle state of the current serial replacement task.
    #[must_use]
    pub const fn serial_task_state(&self) -> TaskState {
        self.task.state()
    }

    /// Runs one host tick.
    ///
    /// Applies every notification in arrival order, then attempts the
    /// pending widget-count write, then drives the serial replacement task
    /// one cooperative step. `now` is the host clock; it seeds the shared
    /// random source before the count draw.
    pub fn handle<H>(
        &mut self,
        notifications: &[Notification],
        host: &mut H,
        settings: &SettingsStore,
        random: &mut dyn SharedRandom,
        now: Duration,
    ) where
        H: WidgetPorts + SerialPorts,
    {
        for notification in notifications {
            match *notification {
                Notification::PhaseChanged { phase } => {
                    self.apply_phase(phase, host, settings, random);
                }
                Notification::LightsChanged { lights_on } => {
                    self.lights_on = lights_on;
                }
            }
        }

        self.attempt_widget_write(host, random, now);
        if !self.task.state().is_terminal() {
            self.task.tick(host, self.phase, self.lights_on);
        }
    }

    fn apply_phase<H>(
        &mut self,
        phase: Phase,
        host: &mut H,
        settings: &SettingsStore,
        random: &mut dyn SharedRandom,
    ) where
        H: WidgetPorts + SerialPorts,
    {
        let previous = self.phase;
        self.phase = phase;
        tracing::debug!(?previous, ?phase, "phase changed");

        match phase {
            Phase::Setup | Phase::PostGame | Phase::Quitting | Phase::Unlock => {
                self.refresh_pending = false;
            }
            Phase::Transitioning => {
                // Re-entering from Transitioning or Gameplay means this bomb
                // was already refreshed.
                if matches!(previous, Phase::Transitioning | Phase::Gameplay) {
                    return;
                }
                self.begin_refresh(host, settings, random);
            }
            Phase::Gameplay | Phase::Intermediate => {}
        }
    }

    fn begin_refresh<H>(
        &mut self,
        host: &mut H,
        settings: &SettingsStore,
        random: &mut dyn SharedRandom,
    ) where
        H: WidgetPorts + SerialPorts,
    {
        self.refresh_pending = true;

        let config = match settings.load() {
            Ok(config) => config,
            Err(error) => {
                tracing::error!(%error, "abandoning refresh, settings unavailable");
                self.refresh_pending = false;
                return;
            }
        };

        self.config = config;
        self.refresh_pending = self.refresh_pending && self.config.allow_widget_count_change;

        let labels = self.pool.active_set(&self.config, random);
        host.set_indicator_labels(labels);

        // Replacing the owned task cancels any predecessor outright.
        self.task = ReplacementTask::spawn(self.config.allow_serial_number_change);

        tracing::info!(
            widget_count_pending = self.refresh_pending,
            serial_replacement = self.config.allow_serial_number_change,
            "staged refresh for the next bomb"
        );
    }

    fn attempt_widget_write<H>(&mut self, host: &mut H, random: &mut dyn SharedRandom, now: Duration)
    where
        H: WidgetPorts + SerialPorts,
    {
        if !self.refresh_pending {
            return;
        }

        // Absent generator is the normal not-ready state; retry next tick.
        let Some(generator) = host.widget_generator() else {
            return;
        };

        let count = widget_reroll_system_widget_count::compute(&self.config, now.as_secs(), random);
        host.set_widget_count(generator, count);
        self.refresh_pending = false;
        tracing::info!(count, "widget count written");
    }
}

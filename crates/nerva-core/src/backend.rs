// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Backend contract: the step-scheduler surface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::bus::MessageBus;
use crate::error::{CoreError, Result};
use crate::messaging::Step;
use crate::population::PopulationVariant;
use crate::projection::ProjectionVariant;
use crate::subscription::SubscribableMessage;
use crate::tags::TagMap;
use crate::uid::Uid;

/// Shared running flag of a backend. `stop` may be called from any thread;
/// the run loop observes the flag between ticks.
#[derive(Debug, Clone, Default)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_running(&self, running: bool) {
        self.0.store(running, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Request the owning backend to stop after the current tick.
    pub fn stop(&self) {
        self.set_running(false);
    }
}

/// A step scheduler: holds populations and projections, owns a message bus
/// and an internal endpoint, and advances the network one tick at a time.
///
/// The trait is consumed generically (it is not object safe); the closed
/// population and projection variants make unsupported kinds unconstructible
/// rather than a runtime error.
pub trait Backend {
    fn uid(&self) -> Uid;

    fn tags(&self) -> &TagMap;

    fn tags_mut(&mut self) -> &mut TagMap;

    /// Whether this backend runs the plasticity kernel.
    fn plasticity_supported(&self) -> bool;

    /// Names of the neuron kinds this backend can run, in registry order.
    fn supported_neurons(&self) -> Vec<&'static str>;

    /// Names of the synapse kinds this backend can run, in registry order.
    fn supported_synapses(&self) -> Vec<&'static str>;

    /// Add populations. A UID already loaded is rejected with
    /// [`CoreError::DuplicateUid`].
    fn load_populations(&mut self, populations: Vec<PopulationVariant>) -> Result<()>;

    /// Add projections. A UID already loaded is rejected with
    /// [`CoreError::DuplicateUid`].
    fn load_projections(&mut self, projections: Vec<ProjectionVariant>) -> Result<()>;

    /// Remove populations by UID. Present UIDs are removed; the first absent
    /// UID is reported as [`CoreError::PopulationNotFound`].
    fn remove_populations(&mut self, uids: &[Uid]) -> Result<()>;

    /// Remove projections by UID. Present UIDs are removed; the first absent
    /// UID is reported as [`CoreError::ProjectionNotFound`].
    fn remove_projections(&mut self, uids: &[Uid]) -> Result<()>;

    fn populations(&self) -> &[PopulationVariant];

    fn projections(&self) -> Vec<&ProjectionVariant>;

    /// The bus this backend routes messages on. External participants
    /// (channels, observers, handlers) create their endpoints here.
    fn message_bus(&self) -> &MessageBus;

    /// Subscribe the backend's internal endpoint. Returns the number of
    /// newly added sender UIDs.
    fn subscribe<M: SubscribableMessage>(&mut self, receiver: Uid, senders: &[Uid]) -> usize;

    /// Wire up subscriptions for the loaded projections. Called once before
    /// the first tick.
    fn init(&mut self) -> Result<()>;

    /// Advance the network by one tick.
    fn step(&mut self) -> Result<()>;

    fn current_step(&self) -> Step;

    fn run_flag(&self) -> &RunFlag;

    fn is_running(&self) -> bool {
        self.run_flag().is_running()
    }

    /// Request the run loop to stop after the current tick.
    fn stop(&self) {
        self.run_flag().stop();
    }

    fn start_learning(&mut self);

    fn stop_learning(&mut self);

    fn is_learning(&self) -> bool;

    /// Run until [`Backend::stop`] is called.
    fn start(&mut self) -> Result<()> {
        self.start_with(&mut |_| true, &mut |_| true)
    }

    /// Run while `predicate` holds, checking it before and after every tick.
    fn start_while(&mut self, predicate: &mut dyn FnMut(Step) -> bool) -> Result<()> {
        if self.is_running() {
            return Err(CoreError::AlreadyRunning);
        }
        self.run_flag().set_running(true);
        while self.is_running() && predicate(self.current_step()) {
            if let Err(error) = self.step() {
                self.run_flag().set_running(false);
                return Err(error);
            }
            if !predicate(self.current_step()) {
                break;
            }
        }
        self.run_flag().set_running(false);
        Ok(())
    }

    /// Run while `pre` holds before each tick and `post` holds after it.
    fn start_with(
        &mut self,
        pre: &mut dyn FnMut(Step) -> bool,
        post: &mut dyn FnMut(Step) -> bool,
    ) -> Result<()> {
        if self.is_running() {
            return Err(CoreError::AlreadyRunning);
        }
        self.run_flag().set_running(true);
        while self.is_running() && pre(self.current_step()) {
            if let Err(error) = self.step() {
                self.run_flag().set_running(false);
                return Err(error);
            }
            if !post(self.current_step()) {
                break;
            }
        }
        self.run_flag().set_running(false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flag_is_shared() {
        let flag = RunFlag::new();
        let clone = flag.clone();

        assert!(!flag.is_running());
        flag.set_running(true);
        assert!(clone.is_running());
        clone.stop();
        assert!(!flag.is_running());
    }
}

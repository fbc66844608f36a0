// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Multi-threaded CPU backend.
//!
//! Phases fan population and projection work out over a Rayon pool. Kernels
//! touch only their own population or projection state plus the shared
//! endpoint, whose mutex guards only `send` and `unload`; the STDP
//! projections are partitioned by postsynaptic population before the
//! population phase, so every work item owns disjoint `&mut` state and
//! plasticity needs no further coordination. A kernel error aborts the
//! phase and poisons the tick; a kernel panic propagates out of the
//! parallel iterator to the `step` caller.

use rayon::prelude::*;
use tracing::debug;

use nerva_core::backend::{Backend, RunFlag};
use nerva_core::bus::MessageBus;
use nerva_core::error::Result;
use nerva_core::messaging::Step;
use nerva_core::neuron::NeuronKind;
use nerva_core::population::PopulationVariant;
use nerva_core::projection::{Projection, ProjectionVariant};
use nerva_core::subscription::SubscribableMessage;
use nerva_core::synapse::{ResourceStdpDeltaSynapse, SynapseKind};
use nerva_core::tags::TagMap;
use nerva_core::uid::Uid;

use super::{
    process_population_variant, process_projection_wrapper, stdp_projections_by_target,
    BackendCore,
};

/// Step scheduler that dispatches per-population and per-projection work to
/// a worker pool.
pub struct MultiThreadedBackend {
    core: BackendCore,
    pool: rayon::ThreadPool,
}

impl MultiThreadedBackend {
    /// Backend with one worker per available hardware thread.
    pub fn new() -> Self {
        debug!("creating multi-threaded backend");
        Self::from_builder(rayon::ThreadPoolBuilder::new())
    }

    pub fn with_thread_count(thread_count: usize) -> Self {
        Self::from_builder(rayon::ThreadPoolBuilder::new().num_threads(thread_count))
    }

    fn from_builder(builder: rayon::ThreadPoolBuilder) -> Self {
        Self {
            core: BackendCore::new(),
            pool: builder.build().expect("failed to build worker pool"),
        }
    }

    fn tick(&mut self) -> Result<()> {
        let step = self.core.step;
        debug!(step, "starting tick");

        self.core.bus.route_messages();
        self.core.endpoint.lock().receive_all_messages(None);

        {
            let endpoint = &self.core.endpoint;
            let learning = self.core.learning;
            let mut stdp_by_target = stdp_projections_by_target(&mut self.core.projections);
            let mut units: Vec<(
                &mut PopulationVariant,
                Vec<&mut Projection<ResourceStdpDeltaSynapse>>,
            )> = self
                .core
                .populations
                .iter_mut()
                .map(|population| {
                    let working = stdp_by_target.remove(&population.uid()).unwrap_or_default();
                    (population, working)
                })
                .collect();
            self.pool.install(|| {
                units.par_iter_mut().try_for_each(|(population, working)| {
                    process_population_variant(population, working, endpoint, step, learning)
                })
            })?;
        }

        self.core.bus.route_messages();
        self.core.endpoint.lock().receive_all_messages(None);

        {
            let endpoint = &self.core.endpoint;
            let projections = &mut self.core.projections;
            self.pool.install(|| {
                projections
                    .par_iter_mut()
                    .try_for_each(|wrapper| process_projection_wrapper(wrapper, endpoint, step))
            })?;
        }

        self.core.bus.route_messages();
        self.core.endpoint.lock().receive_all_messages(None);

        self.core.step += 1;
        Ok(())
    }
}

impl Default for MultiThreadedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MultiThreadedBackend {
    fn uid(&self) -> Uid {
        self.core.uid
    }

    fn tags(&self) -> &TagMap {
        &self.core.tags
    }

    fn tags_mut(&mut self) -> &mut TagMap {
        &mut self.core.tags
    }

    fn plasticity_supported(&self) -> bool {
        true
    }

    fn supported_neurons(&self) -> Vec<&'static str> {
        NeuronKind::ALL.iter().map(NeuronKind::name).collect()
    }

    fn supported_synapses(&self) -> Vec<&'static str> {
        SynapseKind::ALL.iter().map(SynapseKind::name).collect()
    }

    fn load_populations(&mut self, populations: Vec<PopulationVariant>) -> Result<()> {
        self.core.load_populations(populations)
    }

    fn load_projections(&mut self, projections: Vec<ProjectionVariant>) -> Result<()> {
        self.core.load_projections(projections)
    }

    fn remove_populations(&mut self, uids: &[Uid]) -> Result<()> {
        self.core.remove_populations(uids)
    }

    fn remove_projections(&mut self, uids: &[Uid]) -> Result<()> {
        self.core.remove_projections(uids)
    }

    fn populations(&self) -> &[PopulationVariant] {
        &self.core.populations
    }

    fn projections(&self) -> Vec<&ProjectionVariant> {
        self.core.projection_refs()
    }

    fn message_bus(&self) -> &MessageBus {
        &self.core.bus
    }

    fn subscribe<M: SubscribableMessage>(&mut self, receiver: Uid, senders: &[Uid]) -> usize {
        self.core.subscribe::<M>(receiver, senders)
    }

    fn init(&mut self) -> Result<()> {
        self.core.init()
    }

    fn step(&mut self) -> Result<()> {
        match self.tick() {
            Ok(()) => Ok(()),
            Err(error) => {
                // A poisoned tick stops the outer run loop.
                self.core.run_flag.set_running(false);
                Err(error)
            }
        }
    }

    fn current_step(&self) -> Step {
        self.core.step
    }

    fn run_flag(&self) -> &RunFlag {
        &self.core.run_flag
    }

    fn start_learning(&mut self) {
        self.core.learning = true;
    }

    fn stop_learning(&mut self) {
        self.core.learning = false;
    }

    fn is_learning(&self) -> bool {
        self.core.learning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nerva_core::neuron::BlifatNeuron;
    use nerva_core::population::Population;

    #[test]
    fn test_many_populations_step_in_parallel() {
        let mut backend = MultiThreadedBackend::with_thread_count(4);
        let populations: Vec<PopulationVariant> = (0..16)
            .map(|_| {
                Population::<BlifatNeuron>::new(|_| Some(BlifatNeuron::default()), 8).into()
            })
            .collect();
        backend.load_populations(populations).unwrap();
        backend.init().unwrap();

        for _ in 0..10 {
            backend.step().unwrap();
        }
        assert_eq!(backend.current_step(), 10);
    }

    #[test]
    fn test_learning_toggle() {
        let mut backend = MultiThreadedBackend::with_thread_count(2);
        assert!(backend.is_learning());
        backend.stop_learning();
        assert!(!backend.is_learning());
        backend.start_learning();
        assert!(backend.is_learning());
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Single-threaded CPU backend.

use tracing::debug;

use nerva_core::backend::{Backend, RunFlag};
use nerva_core::bus::MessageBus;
use nerva_core::error::Result;
use nerva_core::messaging::Step;
use nerva_core::neuron::NeuronKind;
use nerva_core::population::PopulationVariant;
use nerva_core::projection::ProjectionVariant;
use nerva_core::subscription::SubscribableMessage;
use nerva_core::synapse::SynapseKind;
use nerva_core::tags::TagMap;
use nerva_core::uid::Uid;

use super::{
    process_population_variant, process_projection_wrapper, stdp_projections_by_target,
    BackendCore,
};

/// Step scheduler that runs every kernel sequentially on the calling thread.
pub struct SingleThreadedBackend {
    core: BackendCore,
}

impl SingleThreadedBackend {
    pub fn new() -> Self {
        debug!("creating single-threaded backend");
        Self {
            core: BackendCore::new(),
        }
    }

    fn tick(&mut self) -> Result<()> {
        let step = self.core.step;
        debug!(step, "starting tick");

        self.core.bus.route_messages();
        self.core.endpoint.lock().receive_all_messages(None);

        let mut stdp_by_target = stdp_projections_by_target(&mut self.core.projections);
        for population in &mut self.core.populations {
            let mut working = stdp_by_target.remove(&population.uid()).unwrap_or_default();
            process_population_variant(
                population,
                &mut working,
                &self.core.endpoint,
                step,
                self.core.learning,
            )?;
        }
        drop(stdp_by_target);

        self.core.bus.route_messages();
        self.core.endpoint.lock().receive_all_messages(None);

        for wrapper in &mut self.core.projections {
            process_projection_wrapper(wrapper, &self.core.endpoint, step)?;
        }

        self.core.bus.route_messages();
        self.core.endpoint.lock().receive_all_messages(None);

        self.core.step += 1;
        Ok(())
    }
}

impl Default for SingleThreadedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for SingleThreadedBackend {
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

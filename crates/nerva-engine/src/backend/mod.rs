// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CPU step-scheduler backends.
//!
//! Both backends drive the same three-phase tick:
//! 1. route, receive, run every population kernel (plus plasticity),
//! 2. route, receive, run every projection kernel,
//! 3. route, receive, advance the step counter.
//!
//! The shared [`BackendCore`] owns the bus, the internal endpoint, the
//! loaded populations and projection wrappers, and the step/learning/run
//! state. The backends differ only in how phases 1 and 2 dispatch work.

mod multi_threaded;
mod single_threaded;

pub use multi_threaded::MultiThreadedBackend;
pub use single_threaded::SingleThreadedBackend;

use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::debug;

use nerva_core::backend::RunFlag;
use nerva_core::bus::MessageBus;
use nerva_core::endpoint::MessageEndpoint;
use nerva_core::error::{CoreError, Result};
use nerva_core::messaging::{SpikeMessage, Step, SynapticImpactMessage};
use nerva_core::population::PopulationVariant;
use nerva_core::projection::{Projection, ProjectionVariant};
use nerva_core::subscription::SubscribableMessage;
use nerva_core::synapse::ResourceStdpDeltaSynapse;
use nerva_core::tags::TagMap;
use nerva_core::uid::Uid;

use crate::blifat::process_blifat_population;
use crate::delta::{process_delta_projection, FutureImpacts};
use crate::stdp::process_resource_stdp;

/// A loaded projection plus the impacts it has scheduled for future steps.
#[derive(Debug)]
pub(crate) struct ProjectionWrapper {
    pub projection: ProjectionVariant,
    pub future_impacts: FutureImpacts,
}

impl ProjectionWrapper {
    fn new(projection: ProjectionVariant) -> Self {
        Self {
            projection,
            future_impacts: FutureImpacts::new(),
        }
    }
}

/// State shared by the CPU backends.
pub(crate) struct BackendCore {
    pub uid: Uid,
    pub tags: TagMap,
    pub bus: MessageBus,
    /// The backend's own endpoint. The mutex guards only `send` and
    /// `unload`; kernels never hold it while computing.
    pub endpoint: Mutex<MessageEndpoint>,
    pub populations: Vec<PopulationVariant>,
    pub projections: Vec<ProjectionWrapper>,
    pub step: Step,
    pub run_flag: RunFlag,
    pub learning: bool,
}

impl BackendCore {
    pub fn new() -> Self {
        let bus = MessageBus::new();
        let endpoint = Mutex::new(bus.create_endpoint());
        Self {
            uid: Uid::random(),
            tags: TagMap::new(),
            bus,
            endpoint,
            populations: Vec::new(),
            projections: Vec::new(),
            step: 0,
            run_flag: RunFlag::new(),
            learning: true,
        }
    }

    pub fn load_populations(&mut self, populations: Vec<PopulationVariant>) -> Result<()> {
        for population in populations {
            let uid = population.uid();
            if self.populations.iter().any(|loaded| loaded.uid() == uid) {
                return Err(CoreError::DuplicateUid(uid));
            }
            debug!(population = %uid, kind = population.kind().name(), "loading population");
            self.populations.push(population);
        }
        Ok(())
    }

    pub fn load_projections(&mut self, projections: Vec<ProjectionVariant>) -> Result<()> {
        for projection in projections {
            let uid = projection.uid();
            if self
                .projections
                .iter()
                .any(|loaded| loaded.projection.uid() == uid)
            {
                return Err(CoreError::DuplicateUid(uid));
            }
            debug!(projection = %uid, kind = projection.kind().name(), "loading projection");
            self.projections.push(ProjectionWrapper::new(projection));
        }
        Ok(())
    }

    pub fn remove_populations(&mut self, uids: &[Uid]) -> Result<()> {
        let mut missing = None;
        for uid in uids {
            match self
                .populations
                .iter()
                .position(|population| population.uid() == *uid)
            {
                Some(position) => {
                    self.populations.remove(position);
                }
                None => missing = missing.or(Some(*uid)),
            }
        }
        match missing {
            Some(uid) => Err(CoreError::PopulationNotFound(uid)),
            None => Ok(()),
        }
    }

    pub fn remove_projections(&mut self, uids: &[Uid]) -> Result<()> {
        let mut missing = None;
        for uid in uids {
            match self
                .projections
                .iter()
                .position(|wrapper| wrapper.projection.uid() == *uid)
            {
                Some(position) => {
                    self.projections.remove(position);
                }
                None => missing = missing.or(Some(*uid)),
            }
        }
        match missing {
            Some(uid) => Err(CoreError::ProjectionNotFound(uid)),
            None => Ok(()),
        }
    }

    pub fn subscribe<M: SubscribableMessage>(&self, receiver: Uid, senders: &[Uid]) -> usize {
        self.endpoint.lock().subscribe::<M>(receiver, senders)
    }

    /// Wire up the internal endpoint for the loaded projections: spikes of
    /// the presynaptic population go to the projection, impacts of the
    /// projection go to the postsynaptic population, and STDP projections
    /// additionally listen to their plasticity-driving populations.
    pub fn init(&self) -> Result<()> {
        let mut endpoint = self.endpoint.lock();
        for wrapper in &self.projections {
            let projection = &wrapper.projection;
            let projection_uid = projection.uid();
            let presynaptic = projection.presynaptic_uid();
            let postsynaptic = projection.postsynaptic_uid();

            for population_uid in projection.stdp_population_uids() {
                if !population_uid.is_nil() {
                    endpoint.subscribe::<SpikeMessage>(projection_uid, &[*population_uid]);
                }
            }
            if !presynaptic.is_nil() {
                endpoint.subscribe::<SpikeMessage>(projection_uid, &[presynaptic]);
            }
            if !postsynaptic.is_nil() {
                endpoint.subscribe::<SynapticImpactMessage>(postsynaptic, &[projection_uid]);
            }
        }
        debug!(
            backend = %self.uid,
            projections = self.projections.len(),
            "backend initialized"
        );
        Ok(())
    }

    pub fn projection_refs(&self) -> Vec<&ProjectionVariant> {
        self.projections
            .iter()
            .map(|wrapper| &wrapper.projection)
            .collect()
    }
}

/// Mutable handles to the STDP projections, grouped by their postsynaptic
/// population. The groups are disjoint because a projection has exactly one
/// postsynaptic population, which is what lets the multi-threaded backend
/// hand each population task its group without further coordination.
pub(crate) fn stdp_projections_by_target(
    projections: &mut [ProjectionWrapper],
) -> AHashMap<Uid, Vec<&mut Projection<ResourceStdpDeltaSynapse>>> {
    let mut by_target: AHashMap<Uid, Vec<&mut Projection<ResourceStdpDeltaSynapse>>> =
        AHashMap::new();
    for wrapper in projections.iter_mut() {
        if let ProjectionVariant::ResourceStdpDelta(projection) = &mut wrapper.projection {
            by_target
                .entry(projection.postsynaptic_uid())
                .or_default()
                .push(projection);
        }
    }
    by_target
}

/// Run one population through the membrane kernel and, for the
/// plasticity-enabled kind, the plasticity kernel.
pub(crate) fn process_population_variant(
    population: &mut PopulationVariant,
    stdp_projections: &mut Vec<&mut Projection<ResourceStdpDeltaSynapse>>,
    endpoint: &Mutex<MessageEndpoint>,
    step: Step,
    learning: bool,
) -> Result<()> {
    match population {
        PopulationVariant::Blifat(population) => {
            process_blifat_population(population, endpoint, step)?;
        }
        PopulationVariant::ResourceStdpBlifat(population) => {
            let message = process_blifat_population(population, endpoint, step)?;
            if learning {
                process_resource_stdp(population, stdp_projections, message.as_ref(), step);
            }
        }
    }
    Ok(())
}

/// Run one projection through the synapse kernel.
pub(crate) fn process_projection_wrapper(
    wrapper: &mut ProjectionWrapper,
    endpoint: &Mutex<MessageEndpoint>,
    step: Step,
) -> Result<()> {
    match &mut wrapper.projection {
        ProjectionVariant::Delta(projection) => {
            process_delta_projection(projection, endpoint, &mut wrapper.future_impacts, step)
        }
        ProjectionVariant::ResourceStdpDelta(projection) => {
            process_delta_projection(projection, endpoint, &mut wrapper.future_impacts, step)
        }
    }
}

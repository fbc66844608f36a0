// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! UID-indexed containers of populations and projections.

use tracing::debug;

use nerva_core::error::{CoreError, Result};
use nerva_core::neuron::NeuronType;
use nerva_core::population::{Population, PopulationVariant};
use nerva_core::projection::{Projection, ProjectionVariant};
use nerva_core::synapse::SynapseType;
use nerva_core::tags::TagMap;
use nerva_core::uid::Uid;

/// Ordered sets of populations and projections, each indexed by UID.
/// Duplicate UIDs are rejected at insertion.
#[derive(Debug, Clone, Default)]
pub struct Network {
    uid: Uid,
    tags: TagMap,
    populations: Vec<PopulationVariant>,
    projections: Vec<ProjectionVariant>,
}

impl Network {
    pub fn new() -> Self {
        Self {
            uid: Uid::random(),
            ..Default::default()
        }
    }

    pub fn with_uid(uid: Uid) -> Self {
        Self {
            uid,
            ..Default::default()
        }
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn tags(&self) -> &TagMap {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagMap {
        &mut self.tags
    }

    pub fn add_population(&mut self, population: impl Into<PopulationVariant>) -> Result<()> {
        let population = population.into();
        let uid = population.uid();
        if self.contains_population(uid) {
            return Err(CoreError::DuplicateUid(uid));
        }
        debug!(network = %self.uid, population = %uid, "adding population");
        self.populations.push(population);
        Ok(())
    }

    pub fn add_projection(&mut self, projection: impl Into<ProjectionVariant>) -> Result<()> {
        let projection = projection.into();
        let uid = projection.uid();
        if self.contains_projection(uid) {
            return Err(CoreError::DuplicateUid(uid));
        }
        debug!(network = %self.uid, projection = %uid, "adding projection");
        self.projections.push(projection);
        Ok(())
    }

    pub fn remove_population(&mut self, uid: Uid) -> Result<()> {
        let position = self
            .populations
            .iter()
            .position(|population| population.uid() == uid)
            .ok_or(CoreError::PopulationNotFound(uid))?;
        self.populations.remove(position);
        Ok(())
    }

    pub fn remove_projection(&mut self, uid: Uid) -> Result<()> {
        let position = self
            .projections
            .iter()
            .position(|projection| projection.uid() == uid)
            .ok_or(CoreError::ProjectionNotFound(uid))?;
        self.projections.remove(position);
        Ok(())
    }

    pub fn contains_population(&self, uid: Uid) -> bool {
        self.populations
            .iter()
            .any(|population| population.uid() == uid)
    }

    pub fn contains_projection(&self, uid: Uid) -> bool {
        self.projections
            .iter()
            .any(|projection| projection.uid() == uid)
    }

    pub fn population(&self, uid: Uid) -> Result<&PopulationVariant> {
        self.populations
            .iter()
            .find(|population| population.uid() == uid)
            .ok_or(CoreError::PopulationNotFound(uid))
    }

    pub fn population_mut(&mut self, uid: Uid) -> Result<&mut PopulationVariant> {
        self.populations
            .iter_mut()
            .find(|population| population.uid() == uid)
            .ok_or(CoreError::PopulationNotFound(uid))
    }

    pub fn projection(&self, uid: Uid) -> Result<&ProjectionVariant> {
        self.projections
            .iter()
            .find(|projection| projection.uid() == uid)
            .ok_or(CoreError::ProjectionNotFound(uid))
    }

    pub fn projection_mut(&mut self, uid: Uid) -> Result<&mut ProjectionVariant> {
        self.projections
            .iter_mut()
            .find(|projection| projection.uid() == uid)
            .ok_or(CoreError::ProjectionNotFound(uid))
    }

    /// Typed read of a population. Fails if the UID is absent or belongs to
    /// another neuron kind.
    pub fn get_population<N: NeuronType>(&self, uid: Uid) -> Result<&Population<N>> {
        N::population_ref(self.population(uid)?).ok_or(CoreError::PopulationNotFound(uid))
    }

    pub fn get_population_mut<N: NeuronType>(&mut self, uid: Uid) -> Result<&mut Population<N>> {
        N::population_mut(self.population_mut(uid)?).ok_or(CoreError::PopulationNotFound(uid))
    }

    /// Typed read of a projection. Fails if the UID is absent or belongs to
    /// another synapse kind.
    pub fn get_projection<S: SynapseType>(&self, uid: Uid) -> Result<&Projection<S>> {
        S::projection_ref(self.projection(uid)?).ok_or(CoreError::ProjectionNotFound(uid))
    }

    pub fn get_projection_mut<S: SynapseType>(&mut self, uid: Uid) -> Result<&mut Projection<S>> {
        S::projection_mut(self.projection_mut(uid)?).ok_or(CoreError::ProjectionNotFound(uid))
    }

    pub fn populations(&self) -> &[PopulationVariant] {
        &self.populations
    }

    pub fn projections(&self) -> &[ProjectionVariant] {
        &self.projections
    }

    pub fn population_count(&self) -> usize {
        self.populations.len()
    }

    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }
}

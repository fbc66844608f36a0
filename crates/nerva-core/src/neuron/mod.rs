// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Neuron kinds and parameter records.

mod blifat;
mod resource_stdp;

pub use blifat::{BlifatDynamics, BlifatNeuron};
pub use resource_stdp::{IsiStatus, ResourceStdpBlifatNeuron};

use serde::{Deserialize, Serialize};

use crate::population::{Population, PopulationVariant};

/// Closed list of neuron kinds. Variant ordinals are the stable registry
/// order used by external formats; they must never be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeuronKind {
    Blifat = 0,
    ResourceStdpBlifat = 1,
}

impl NeuronKind {
    pub const ALL: [NeuronKind; 2] = [NeuronKind::Blifat, NeuronKind::ResourceStdpBlifat];

    pub fn name(&self) -> &'static str {
        match self {
            NeuronKind::Blifat => "BlifatNeuron",
            NeuronKind::ResourceStdpBlifat => "ResourceStdpBlifatNeuron",
        }
    }
}

/// A neuron parameter record type in the closed registry, with checked
/// extraction of its population from the population variant.
pub trait NeuronType: Clone + Send + Sync + 'static {
    const KIND: NeuronKind;

    fn name() -> &'static str {
        Self::KIND.name()
    }

    fn wrap(population: Population<Self>) -> PopulationVariant;

    fn population_ref(variant: &PopulationVariant) -> Option<&Population<Self>>;

    fn population_mut(variant: &mut PopulationVariant) -> Option<&mut Population<Self>>;
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Populations of neurons.

use std::ops::{Index, IndexMut};

use ahash::AHashMap;
use tracing::debug;

use crate::neuron::{BlifatNeuron, NeuronKind, NeuronType, ResourceStdpBlifatNeuron};
use crate::tags::TagMap;
use crate::uid::Uid;

/// Ordered collection of neuron parameter records of one kind.
#[derive(Debug, Clone)]
pub struct Population<N> {
    uid: Uid,
    tags: TagMap,
    neurons: Vec<N>,
    // Optional per-neuron tag sub-maps, addressed by neuron index.
    neuron_tags: AHashMap<usize, TagMap>,
}

impl<N> Population<N> {
    /// Build a population by running `generator` for indexes `0..count`.
    /// Indexes for which the generator returns `None` are skipped.
    pub fn from_generator(
        uid: Uid,
        mut generator: impl FnMut(usize) -> Option<N>,
        count: usize,
    ) -> Self {
        let mut neurons = Vec::with_capacity(count);
        for index in 0..count {
            if let Some(neuron) = generator(index) {
                neurons.push(neuron);
            }
        }
        debug!(%uid, neurons = neurons.len(), "created population");
        Self {
            uid,
            tags: TagMap::new(),
            neurons,
            neuron_tags: AHashMap::new(),
        }
    }

    /// Build a population with a fresh random UID.
    pub fn new(generator: impl FnMut(usize) -> Option<N>, count: usize) -> Self {
        Self::from_generator(Uid::random(), generator, count)
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

    /// Tags of the neuron at `index`, created on first access.
    pub fn neuron_tags(&mut self, index: usize) -> &mut TagMap {
        self.neuron_tags.entry(index).or_default()
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    pub fn neurons(&self) -> &[N] {
        &self.neurons
    }

    pub fn get(&self, index: usize) -> Option<&N> {
        self.neurons.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut N> {
        self.neurons.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &N> {
        self.neurons.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut N> {
        self.neurons.iter_mut()
    }

    /// Append neurons produced by `generator` for indexes `0..count`.
    pub fn add_neurons(&mut self, mut generator: impl FnMut(usize) -> Option<N>, count: usize) {
        self.neurons.reserve(count);
        for index in 0..count {
            if let Some(neuron) = generator(index) {
                self.neurons.push(neuron);
            }
        }
    }

    pub fn remove_neuron(&mut self, index: usize) {
        self.neurons.remove(index);
    }

    /// Remove the neurons at `indexes`. The list must be sorted ascending.
    pub fn remove_neurons(&mut self, indexes: &[usize]) {
        for (shift, index) in indexes.iter().enumerate() {
            self.neurons.remove(index - shift);
        }
    }
}

impl<N> Index<usize> for Population<N> {
    type Output = N;

    fn index(&self, index: usize) -> &N {
        &self.neurons[index]
    }
}

impl<N> IndexMut<usize> for Population<N> {
    fn index_mut(&mut self, index: usize) -> &mut N {
        &mut self.neurons[index]
    }
}

/// Closed variant over every supported population kind.
#[derive(Debug, Clone)]
pub enum PopulationVariant {
    Blifat(Population<BlifatNeuron>),
    ResourceStdpBlifat(Population<ResourceStdpBlifatNeuron>),
}

impl PopulationVariant {
    pub fn uid(&self) -> Uid {
        match self {
            PopulationVariant::Blifat(population) => population.uid(),
            PopulationVariant::ResourceStdpBlifat(population) => population.uid(),
        }
    }

    pub fn kind(&self) -> NeuronKind {
        match self {
            PopulationVariant::Blifat(_) => NeuronKind::Blifat,
            PopulationVariant::ResourceStdpBlifat(_) => NeuronKind::ResourceStdpBlifat,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PopulationVariant::Blifat(population) => population.len(),
            PopulationVariant::ResourceStdpBlifat(population) => population.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tags(&self) -> &TagMap {
        match self {
            PopulationVariant::Blifat(population) => population.tags(),
            PopulationVariant::ResourceStdpBlifat(population) => population.tags(),
        }
    }

    pub fn tags_mut(&mut self) -> &mut TagMap {
        match self {
            PopulationVariant::Blifat(population) => population.tags_mut(),
            PopulationVariant::ResourceStdpBlifat(population) => population.tags_mut(),
        }
    }
}

impl From<Population<BlifatNeuron>> for PopulationVariant {
    fn from(population: Population<BlifatNeuron>) -> Self {
        PopulationVariant::Blifat(population)
    }
}

impl From<Population<ResourceStdpBlifatNeuron>> for PopulationVariant {
    fn from(population: Population<ResourceStdpBlifatNeuron>) -> Self {
        PopulationVariant::ResourceStdpBlifat(population)
    }
}

impl NeuronType for BlifatNeuron {
    const KIND: NeuronKind = NeuronKind::Blifat;

    fn wrap(population: Population<Self>) -> PopulationVariant {
        PopulationVariant::Blifat(population)
    }

    fn population_ref(variant: &PopulationVariant) -> Option<&Population<Self>> {
        match variant {
            PopulationVariant::Blifat(population) => Some(population),
            _ => None,
        }
    }

    fn population_mut(variant: &mut PopulationVariant) -> Option<&mut Population<Self>> {
        match variant {
            PopulationVariant::Blifat(population) => Some(population),
            _ => None,
        }
    }
}

impl NeuronType for ResourceStdpBlifatNeuron {
    const KIND: NeuronKind = NeuronKind::ResourceStdpBlifat;

    fn wrap(population: Population<Self>) -> PopulationVariant {
        PopulationVariant::ResourceStdpBlifat(population)
    }

    fn population_ref(variant: &PopulationVariant) -> Option<&Population<Self>> {
        match variant {
            PopulationVariant::ResourceStdpBlifat(population) => Some(population),
            _ => None,
        }
    }

    fn population_mut(variant: &mut PopulationVariant) -> Option<&mut Population<Self>> {
        match variant {
            PopulationVariant::ResourceStdpBlifat(population) => Some(population),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_skips_none() {
        let population =
            Population::<BlifatNeuron>::new(|index| (index % 2 == 0).then(BlifatNeuron::default), 10);
        assert_eq!(population.len(), 5);
    }

    #[test]
    fn test_add_and_remove_neurons() {
        let mut population = Population::<BlifatNeuron>::new(|_| Some(BlifatNeuron::default()), 4);
        population.add_neurons(|_| Some(BlifatNeuron::default()), 2);
        assert_eq!(population.len(), 6);

        population[0].potential = 10.0;
        population[3].potential = 30.0;
        population[5].potential = 50.0;
        population.remove_neurons(&[1, 2, 4]);
        assert_eq!(population.len(), 3);
        assert_eq!(population[0].potential, 10.0);
        assert_eq!(population[1].potential, 30.0);
        assert_eq!(population[2].potential, 50.0);
    }

    #[test]
    fn test_neuron_tags() {
        let mut population = Population::<BlifatNeuron>::new(|_| Some(BlifatNeuron::default()), 2);
        population.neuron_tags(1).set("label", "readout");
        assert_eq!(
            population.neuron_tags(1).get_text("label").unwrap(),
            "readout"
        );
        assert!(population.neuron_tags(0).is_empty());
    }

    #[test]
    fn test_variant_dispatch() {
        let population = Population::<ResourceStdpBlifatNeuron>::new(
            |_| Some(ResourceStdpBlifatNeuron::default()),
            3,
        );
        let uid = population.uid();
        let variant = PopulationVariant::from(population);

        assert_eq!(variant.uid(), uid);
        assert_eq!(variant.kind(), NeuronKind::ResourceStdpBlifat);
        assert_eq!(variant.len(), 3);
        assert!(ResourceStdpBlifatNeuron::population_ref(&variant).is_some());
        assert!(BlifatNeuron::population_ref(&variant).is_none());
    }
}

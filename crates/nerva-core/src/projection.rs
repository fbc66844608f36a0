// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Projections of synapses.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::messaging::{Step, SynapseOutputKind};
use crate::synapse::{
    DeltaSynapse, ResourceStdpDeltaSynapse, StdpSharedParams, SynapseKind, SynapseType,
};
use crate::synaptic_index::SynapticIndex;
use crate::tags::TagMap;
use crate::uid::Uid;

/// One connection: synapse parameters plus source and target neuron indexes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Synapse<S> {
    pub params: S,
    /// Presynaptic neuron index.
    pub source: u32,
    /// Postsynaptic neuron index.
    pub target: u32,
}

/// Ordered collection of synapses of one kind connecting two populations.
///
/// Lookup by pre- or postsynaptic neuron goes through a lazily rebuilt
/// multi-key index: structural mutations either update the index in place or
/// mark it stale, and the next query rebuilds it before answering.
#[derive(Debug, Clone)]
pub struct Projection<S: SynapseType> {
    uid: Uid,
    tags: TagMap,
    presynaptic_uid: Uid,
    postsynaptic_uid: Uid,
    synapses: Vec<Synapse<S>>,
    shared: S::Shared,
    index: SynapticIndex,
    index_is_current: bool,
    is_locked: bool,
}

impl<S: SynapseType> Projection<S> {
    /// Create an empty projection with a fresh random UID.
    pub fn new(presynaptic_uid: Uid, postsynaptic_uid: Uid) -> Self {
        Self::with_uid(Uid::random(), presynaptic_uid, postsynaptic_uid)
    }

    pub fn with_uid(uid: Uid, presynaptic_uid: Uid, postsynaptic_uid: Uid) -> Self {
        debug!(%uid, pre = %presynaptic_uid, post = %postsynaptic_uid, "created projection");
        Self {
            uid,
            tags: TagMap::new(),
            presynaptic_uid,
            postsynaptic_uid,
            synapses: Vec::new(),
            shared: S::Shared::default(),
            index: SynapticIndex::new(),
            index_is_current: true,
            is_locked: false,
        }
    }

    /// Build a projection by running `generator` for indexes `0..count`.
    /// Indexes for which the generator returns `None` are skipped.
    pub fn from_generator(
        uid: Uid,
        presynaptic_uid: Uid,
        postsynaptic_uid: Uid,
        generator: impl FnMut(usize) -> Option<Synapse<S>>,
        count: usize,
    ) -> Self {
        let mut projection = Self::with_uid(uid, presynaptic_uid, postsynaptic_uid);
        projection.add_synapses_with(generator, count);
        projection.reindex();
        projection
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

    pub fn presynaptic_uid(&self) -> Uid {
        self.presynaptic_uid
    }

    pub fn postsynaptic_uid(&self) -> Uid {
        self.postsynaptic_uid
    }

    pub fn shared(&self) -> &S::Shared {
        &self.shared
    }

    pub fn shared_mut(&mut self) -> &mut S::Shared {
        &mut self.shared
    }

    pub fn len(&self) -> usize {
        self.synapses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synapses.is_empty()
    }

    /// Forbid weight mutation by the plasticity kernel. Structural mutations
    /// are unaffected.
    pub fn lock_weights(&mut self) {
        self.is_locked = true;
    }

    pub fn unlock_weights(&mut self) {
        self.is_locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    pub fn synapses(&self) -> &[Synapse<S>] {
        &self.synapses
    }

    pub fn get(&self, position: usize) -> Option<&Synapse<S>> {
        self.synapses.get(position)
    }

    /// Mutable access to a synapse. Meant for parameter updates; source and
    /// target must not be edited through this handle.
    pub fn get_mut(&mut self, position: usize) -> Option<&mut Synapse<S>> {
        self.synapses.get_mut(position)
    }

    /// Append synapses produced by `generator` for indexes `0..count`.
    /// Returns the number of synapses added; the index goes stale.
    pub fn add_synapses_with(
        &mut self,
        mut generator: impl FnMut(usize) -> Option<Synapse<S>>,
        count: usize,
    ) -> usize {
        let starting_len = self.synapses.len();
        self.index_is_current = false;
        for index in 0..count {
            if let Some(synapse) = generator(index) {
                self.synapses.push(synapse);
            }
        }
        self.synapses.len() - starting_len
    }

    /// Append synapses, updating the index incrementally when it is current.
    pub fn add_synapses(&mut self, synapses: &[Synapse<S>]) -> usize {
        for synapse in synapses {
            if self.index_is_current {
                self.index
                    .insert(synapse.source, synapse.target, self.synapses.len());
            }
            self.synapses.push(synapse.clone());
        }
        synapses.len()
    }

    /// Remove the synapse at `position`. Later synapses shift down, so the
    /// index goes stale.
    pub fn remove_synapse(&mut self, position: usize) {
        self.synapses.remove(position);
        self.index_is_current = false;
    }

    pub fn clear(&mut self) {
        self.synapses.clear();
        self.index.clear();
        self.index_is_current = true;
    }

    /// Remove every synapse matching `predicate`. Returns the removed count.
    pub fn disconnect_if(&mut self, mut predicate: impl FnMut(&Synapse<S>) -> bool) -> usize {
        let starting_len = self.synapses.len();
        self.index_is_current = false;
        self.synapses.retain(|synapse| !predicate(synapse));
        starting_len - self.synapses.len()
    }

    pub fn disconnect_presynaptic_neuron(&mut self, source: u32) -> usize {
        self.disconnect_if(|synapse| synapse.source == source)
    }

    pub fn disconnect_postsynaptic_neuron(&mut self, target: u32) -> usize {
        self.disconnect_if(|synapse| synapse.target == target)
    }

    pub fn disconnect_neurons(&mut self, source: u32, target: u32) -> usize {
        self.disconnect_if(|synapse| synapse.source == source && synapse.target == target)
    }

    /// Positions of the synapses leaving presynaptic neuron `source`.
    /// Rebuilds the index first if it is stale.
    pub fn synapses_from(&mut self, source: u32) -> &[usize] {
        self.reindex();
        self.index.of_source(source)
    }

    /// Positions of the synapses arriving at postsynaptic neuron `target`.
    /// Rebuilds the index first if it is stale.
    pub fn synapses_to(&mut self, target: u32) -> &[usize] {
        self.reindex();
        self.index.of_target(target)
    }

    pub fn index_is_current(&self) -> bool {
        self.index_is_current
    }

    /// Rebuild the index if a structural mutation left it stale.
    pub fn reindex(&mut self) {
        if self.index_is_current {
            return;
        }
        self.index.rebuild(
            self.synapses
                .iter()
                .enumerate()
                .map(|(position, synapse)| (synapse.source, synapse.target, position)),
        );
        self.index_is_current = true;
    }
}

impl<S: SynapseType> Index<usize> for Projection<S> {
    type Output = Synapse<S>;

    fn index(&self, position: usize) -> &Synapse<S> {
        &self.synapses[position]
    }
}

impl<S: SynapseType> IndexMut<usize> for Projection<S> {
    fn index_mut(&mut self, position: usize) -> &mut Synapse<S> {
        &mut self.synapses[position]
    }
}

/// Closed variant over every supported projection kind.
#[derive(Debug, Clone)]
pub enum ProjectionVariant {
    Delta(Projection<DeltaSynapse>),
    ResourceStdpDelta(Projection<ResourceStdpDeltaSynapse>),
}

impl ProjectionVariant {
    pub fn uid(&self) -> Uid {
        match self {
            ProjectionVariant::Delta(projection) => projection.uid(),
            ProjectionVariant::ResourceStdpDelta(projection) => projection.uid(),
        }
    }

    pub fn kind(&self) -> SynapseKind {
        match self {
            ProjectionVariant::Delta(_) => SynapseKind::Delta,
            ProjectionVariant::ResourceStdpDelta(_) => SynapseKind::ResourceStdpDelta,
        }
    }

    pub fn presynaptic_uid(&self) -> Uid {
        match self {
            ProjectionVariant::Delta(projection) => projection.presynaptic_uid(),
            ProjectionVariant::ResourceStdpDelta(projection) => projection.presynaptic_uid(),
        }
    }

    pub fn postsynaptic_uid(&self) -> Uid {
        match self {
            ProjectionVariant::Delta(projection) => projection.postsynaptic_uid(),
            ProjectionVariant::ResourceStdpDelta(projection) => projection.postsynaptic_uid(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ProjectionVariant::Delta(projection) => projection.len(),
            ProjectionVariant::ResourceStdpDelta(projection) => projection.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tags(&self) -> &TagMap {
        match self {
            ProjectionVariant::Delta(projection) => projection.tags(),
            ProjectionVariant::ResourceStdpDelta(projection) => projection.tags(),
        }
    }

    pub fn tags_mut(&mut self) -> &mut TagMap {
        match self {
            ProjectionVariant::Delta(projection) => projection.tags_mut(),
            ProjectionVariant::ResourceStdpDelta(projection) => projection.tags_mut(),
        }
    }

    /// Populations whose spikes drive this projection's plasticity. Empty
    /// for non-plastic kinds.
    pub fn stdp_population_uids(&self) -> &[Uid] {
        match self {
            ProjectionVariant::Delta(_) => &[],
            ProjectionVariant::ResourceStdpDelta(projection) => {
                &projection.shared().stdp_populations
            }
        }
    }
}

impl From<Projection<DeltaSynapse>> for ProjectionVariant {
    fn from(projection: Projection<DeltaSynapse>) -> Self {
        ProjectionVariant::Delta(projection)
    }
}

impl From<Projection<ResourceStdpDeltaSynapse>> for ProjectionVariant {
    fn from(projection: Projection<ResourceStdpDeltaSynapse>) -> Self {
        ProjectionVariant::ResourceStdpDelta(projection)
    }
}

impl SynapseType for DeltaSynapse {
    const KIND: SynapseKind = SynapseKind::Delta;
    const IS_FORCING: bool = true;

    type Shared = ();

    fn weight(&self) -> f32 {
        self.weight
    }

    fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    fn delay(&self) -> u32 {
        self.delay
    }

    fn output_kind(&self) -> SynapseOutputKind {
        self.output_kind
    }

    fn wrap(projection: Projection<Self>) -> ProjectionVariant {
        ProjectionVariant::Delta(projection)
    }

    fn projection_ref(variant: &ProjectionVariant) -> Option<&Projection<Self>> {
        match variant {
            ProjectionVariant::Delta(projection) => Some(projection),
            _ => None,
        }
    }

    fn projection_mut(variant: &mut ProjectionVariant) -> Option<&mut Projection<Self>> {
        match variant {
            ProjectionVariant::Delta(projection) => Some(projection),
            _ => None,
        }
    }
}

impl SynapseType for ResourceStdpDeltaSynapse {
    const KIND: SynapseKind = SynapseKind::ResourceStdpDelta;
    const IS_FORCING: bool = false;

    type Shared = StdpSharedParams;

    fn weight(&self) -> f32 {
        self.weight
    }

    fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    fn delay(&self) -> u32 {
        self.delay
    }

    fn output_kind(&self) -> SynapseOutputKind {
        self.output_kind
    }

    fn on_spike(&mut self, step: Step) {
        self.rule.last_spike_step = step;
    }

    fn plasticity_sources(shared: &Self::Shared) -> &[Uid] {
        &shared.stdp_populations
    }

    fn wrap(projection: Projection<Self>) -> ProjectionVariant {
        ProjectionVariant::ResourceStdpDelta(projection)
    }

    fn projection_ref(variant: &ProjectionVariant) -> Option<&Projection<Self>> {
        match variant {
            ProjectionVariant::ResourceStdpDelta(projection) => Some(projection),
            _ => None,
        }
    }

    fn projection_mut(variant: &mut ProjectionVariant) -> Option<&mut Projection<Self>> {
        match variant {
            ProjectionVariant::ResourceStdpDelta(projection) => Some(projection),
            _ => None,
        }
    }
}

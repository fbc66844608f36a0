// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synapse kinds and parameter records.

mod delta;
mod resource_stdp;

pub use delta::DeltaSynapse;
pub use resource_stdp::{ResourceStdpDeltaSynapse, StdpSharedParams, SynapticResourceRule};

use serde::{Deserialize, Serialize};

use crate::messaging::{Step, SynapseOutputKind};
use crate::projection::{Projection, ProjectionVariant};

/// Closed list of synapse kinds. Variant ordinals are the stable registry
/// order used by external formats; they must never be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynapseKind {
    Delta = 0,
    ResourceStdpDelta = 1,
}

impl SynapseKind {
    pub const ALL: [SynapseKind; 2] = [SynapseKind::Delta, SynapseKind::ResourceStdpDelta];

    pub fn name(&self) -> &'static str {
        match self {
            SynapseKind::Delta => "DeltaSynapse",
            SynapseKind::ResourceStdpDelta => "ResourceStdpDeltaSynapse",
        }
    }
}

/// A synapse parameter record type in the closed registry.
///
/// The accessors expose the fields the delta kernel needs regardless of the
/// concrete kind; [`SynapseType::on_spike`] lets plastic kinds record spike
/// traversal.
pub trait SynapseType: Clone + Send + Sync + 'static {
    const KIND: SynapseKind;

    /// Impact messages from projections of this kind force their targets.
    /// Set for non-plastic kinds; plasticity-enabled neurons treat forced
    /// excitatory input specially during training.
    const IS_FORCING: bool;

    /// Extra state shared by a whole projection of this kind.
    type Shared: Clone + Default + Send + Sync + std::fmt::Debug + 'static;

    fn name() -> &'static str {
        Self::KIND.name()
    }

    fn weight(&self) -> f32;

    fn set_weight(&mut self, weight: f32);

    /// Transmission delay in steps. A delay of `n` means a spike sent on
    /// step `s` reaches the target on step `s + n`. Always at least 1.
    fn delay(&self) -> u32;

    fn output_kind(&self) -> SynapseOutputKind;

    /// Record that a spike traversed this synapse on `step`.
    fn on_spike(&mut self, _step: Step) {}

    /// Populations whose spikes drive this kind's plasticity. Their
    /// messages reach the projection for bookkeeping only and never
    /// generate impacts.
    fn plasticity_sources(_shared: &Self::Shared) -> &[crate::uid::Uid] {
        &[]
    }

    fn wrap(projection: Projection<Self>) -> ProjectionVariant;

    fn projection_ref(variant: &ProjectionVariant) -> Option<&Projection<Self>>;

    fn projection_mut(variant: &mut ProjectionVariant) -> Option<&mut Projection<Self>>;
}

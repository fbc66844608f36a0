// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Delta synapse wrapped with the synaptic-resource STDP rule.

use serde::{Deserialize, Serialize};

use crate::messaging::{Step, SynapseOutputKind};
use crate::uid::Uid;

/// Per-synapse state of the synaptic-resource STDP rule. The synapse weight
/// is a function of `synaptic_resource`, bounded by `w_min` and `w_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynapticResourceRule {
    /// Resource bound to this synapse; determines the weight.
    pub synaptic_resource: f32,
    pub w_min: f32,
    pub w_max: f32,
    /// Unconditional resource drain on every postsynaptic spike.
    pub d_u: f32,
    /// A dopamine impact within this many steps of the last presynaptic
    /// spike changes the synapse.
    pub dopamine_plasticity_period: u64,
    /// Step on which the synapse last carried a spike.
    pub last_spike_step: Step,
    /// Set once the synapse received its Hebbian update for the current
    /// spiking sequence.
    pub had_hebbian_update: bool,
}

impl Default for SynapticResourceRule {
    fn default() -> Self {
        Self {
            synaptic_resource: 0.0,
            w_min: 0.0,
            w_max: 1.0,
            d_u: 0.0,
            dopamine_plasticity_period: 10,
            last_spike_step: 0,
            had_hebbian_update: false,
        }
    }
}

/// Parameter record of an STDP-wrapped delta synapse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceStdpDeltaSynapse {
    pub weight: f32,
    /// Transmission delay in steps, at least 1.
    pub delay: u32,
    pub output_kind: SynapseOutputKind,
    pub rule: SynapticResourceRule,
}

impl ResourceStdpDeltaSynapse {
    pub fn new(weight: f32, delay: u32, output_kind: SynapseOutputKind) -> Self {
        Self {
            weight,
            delay,
            output_kind,
            rule: SynapticResourceRule::default(),
        }
    }

    pub fn with_rule(mut self, rule: SynapticResourceRule) -> Self {
        self.rule = rule;
        self
    }
}

impl Default for ResourceStdpDeltaSynapse {
    fn default() -> Self {
        Self::new(0.0, 1, SynapseOutputKind::Excitatory)
    }
}

/// Projection-wide parameters of an STDP-wrapped projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StdpSharedParams {
    /// Populations whose spikes drive this projection's plasticity.
    pub stdp_populations: Vec<Uid>,
}

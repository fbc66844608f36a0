// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! BLIFAT neuron: bursting, leaky integrate-and-fire, adaptive threshold.

use serde::{Deserialize, Serialize};

/// Parameter record of a BLIFAT neuron. A population is a plain vector of
/// these; all state the membrane kernel reads and writes lives here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlifatNeuron {
    /// Membrane potential.
    pub potential: f64,
    /// Multiplicative decay applied to the potential every step.
    pub potential_decay: f64,
    /// Base firing threshold. A neuron spikes when the potential reaches
    /// `activation_threshold + dynamic_threshold`.
    pub activation_threshold: f64,
    /// Adaptive addition to the firing threshold. Grows on every spike,
    /// decays multiplicatively each step.
    pub dynamic_threshold: f64,
    pub threshold_decay: f64,
    pub threshold_increment: f64,
    /// Exponential trace of this neuron's own spikes.
    pub postsynaptic_trace: f64,
    pub postsynaptic_trace_decay: f64,
    pub postsynaptic_trace_increment: f64,
    /// Conductance-based inhibition pulling the potential toward
    /// `reversal_inhibitory_potential`.
    pub inhibitory_conductance: f64,
    pub inhibitory_conductance_decay: f64,
    pub reversal_inhibitory_potential: f64,
    /// Remaining steps until the post-spike burst fires. Zero when idle.
    pub bursting_phase: u32,
    /// Burst delay armed on every spike. Zero disables bursting.
    pub bursting_period: u32,
    /// Potential added when the bursting phase elapses.
    pub reflexive_weight: f64,
    /// Minimum number of steps between two spikes.
    pub absolute_refractory_period: u64,
    pub n_time_steps_since_last_firing: u64,
    /// Potential assigned right after a spike.
    pub potential_reset_value: f64,
    /// Floor the potential is clamped to at the end of every step.
    pub min_potential: f64,
    /// Potential before the impacts of the current step were applied. While
    /// the neuron is blocked, impact-driven changes are discarded by
    /// restoring this value.
    pub pre_impact_potential: f64,
    /// Remaining steps of total activity blocking.
    pub total_blocking_period: u64,
    /// Accumulator for dopamine impacts received during the current step.
    pub dopamine_value: f64,
}

impl Default for BlifatNeuron {
    fn default() -> Self {
        Self {
            potential: 0.0,
            potential_decay: 0.0,
            activation_threshold: 1.0,
            dynamic_threshold: 0.0,
            threshold_decay: 0.0,
            threshold_increment: 0.0,
            postsynaptic_trace: 0.0,
            postsynaptic_trace_decay: 0.0,
            postsynaptic_trace_increment: 0.0,
            inhibitory_conductance: 0.0,
            inhibitory_conductance_decay: 0.0,
            reversal_inhibitory_potential: -0.3,
            bursting_phase: 0,
            bursting_period: 0,
            reflexive_weight: 0.0,
            absolute_refractory_period: 0,
            // Saturating-large so a freshly created neuron is not refractory.
            n_time_steps_since_last_firing: u64::MAX,
            potential_reset_value: 0.0,
            min_potential: -1.0e9,
            pre_impact_potential: 0.0,
            total_blocking_period: 0,
            dopamine_value: 0.0,
        }
    }
}

/// View of the BLIFAT state inside any neuron kind the membrane kernel can
/// drive, with hooks used by the plasticity-enabled variant.
pub trait BlifatDynamics {
    fn blifat(&self) -> &BlifatNeuron;

    fn blifat_mut(&mut self) -> &mut BlifatNeuron;

    /// Called once at the beginning of every step, before decay.
    fn begin_step(&mut self) {}

    /// Called when an excitatory impact from a forcing message lands on
    /// this neuron.
    fn mark_forced(&mut self) {}
}

impl BlifatDynamics for BlifatNeuron {
    fn blifat(&self) -> &BlifatNeuron {
        self
    }

    fn blifat_mut(&mut self) -> &mut BlifatNeuron {
        self
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Membrane dynamics kernel for BLIFAT-like populations.
//!
//! One population step: decay, apply incoming synaptic impacts, resolve
//! conductance-based inhibition, test the firing condition, clamp. The
//! kernel is generic over [`BlifatDynamics`] so the plasticity-enabled
//! neuron kind runs through the same code path.

use parking_lot::Mutex;
use tracing::{debug, warn};

use nerva_core::endpoint::MessageEndpoint;
use nerva_core::error::{CoreError, Result};
use nerva_core::messaging::{
    MessageHeader, SpikeData, SpikeMessage, Step, SynapseOutputKind, SynapticImpact,
    SynapticImpactMessage,
};
use nerva_core::neuron::{BlifatDynamics, BlifatNeuron};
use nerva_core::population::Population;

/// Run one step for a population. Emits at most one spike message through
/// `endpoint` and returns a copy of it for the caller.
///
/// The endpoint mutex is held only while unloading inputs and sending the
/// result, never during neuron computation.
pub fn process_blifat_population<N: BlifatDynamics>(
    population: &mut Population<N>,
    endpoint: &Mutex<MessageEndpoint>,
    step: Step,
) -> Result<Option<SpikeMessage>> {
    let population_uid = population.uid();
    let messages = endpoint
        .lock()
        .unload_messages::<SynapticImpactMessage>(population_uid)
        .unwrap_or_default();

    for neuron in population.iter_mut() {
        neuron.begin_step();
        decay_neuron(neuron.blifat_mut());
        let blifat = neuron.blifat_mut();
        blifat.pre_impact_potential = blifat.potential;
    }

    for message in &messages {
        for impact in &message.impacts {
            let index = impact.postsynaptic_neuron_index as usize;
            let Some(neuron) = population.get_mut(index) else {
                warn!(
                    population = %population_uid,
                    neuron = index,
                    "impact for a neuron index outside the population"
                );
                continue;
            };
            apply_impact(neuron, impact, message.is_forcing);
        }
    }

    // While blocked, the potential changes caused by impacts are discarded.
    for neuron in population.iter_mut() {
        let blifat = neuron.blifat_mut();
        if blifat.total_blocking_period > 0 {
            blifat.potential = blifat.pre_impact_potential;
            blifat.total_blocking_period -= 1;
        }
    }

    let mut spiked = SpikeData::new();
    for index in 0..population.len() {
        let blifat = population[index].blifat_mut();
        if !blifat.potential.is_finite() {
            return Err(CoreError::NonFinitePotential {
                population: population_uid,
                neuron: index,
            });
        }
        if fire_check(blifat) {
            spiked.push(index as u32);
        }
    }

    if spiked.is_empty() {
        return Ok(None);
    }
    debug!(population = %population_uid, step, spikes = spiked.len(), "population spiked");
    let message = SpikeMessage {
        header: MessageHeader {
            sender_uid: population_uid,
            send_time: step,
        },
        neuron_indexes: spiked,
    };
    endpoint.lock().send_message(message.clone());
    Ok(Some(message))
}

fn decay_neuron(neuron: &mut BlifatNeuron) {
    neuron.n_time_steps_since_last_firing = neuron.n_time_steps_since_last_firing.saturating_add(1);
    neuron.dynamic_threshold *= neuron.threshold_decay;
    neuron.postsynaptic_trace *= neuron.postsynaptic_trace_decay;
    neuron.inhibitory_conductance *= neuron.inhibitory_conductance_decay;

    let burst_fires = neuron.bursting_phase > 0 && {
        neuron.bursting_phase -= 1;
        neuron.bursting_phase == 0
    };
    if burst_fires {
        neuron.potential = neuron.potential * neuron.potential_decay + neuron.reflexive_weight;
    } else {
        neuron.potential *= neuron.potential_decay;
    }
}

fn apply_impact<N: BlifatDynamics>(neuron: &mut N, impact: &SynapticImpact, is_forcing: bool) {
    let value = f64::from(impact.impact_value);
    match impact.synapse_kind {
        SynapseOutputKind::Excitatory => {
            neuron.blifat_mut().potential += value;
            if is_forcing {
                neuron.mark_forced();
            }
        }
        SynapseOutputKind::InhibitoryCurrent => neuron.blifat_mut().potential -= value,
        SynapseOutputKind::InhibitoryConductance => {
            neuron.blifat_mut().inhibitory_conductance += value;
        }
        SynapseOutputKind::Dopamine => neuron.blifat_mut().dopamine_value += value,
        SynapseOutputKind::Blocking => {
            neuron.blifat_mut().total_blocking_period = impact.impact_value.max(0.0) as u64;
        }
    }
}

fn fire_check(neuron: &mut BlifatNeuron) -> bool {
    if neuron.inhibitory_conductance < 1.0 {
        neuron.potential -=
            (neuron.potential - neuron.reversal_inhibitory_potential) * neuron.inhibitory_conductance;
    } else {
        neuron.potential = neuron.reversal_inhibitory_potential;
    }

    let mut spiked = false;
    if neuron.n_time_steps_since_last_firing > neuron.absolute_refractory_period
        && neuron.potential >= neuron.activation_threshold + neuron.dynamic_threshold
    {
        neuron.dynamic_threshold += neuron.threshold_increment;
        neuron.postsynaptic_trace += neuron.postsynaptic_trace_increment;
        neuron.potential = neuron.potential_reset_value;
        neuron.bursting_phase = neuron.bursting_period;
        neuron.n_time_steps_since_last_firing = 0;
        spiked = true;
    }

    if neuron.potential < neuron.min_potential {
        neuron.potential = neuron.min_potential;
    }
    spiked
}

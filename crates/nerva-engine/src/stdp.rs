// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synaptic-resource STDP plasticity.
//!
//! Runs after the membrane kernel of a plasticity-enabled population, over
//! the STDP projections targeting it. Three passes per step:
//! 1. spiking neurons: ISI bookkeeping, unconditional drain, Hebbian update
//! 2. renormalization of the free resource pool
//! 3. dopamine-driven resource and stability changes
//!
//! A synapse's weight is always a function of its resource:
//! `w = w_min + (w_max - w_min) * r / ((w_max - w_min) + r)`, `r >= 0`.

use tracing::trace;

use nerva_core::messaging::{SpikeData, SpikeMessage, Step};
use nerva_core::neuron::{IsiStatus, ResourceStdpBlifatNeuron};
use nerva_core::population::Population;
use nerva_core::projection::Projection;
use nerva_core::synapse::{ResourceStdpDeltaSynapse, SynapticResourceRule};

/// (projection slot, synapse position) pairs addressing the synapses that
/// target one neuron across the working projections.
type SynapseRefs = Vec<(usize, usize)>;

/// Weight of a synapse with the given rule state.
pub fn weight_from_resource(rule: &SynapticResourceRule) -> f32 {
    let resource = rule.synaptic_resource.max(0.0);
    let span = rule.w_max - rule.w_min;
    rule.w_min + span * resource / (span + resource)
}

/// Apply the full plasticity pass for one step of `population`.
///
/// `projections` are the STDP projections whose postsynaptic population is
/// `population`; `spike_message` is the message the membrane kernel emitted
/// on this step, if any.
pub fn process_resource_stdp(
    population: &mut Population<ResourceStdpBlifatNeuron>,
    projections: &mut [&mut Projection<ResourceStdpDeltaSynapse>],
    spike_message: Option<&SpikeMessage>,
    step: Step,
) {
    let no_spikes = SpikeData::new();
    let spikes = spike_message
        .map(|message| &message.neuron_indexes)
        .unwrap_or(&no_spikes);

    process_spiking_neurons(population, projections, spikes, step);
    renormalize_resource(population, projections, step);
    process_dopamine(population, projections, step);
}

fn connected_synapses(
    projections: &mut [&mut Projection<ResourceStdpDeltaSynapse>],
    neuron_index: u32,
) -> SynapseRefs {
    let mut refs = SynapseRefs::new();
    for (slot, projection) in projections.iter_mut().enumerate() {
        for &position in projection.synapses_to(neuron_index) {
            refs.push((slot, position));
        }
    }
    refs
}

fn recalculate_weights(
    projections: &mut [&mut Projection<ResourceStdpDeltaSynapse>],
    refs: &SynapseRefs,
) {
    for &(slot, position) in refs {
        if projections[slot].is_locked() {
            continue;
        }
        let synapse = &mut projections[slot][position].params;
        synapse.weight = weight_from_resource(&synapse.rule);
    }
}

/// ISI bookkeeping and Hebbian resource updates for the neurons that spiked
/// on this step.
fn process_spiking_neurons(
    population: &mut Population<ResourceStdpBlifatNeuron>,
    projections: &mut [&mut Projection<ResourceStdpDeltaSynapse>],
    spikes: &SpikeData,
    step: Step,
) {
    for &spiked_index in spikes {
        let refs = connected_synapses(projections, spiked_index);
        let Some(neuron) = population.get_mut(spiked_index as usize) else {
            continue;
        };

        neuron.update_isi(step);
        if neuron.isi_status == IsiStatus::PeriodStarted {
            neuron.stability -= neuron.stability_change_at_isi;
        }

        // A new spiking sequence rearms the one-shot Hebbian updates.
        if neuron.isi_status != IsiStatus::PeriodContinued {
            for &(slot, position) in &refs {
                projections[slot][position].params.rule.had_hebbian_update = false;
            }
        }

        if neuron.isi_status != IsiStatus::Forced {
            let window_start = neuron.first_isi_spike.saturating_sub(neuron.isi_max);
            for &(slot, position) in &refs {
                let rule = &mut projections[slot][position].params.rule;
                rule.synaptic_resource -= rule.d_u;
                neuron.free_synaptic_resource += f64::from(rule.d_u);

                // Hebbian update: once per sequence, for synapses that
                // carried a spike within the current ISI window.
                let spiked_in_window =
                    rule.last_spike_step >= window_start && rule.last_spike_step <= step;
                if spiked_in_window && !rule.had_hebbian_update {
                    let delta = neuron.d_h * 2f64.powf(-neuron.stability).min(1.0);
                    rule.synaptic_resource += delta as f32;
                    neuron.free_synaptic_resource -= delta;
                    rule.had_hebbian_update = true;
                }
            }
        }

        recalculate_weights(projections, &refs);
    }
}

/// Redistribute a neuron's free resource over its synapses once its ISI
/// period is over (or the neuron is being forced).
fn renormalize_resource(
    population: &mut Population<ResourceStdpBlifatNeuron>,
    projections: &mut [&mut Projection<ResourceStdpDeltaSynapse>],
    step: Step,
) {
    for neuron_index in 0..population.len() {
        let neuron = &mut population[neuron_index];
        let in_isi_period = step.saturating_sub(neuron.last_step) <= neuron.isi_max
            && neuron.isi_status != IsiStatus::Forced;
        if in_isi_period {
            continue;
        }
        if neuron.free_synaptic_resource.abs() < neuron.synaptic_resource_threshold {
            continue;
        }

        let refs = connected_synapses(projections, neuron_index as u32);
        let share = neuron.free_synaptic_resource
            / (refs.len() as f64 + f64::from(neuron.resource_drain_coefficient));
        trace!(neuron = neuron_index, share, "redistributing free synaptic resource");
        for &(slot, position) in &refs {
            projections[slot][position].params.rule.synaptic_resource += share as f32;
        }
        neuron.free_synaptic_resource = 0.0;
        recalculate_weights(projections, &refs);
    }
}

/// Dopamine-driven resource and stability changes.
///
/// A punishment (negative dopamine) on a forced neuron does nothing; the
/// forced-or-punishment branch lowers stability, the unforced reward raises
/// it in proportion to how close the period length came to `isi_max`.
fn process_dopamine(
    population: &mut Population<ResourceStdpBlifatNeuron>,
    projections: &mut [&mut Projection<ResourceStdpDeltaSynapse>],
    step: Step,
) {
    for neuron_index in 0..population.len() {
        let neuron = &mut population[neuron_index];
        let dopamine = neuron.blifat.dopamine_value;
        let applies =
            dopamine > 0.0 || (dopamine < 0.0 && neuron.isi_status != IsiStatus::Forced);
        if !applies {
            continue;
        }

        let refs = connected_synapses(projections, neuron_index as u32);
        let stability_gain = 2f64.powf(-neuron.stability).min(1.0);
        for &(slot, position) in &refs {
            let rule = &mut projections[slot][position].params.rule;
            if step.saturating_sub(rule.last_spike_step) < rule.dopamine_plasticity_period {
                let delta = dopamine * stability_gain / 1000.0;
                rule.synaptic_resource += delta as f32;
                neuron.free_synaptic_resource -= delta;
            }
        }

        if neuron.is_being_forced || dopamine < 0.0 {
            neuron.stability -= dopamine * neuron.stability_change_parameter;
        } else {
            let offset = step as f64 - neuron.first_isi_spike as f64 - neuron.isi_max as f64;
            neuron.stability += neuron.stability_change_parameter
                * dopamine
                * (2.0 - offset.abs() / neuron.isi_max as f64).max(-1.0);
        }

        recalculate_weights(projections, &refs);
    }
}

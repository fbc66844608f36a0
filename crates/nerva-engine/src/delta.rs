// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Delta synapse projection kernel.
//!
//! Incoming presynaptic spikes are turned into synaptic impacts scheduled on
//! a per-projection future-impact queue. An impact for a spike processed on
//! step `s` through a synapse with delay `d` lands under key `s + d - 1`:
//! the queue entry is sent on that step and consumed by the postsynaptic
//! population on the next one, so the spike-to-impact latency is exactly `d`
//! steps.

use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::trace;

use nerva_core::endpoint::MessageEndpoint;
use nerva_core::error::{CoreError, Result};
use nerva_core::messaging::{
    MessageHeader, SpikeMessage, Step, SynapticImpact, SynapticImpactMessage,
};
use nerva_core::projection::Projection;
use nerva_core::synapse::SynapseType;

/// Impacts a projection has scheduled for future steps, keyed by the step
/// on which their message is sent.
pub type FutureImpacts = AHashMap<Step, SynapticImpactMessage>;

/// Run one step for a projection: consume queued spike messages, schedule
/// their impacts, and send the message whose step has come, if any.
///
/// The endpoint mutex is held only while unloading inputs and sending the
/// result, never while the index is queried or the queue is updated.
pub fn process_delta_projection<S: SynapseType>(
    projection: &mut Projection<S>,
    endpoint: &Mutex<MessageEndpoint>,
    future_impacts: &mut FutureImpacts,
    step: Step,
) -> Result<()> {
    let projection_uid = projection.uid();
    let messages = endpoint
        .lock()
        .unload_messages::<SpikeMessage>(projection_uid)
        .unwrap_or_default();

    let presynaptic_uid = projection.presynaptic_uid();
    let postsynaptic_uid = projection.postsynaptic_uid();
    let plasticity_sources = S::plasticity_sources(projection.shared()).to_vec();

    for message in &messages {
        // Spikes of the plasticity-driving populations are bookkeeping
        // input for the STDP rule, not presynaptic activity.
        let sender = message.header.sender_uid;
        if sender != presynaptic_uid && plasticity_sources.contains(&sender) {
            continue;
        }
        for &neuron_index in &message.neuron_indexes {
            let positions = projection.synapses_from(neuron_index).to_vec();
            for position in positions {
                let synapse = &mut projection[position];
                synapse.params.on_spike(step);

                let delay = synapse.params.delay();
                if delay == 0 {
                    return Err(CoreError::ZeroDelay {
                        projection: projection_uid,
                        synapse: position,
                    });
                }
                let impact = SynapticImpact {
                    connection_index: position,
                    impact_value: synapse.params.weight(),
                    synapse_kind: synapse.params.output_kind(),
                    presynaptic_neuron_index: synapse.source,
                    postsynaptic_neuron_index: synapse.target,
                };

                // The presynaptic message was emitted on the previous tick.
                let send_step = step + Step::from(delay) - 1;
                future_impacts
                    .entry(send_step)
                    .or_insert_with(|| SynapticImpactMessage {
                        header: MessageHeader {
                            sender_uid: projection_uid,
                            send_time: send_step,
                        },
                        presynaptic_population_uid: presynaptic_uid,
                        postsynaptic_population_uid: postsynaptic_uid,
                        is_forcing: S::IS_FORCING,
                        impacts: Vec::new(),
                    })
                    .impacts
                    .push(impact);
            }
        }
    }

    if let Some(message) = future_impacts.remove(&step) {
        trace!(projection = %projection_uid, step, impacts = message.impacts.len(), "sending scheduled impacts");
        endpoint.lock().send_message(message);
    }
    Ok(())
}

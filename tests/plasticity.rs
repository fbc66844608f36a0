// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synaptic-resource plasticity: the weight law and an end-to-end Hebbian
//! update driven through a backend, with the learning toggle.

use nerva::core::synapse::SynapseType;
use nerva::engine::{weight_from_resource, SingleThreadedBackend};
use nerva::prelude::*;

#[test]
fn weight_follows_the_resource_law() {
    let mut rule = SynapticResourceRule {
        synaptic_resource: 1.0,
        w_min: 0.0,
        w_max: 1.0,
        ..Default::default()
    };
    assert_eq!(weight_from_resource(&rule), 0.5);

    rule.synaptic_resource = 0.0;
    assert_eq!(weight_from_resource(&rule), 0.0);

    rule.synaptic_resource = 1.0e8;
    assert!((weight_from_resource(&rule) - rule.w_max).abs() < 1.0e-6);
}

fn run_learning_network(learning: bool) -> (f32, f32, bool) {
    let mut backend = SingleThreadedBackend::new();

    let population = Population::<ResourceStdpBlifatNeuron>::new(
        |_| {
            Some(ResourceStdpBlifatNeuron {
                isi_max: 3,
                ..Default::default()
            })
        },
        1,
    );
    let population_uid = population.uid();

    let mut projection = Projection::<ResourceStdpDeltaSynapse>::from_generator(
        Uid::random(),
        Uid::nil(),
        population_uid,
        |_| {
            Some(Synapse {
                params: ResourceStdpDeltaSynapse::new(1.0, 1, SynapseOutputKind::Excitatory),
                source: 0,
                target: 0,
            })
        },
        1,
    );
    projection.shared_mut().stdp_populations.push(population_uid);
    let projection_uid = projection.uid();

    backend.load_populations(vec![population.into()]).unwrap();
    backend.load_projections(vec![projection.into()]).unwrap();
    backend.init().unwrap();
    if !learning {
        backend.stop_learning();
    }

    let endpoint = backend.message_bus().create_endpoint();
    let channel_uid = Uid::random();
    backend.subscribe::<SpikeMessage>(projection_uid, &[channel_uid]);

    for step in 0..4 {
        if step == 0 {
            endpoint.send_message(SpikeMessage {
                header: MessageHeader {
                    sender_uid: channel_uid,
                    send_time: step,
                },
                neuron_indexes: vec![0],
            });
        }
        backend.step().unwrap();
    }

    let projections = backend.projections();
    let projection = ResourceStdpDeltaSynapse::projection_ref(projections[0]).unwrap();
    let params = &projection.synapses()[0].params;
    (
        params.rule.synaptic_resource,
        params.weight,
        params.rule.had_hebbian_update,
    )
}

#[test]
fn postsynaptic_spike_triggers_a_hebbian_update() {
    // The synapse carries the input spike on step 0, the neuron fires on
    // step 1, and the plasticity pass moves one unit of resource onto the
    // synapse: weight = (1 - 0) * 1 / ((1 - 0) + 1) = 0.5.
    let (resource, weight, updated) = run_learning_network(true);
    assert_eq!(resource, 1.0);
    assert_eq!(weight, 0.5);
    assert!(updated);
}

#[test]
fn learning_toggle_freezes_the_synapse() {
    let (resource, weight, updated) = run_learning_network(false);
    assert_eq!(resource, 0.0);
    assert_eq!(weight, 1.0);
    assert!(!updated);
}

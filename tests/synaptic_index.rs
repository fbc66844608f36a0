// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Index freshness over a fully connected projection after a targeted
//! disconnect.

use nerva::framework::connectors::all_to_all;
use nerva::framework::Network;
use nerva::prelude::*;

#[test]
fn index_stays_consistent_after_disconnect() {
    let presynaptic = Uid::random();
    let postsynaptic = Uid::random();
    let mut projection = all_to_all::<DeltaSynapse, _>(presynaptic, postsynaptic, 9, 11, |_, _| {
        DeltaSynapse::excitatory(1.0, 1)
    });
    assert_eq!(projection.len(), 99);

    let removed = projection.disconnect_if(|synapse| synapse.source == 0 && synapse.target == 1);
    assert_eq!(removed, 1);
    assert_eq!(projection.len(), 98);

    assert_eq!(projection.synapses_from(0).len(), 10);
    assert_eq!(projection.synapses_to(1).len(), 8);

    // Every other neuron keeps its full fan-in/fan-out.
    for source in 1..9 {
        assert_eq!(projection.synapses_from(source).len(), 11);
    }
    for target in (0..11).filter(|&target| target != 1) {
        assert_eq!(projection.synapses_to(target).len(), 9);
    }
}

#[test]
fn projection_round_trips_through_a_network() {
    let presynaptic = Uid::random();
    let postsynaptic = Uid::random();
    let projection = all_to_all::<DeltaSynapse, _>(presynaptic, postsynaptic, 2, 3, |source, target| {
        DeltaSynapse::excitatory((source * 3 + target) as f32, 1)
    });
    let projection_uid = projection.uid();
    let synapses = projection.synapses().to_vec();

    let mut network = Network::new();
    network.add_projection(projection).unwrap();

    let read_back = network
        .get_projection::<DeltaSynapse>(projection_uid)
        .unwrap();
    assert_eq!(read_back.uid(), projection_uid);
    assert_eq!(read_back.presynaptic_uid(), presynaptic);
    assert_eq!(read_back.postsynaptic_uid(), postsynaptic);
    assert_eq!(read_back.synapses(), synapses.as_slice());
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Winner-take-all handlers, as functors and wired onto the bus.

use nerva::framework::{GroupWtaRandomHandler, KWtaRandomHandler, SpikeMessageHandler};
use nerva::prelude::*;

fn spike_message(sender: Uid, step: Step, indexes: Vec<u32>) -> SpikeMessage {
    SpikeMessage {
        header: MessageHeader {
            sender_uid: sender,
            send_time: step,
        },
        neuron_indexes: indexes,
    }
}

#[test]
fn group_wta_selects_the_densest_group() {
    // Groups [0..3), [3..6), [6..9), [9..): the first one gets two spikes.
    let mut handler = GroupWtaRandomHandler::new(vec![3, 6, 9], 1, 0);
    let winners = handler.handle(vec![spike_message(Uid::random(), 0, vec![1, 2, 3, 6])]);

    assert_eq!(winners.len(), 2);
    let mut sorted = winners.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![1, 2]);
}

#[test]
fn kwta_keeps_at_most_k_spikes() {
    let mut handler = KWtaRandomHandler::new(3, 11);
    let winners = handler.handle(vec![spike_message(Uid::random(), 0, (0..10).collect())]);
    assert_eq!(winners.len(), 3);

    let mut deduped = winners.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(deduped.len(), 3);
}

#[test]
fn handler_relays_winners_over_the_bus() {
    let bus = MessageBus::new();
    let population = Uid::random();
    let handler_uid = Uid::random();
    let downstream = Uid::random();

    let mut functor = GroupWtaRandomHandler::new(vec![3, 6, 9], 1, 0);
    let mut handler = SpikeMessageHandler::new(
        Box::new(move |messages| functor.handle(messages)),
        bus.create_endpoint(),
        handler_uid,
    );
    handler.subscribe(&[population]);

    let mut receiver = bus.create_endpoint();
    receiver.subscribe::<SpikeMessage>(downstream, &[handler_uid]);

    let sender = bus.create_endpoint();
    sender.send_message(spike_message(population, 3, vec![1, 2, 3, 6]));
    bus.route_messages();

    handler.update(3);
    bus.route_messages();
    receiver.receive_all_messages(None);

    let relayed = receiver.unload_messages::<SpikeMessage>(downstream).unwrap();
    assert_eq!(relayed.len(), 1);
    assert_eq!(relayed[0].header.sender_uid, handler_uid);
    let mut winners = relayed[0].neuron_indexes.clone();
    winners.sort_unstable();
    assert_eq!(winners, vec![1, 2]);
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fan-out delivery: one sender, two subscribers, one bystander.

use nerva::prelude::*;

#[test]
fn fan_out_reaches_every_subscriber_once() {
    let bus = MessageBus::new();
    let mut endpoint_a = bus.create_endpoint();
    let mut endpoint_b = bus.create_endpoint();
    let mut endpoint_c = bus.create_endpoint();

    let sender_a = Uid::random();
    let receiver_a = Uid::random();
    let receiver_b = Uid::random();
    let receiver_c = Uid::random();
    let unrelated_sender = Uid::random();

    // B and C listen to A; A itself only listens to an unrelated sender.
    endpoint_a.subscribe::<SpikeMessage>(receiver_a, &[unrelated_sender]);
    endpoint_b.subscribe::<SpikeMessage>(receiver_b, &[sender_a]);
    endpoint_c.subscribe::<SpikeMessage>(receiver_c, &[sender_a]);

    endpoint_a.send_message(SpikeMessage {
        header: MessageHeader {
            sender_uid: sender_a,
            send_time: 0,
        },
        neuron_indexes: vec![1, 2, 3],
    });
    bus.route_messages();

    endpoint_a.receive_all_messages(None);
    endpoint_b.receive_all_messages(None);
    endpoint_c.receive_all_messages(None);

    let received_b = endpoint_b
        .unload_messages::<SpikeMessage>(receiver_b)
        .unwrap();
    assert_eq!(received_b.len(), 1);
    assert_eq!(received_b[0].neuron_indexes, vec![1, 2, 3]);
    assert_eq!(received_b[0].header.sender_uid, sender_a);

    let received_c = endpoint_c
        .unload_messages::<SpikeMessage>(receiver_c)
        .unwrap();
    assert_eq!(received_c.len(), 1);
    assert_eq!(received_c[0].neuron_indexes, vec![1, 2, 3]);

    // The sender's own inbox stays empty.
    assert!(endpoint_a
        .unload_messages::<SpikeMessage>(receiver_a)
        .unwrap()
        .is_empty());
}

#[test]
fn subscribe_unsubscribe_round_trip() {
    let bus = MessageBus::new();
    let mut endpoint = bus.create_endpoint();
    let receiver = Uid::random();
    let senders = [Uid::random(), Uid::random()];

    assert_eq!(endpoint.subscription_count(), 0);
    endpoint.subscribe::<SpikeMessage>(receiver, &senders);
    assert_eq!(endpoint.subscription_count(), 1);

    assert!(endpoint.unsubscribe::<SpikeMessage>(receiver));
    assert_eq!(endpoint.subscription_count(), 0);
    assert!(!endpoint.has_subscription::<SpikeMessage>(receiver));
}

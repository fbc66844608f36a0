// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fan-out message router.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use crate::endpoint::{MessageEndpoint, SharedQueue};
use crate::messaging::Message;

type WeakQueue = Weak<Mutex<Vec<Message>>>;

/// Moves messages from endpoint outboxes to every live endpoint's inbox.
///
/// The bus holds only weak references to the endpoint queues: an endpoint
/// dropped between routing passes is pruned on the next pass without
/// invalidating the bus. Every endpoint receives every routed message; the
/// sender filter is applied by the endpoint when it dispatches its inbox
/// into subscriptions.
#[derive(Default)]
pub struct MessageBus {
    endpoints: Mutex<Vec<(WeakQueue, WeakQueue)>>,
    to_route: Mutex<Vec<Message>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new endpoint bound to this bus.
    pub fn create_endpoint(&self) -> MessageEndpoint {
        let outbox: SharedQueue = Arc::new(Mutex::new(Vec::new()));
        let inbox: SharedQueue = Arc::new(Mutex::new(Vec::new()));
        let endpoint = MessageEndpoint::new(outbox, inbox);
        self.endpoints.lock().push((
            Arc::downgrade(endpoint.outbox()),
            Arc::downgrade(endpoint.inbox()),
        ));
        endpoint
    }

    /// Number of endpoints still alive at the last routing pass.
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.lock().len()
    }

    /// One routing pass: prune dead endpoints, drain every outbox, then
    /// append one copy of each pending message to every live inbox.
    ///
    /// Returns the total number of (message, recipient) deliveries.
    pub fn route_messages(&self) -> usize {
        self.collect_outboxes();

        let pending = std::mem::take(&mut *self.to_route.lock());
        if pending.is_empty() {
            return 0;
        }

        let endpoints = self.endpoints.lock();
        let mut deliveries = 0;
        for (_, inbox) in endpoints.iter() {
            // An endpoint dropped between the snapshot and the fan-out is
            // skipped here and pruned on the next pass.
            let Some(inbox) = inbox.upgrade() else {
                continue;
            };
            inbox.lock().extend(pending.iter().cloned());
            deliveries += pending.len();
        }
        trace!(messages = pending.len(), deliveries, "routing pass");
        deliveries
    }

    fn collect_outboxes(&self) {
        let mut endpoints = self.endpoints.lock();
        let mut to_route = self.to_route.lock();
        endpoints.retain(|(outbox, _)| match outbox.upgrade() {
            Some(queue) => {
                to_route.append(&mut queue.lock());
                true
            }
            None => false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{MessageHeader, SpikeMessage};
    use crate::uid::Uid;

    fn spike(sender: Uid, indexes: Vec<u32>) -> SpikeMessage {
        SpikeMessage {
            header: MessageHeader {
                sender_uid: sender,
                send_time: 0,
            },
            neuron_indexes: indexes,
        }
    }

    #[test]
    fn test_fan_out_to_subscribers() {
        let bus = MessageBus::new();
        let endpoint_a = bus.create_endpoint();
        let mut endpoint_b = bus.create_endpoint();
        let mut endpoint_c = bus.create_endpoint();

        let sender_a = Uid::random();
        let receiver_b = Uid::random();
        let receiver_c = Uid::random();
        endpoint_b.subscribe::<SpikeMessage>(receiver_b, &[sender_a]);
        endpoint_c.subscribe::<SpikeMessage>(receiver_c, &[sender_a]);

        endpoint_a.send_message(spike(sender_a, vec![1, 2, 3]));

        // One message, three live endpoints.
        assert_eq!(bus.route_messages(), 3);

        endpoint_b.receive_all_messages(None);
        endpoint_c.receive_all_messages(None);
        let received_b = endpoint_b
            .unload_messages::<SpikeMessage>(receiver_b)
            .unwrap();
        let received_c = endpoint_c
            .unload_messages::<SpikeMessage>(receiver_c)
            .unwrap();
        assert_eq!(received_b.len(), 1);
        assert_eq!(received_c.len(), 1);
        assert_eq!(received_b[0].neuron_indexes, vec![1, 2, 3]);
        assert_eq!(received_b[0].header.sender_uid, sender_a);
        assert_eq!(received_c[0].neuron_indexes, vec![1, 2, 3]);
    }

    #[test]
    fn test_send_order_is_preserved_per_endpoint() {
        let bus = MessageBus::new();
        let sender_endpoint = bus.create_endpoint();
        let mut receiver_endpoint = bus.create_endpoint();
        let sender = Uid::random();
        let receiver = Uid::random();
        receiver_endpoint.subscribe::<SpikeMessage>(receiver, &[sender]);

        for index in 0..4 {
            sender_endpoint.send_message(spike(sender, vec![index]));
        }
        bus.route_messages();
        receiver_endpoint.receive_all_messages(None);

        let received = receiver_endpoint
            .unload_messages::<SpikeMessage>(receiver)
            .unwrap();
        let order: Vec<u32> = received
            .iter()
            .map(|message| message.neuron_indexes[0])
            .collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_dropped_endpoint_is_pruned() {
        let bus = MessageBus::new();
        let endpoint_a = bus.create_endpoint();
        let endpoint_b = bus.create_endpoint();
        assert_eq!(bus.endpoint_count(), 2);

        drop(endpoint_b);
        endpoint_a.send_message(spike(Uid::random(), vec![1]));
        // Only the surviving endpoint receives a copy.
        assert_eq!(bus.route_messages(), 1);
        assert_eq!(bus.endpoint_count(), 1);
    }

    #[test]
    fn test_route_without_messages() {
        let bus = MessageBus::new();
        let _endpoint = bus.create_endpoint();
        assert_eq!(bus.route_messages(), 0);
    }
}

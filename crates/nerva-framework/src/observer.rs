// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Message observers for monitoring runs.

use nerva_core::endpoint::MessageEndpoint;
use nerva_core::messaging::{SpikeMessage, SynapticImpactMessage};
use nerva_core::subscription::SubscribableMessage;
use nerva_core::uid::Uid;

/// Consumes the messages an observer drained on one update.
pub type MessageProcessor<M> = Box<dyn FnMut(Vec<M>) + Send>;

/// A read-only bus participant handing every message of one type from the
/// observed senders to a processor callback.
pub struct MessageObserver<M: SubscribableMessage> {
    uid: Uid,
    endpoint: MessageEndpoint,
    processor: MessageProcessor<M>,
}

impl<M: SubscribableMessage> MessageObserver<M> {
    pub fn new(endpoint: MessageEndpoint, processor: MessageProcessor<M>, uid: Uid) -> Self {
        Self {
            uid,
            endpoint,
            processor,
        }
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn subscribe(&mut self, senders: &[Uid]) {
        self.endpoint.subscribe::<M>(self.uid, senders);
    }

    /// Drain the observed messages and hand them to the processor. Runs the
    /// processor only when something arrived.
    pub fn update(&mut self) {
        self.endpoint.receive_all_messages(None);
        let messages = self
            .endpoint
            .unload_messages::<M>(self.uid)
            .unwrap_or_default();
        if !messages.is_empty() {
            (self.processor)(messages);
        }
    }
}

/// Closed variant over the observable message types.
pub enum ObserverVariant {
    Spike(MessageObserver<SpikeMessage>),
    SynapticImpact(MessageObserver<SynapticImpactMessage>),
}

impl ObserverVariant {
    pub fn update(&mut self) {
        match self {
            ObserverVariant::Spike(observer) => observer.update(),
            ObserverVariant::SynapticImpact(observer) => observer.update(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use nerva_core::bus::MessageBus;
    use nerva_core::messaging::MessageHeader;

    #[test]
    fn test_observer_sees_only_observed_senders() {
        let bus = MessageBus::new();
        let observed = Uid::random();
        let ignored = Uid::random();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut observer = MessageObserver::<SpikeMessage>::new(
            bus.create_endpoint(),
            Box::new(move |messages| {
                sink.lock().unwrap().extend(messages);
            }),
            Uid::random(),
        );
        observer.subscribe(&[observed]);

        let sender = bus.create_endpoint();
        for (uid, index) in [(observed, 1u32), (ignored, 2)] {
            sender.send_message(SpikeMessage {
                header: MessageHeader {
                    sender_uid: uid,
                    send_time: 0,
                },
                neuron_indexes: vec![index],
            });
        }
        bus.route_messages();
        observer.update();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].neuron_indexes, vec![1]);
    }
}

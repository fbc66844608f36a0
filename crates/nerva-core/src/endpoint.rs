// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-participant send/receive handle into the message bus.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::{CoreError, Result};
use crate::messaging::Message;
use crate::subscription::{SubscribableMessage, Subscription, SubscriptionVariant};
use crate::uid::Uid;

/// Queue shared between an endpoint and the bus. The endpoint holds the
/// strong reference; the bus keeps a weak one, so dropping the endpoint
/// simply stops it from participating on the next routing pass.
pub(crate) type SharedQueue = Arc<Mutex<Vec<Message>>>;

/// Subscription container key: (message type index, receiver UID).
type SubscriptionKey = (usize, Uid);

/// A participant handle on the message bus.
///
/// Sending enqueues on the outbox; the bus moves outbox contents to every
/// live endpoint's inbox during a routing pass. Receiving drains the inbox
/// and dispatches each message to the matching subscriptions.
pub struct MessageEndpoint {
    subscriptions: BTreeMap<SubscriptionKey, SubscriptionVariant>,
    outbox: SharedQueue,
    inbox: SharedQueue,
}

impl MessageEndpoint {
    pub(crate) fn new(outbox: SharedQueue, inbox: SharedQueue) -> Self {
        Self {
            subscriptions: BTreeMap::new(),
            outbox,
            inbox,
        }
    }

    /// Subscribe `receiver` to messages of type `M` from `senders`.
    ///
    /// If the subscription already exists, the sender sets are merged.
    /// Returns the number of newly added sender UIDs.
    pub fn subscribe<M: SubscribableMessage>(&mut self, receiver: Uid, senders: &[Uid]) -> usize {
        use std::collections::btree_map::Entry;

        match self.subscriptions.entry((M::TYPE_INDEX, receiver)) {
            Entry::Occupied(mut entry) => match M::subscription_mut(entry.get_mut()) {
                Some(subscription) => subscription.add_senders(senders),
                // The key carries the type index, so the variant always matches.
                None => 0,
            },
            Entry::Vacant(entry) => {
                let subscription = Subscription::<M>::new(receiver, senders);
                let added = subscription.senders().len();
                entry.insert(M::wrap(subscription));
                added
            }
        }
    }

    /// Remove the subscription of `receiver` to messages of type `M`.
    /// Returns whether it existed.
    pub fn unsubscribe<M: SubscribableMessage>(&mut self, receiver: Uid) -> bool {
        self.subscriptions
            .remove(&(M::TYPE_INDEX, receiver))
            .is_some()
    }

    /// Remove every subscription whose receiver is `receiver`.
    pub fn remove_receiver(&mut self, receiver: Uid) {
        self.subscriptions
            .retain(|(_, subscribed), _| *subscribed != receiver);
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn has_subscription<M: SubscribableMessage>(&self, receiver: Uid) -> bool {
        self.subscriptions.contains_key(&(M::TYPE_INDEX, receiver))
    }

    /// Senders of the subscription `(M, receiver)`, if it exists.
    pub fn subscription_senders<M: SubscribableMessage>(&self, receiver: Uid) -> Option<Vec<Uid>> {
        self.subscriptions
            .get(&(M::TYPE_INDEX, receiver))
            .and_then(M::subscription_ref)
            .map(|subscription| subscription.senders().iter().copied().collect())
    }

    /// Enqueue a message on the outbox. Messages with empty payloads are
    /// silently dropped.
    pub fn send_message(&self, message: impl Into<Message>) {
        let message = message.into();
        if message.is_empty() {
            trace!(sender = %message.sender_uid(), "dropping empty message");
            return;
        }
        self.outbox.lock().push(message);
    }

    /// Take the next inbox message, dispatch it to the matching
    /// subscriptions and return it. `None` when the inbox is empty.
    pub fn receive_message(&mut self) -> Option<Message> {
        let message = {
            let mut inbox = self.inbox.lock();
            if inbox.is_empty() {
                return None;
            }
            inbox.remove(0)
        };
        self.dispatch(&message);
        Some(message)
    }

    /// Drain the inbox into the subscriptions. Returns the number of
    /// messages processed. With `sleep` set, the endpoint keeps polling the
    /// inbox with that pause until a drain comes up empty.
    pub fn receive_all_messages(&mut self, sleep: Option<Duration>) -> usize {
        let mut count = 0;
        loop {
            let drained = std::mem::take(&mut *self.inbox.lock());
            if drained.is_empty() {
                break;
            }
            for message in &drained {
                self.dispatch(message);
            }
            count += drained.len();
            if let Some(pause) = sleep {
                std::thread::sleep(pause);
            }
        }
        count
    }

    /// Read and clear the messages of type `M` received for `receiver`.
    pub fn unload_messages<M: SubscribableMessage>(&mut self, receiver: Uid) -> Result<Vec<M>> {
        self.subscriptions
            .get_mut(&(M::TYPE_INDEX, receiver))
            .and_then(M::subscription_mut)
            .map(Subscription::take_messages)
            .ok_or(CoreError::SubscriptionNotFound {
                receiver,
                type_index: M::TYPE_INDEX,
            })
    }

    fn dispatch(&mut self, message: &Message) {
        for subscription in self.subscriptions.values_mut() {
            subscription.deliver(message);
        }
    }

    pub(crate) fn outbox(&self) -> &SharedQueue {
        &self.outbox
    }

    pub(crate) fn inbox(&self) -> &SharedQueue {
        &self.inbox
    }
}

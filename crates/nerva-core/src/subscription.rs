// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sender-filtered message inboxes.

use ahash::AHashSet;

use crate::messaging::{Message, MessageKind, SpikeMessage, SynapticImpactMessage};
use crate::uid::Uid;

/// A receiver's subscription to messages of one type from a set of senders.
///
/// Invariant: every message in the inbox was sent by one of `senders`.
#[derive(Debug, Clone)]
pub struct Subscription<M> {
    receiver: Uid,
    senders: AHashSet<Uid>,
    messages: Vec<M>,
}

impl<M: MessageKind> Subscription<M> {
    pub fn new(receiver: Uid, senders: &[Uid]) -> Self {
        Self {
            receiver,
            senders: senders.iter().copied().collect(),
            messages: Vec::new(),
        }
    }

    pub fn receiver(&self) -> Uid {
        self.receiver
    }

    pub fn senders(&self) -> &AHashSet<Uid> {
        &self.senders
    }

    /// Add a sender. Returns 1 if it was not subscribed yet, 0 otherwise.
    pub fn add_sender(&mut self, uid: Uid) -> usize {
        usize::from(self.senders.insert(uid))
    }

    /// Merge a set of senders. Returns the number of newly added UIDs.
    pub fn add_senders(&mut self, uids: &[Uid]) -> usize {
        uids.iter().map(|uid| self.add_sender(*uid)).sum()
    }

    /// Remove a sender. Returns 1 if it was subscribed, 0 otherwise.
    pub fn remove_sender(&mut self, uid: &Uid) -> usize {
        usize::from(self.senders.remove(uid))
    }

    pub fn has_sender(&self, uid: &Uid) -> bool {
        self.senders.contains(uid)
    }

    /// Append a message to the inbox. The caller checks the sender filter.
    pub fn add_message(&mut self, message: M) {
        debug_assert!(self.has_sender(&message.sender_uid()));
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[M] {
        &self.messages
    }

    /// Drain the inbox.
    pub fn take_messages(&mut self) -> Vec<M> {
        std::mem::take(&mut self.messages)
    }
}

/// Closed variant over subscription types, ordered like the message list.
#[derive(Debug, Clone)]
pub enum SubscriptionVariant {
    Spike(Subscription<SpikeMessage>),
    SynapticImpact(Subscription<SynapticImpactMessage>),
}

impl SubscriptionVariant {
    pub fn receiver(&self) -> Uid {
        match self {
            SubscriptionVariant::Spike(subscription) => subscription.receiver(),
            SubscriptionVariant::SynapticImpact(subscription) => subscription.receiver(),
        }
    }

    pub fn type_index(&self) -> usize {
        match self {
            SubscriptionVariant::Spike(_) => SpikeMessage::TYPE_INDEX,
            SubscriptionVariant::SynapticImpact(_) => SynapticImpactMessage::TYPE_INDEX,
        }
    }

    /// Deliver a routed message if this subscription matches its type and
    /// accepts its sender. Returns whether the message was taken.
    pub fn deliver(&mut self, message: &Message) -> bool {
        match (self, message) {
            (SubscriptionVariant::Spike(subscription), Message::Spike(spike))
                if subscription.has_sender(&spike.header.sender_uid) =>
            {
                subscription.add_message(spike.clone());
                true
            }
            (SubscriptionVariant::SynapticImpact(subscription), Message::SynapticImpact(impact))
                if subscription.has_sender(&impact.header.sender_uid) =>
            {
                subscription.add_message(impact.clone());
                true
            }
            _ => false,
        }
    }
}

/// Checked access to the subscription variant for a concrete message type.
pub trait SubscribableMessage: MessageKind {
    fn wrap(subscription: Subscription<Self>) -> SubscriptionVariant;

    fn subscription_ref(variant: &SubscriptionVariant) -> Option<&Subscription<Self>>;

    fn subscription_mut(variant: &mut SubscriptionVariant) -> Option<&mut Subscription<Self>>;
}

impl SubscribableMessage for SpikeMessage {
    fn wrap(subscription: Subscription<Self>) -> SubscriptionVariant {
        SubscriptionVariant::Spike(subscription)
    }

    fn subscription_ref(variant: &SubscriptionVariant) -> Option<&Subscription<Self>> {
        match variant {
            SubscriptionVariant::Spike(subscription) => Some(subscription),
            _ => None,
        }
    }

    fn subscription_mut(variant: &mut SubscriptionVariant) -> Option<&mut Subscription<Self>> {
        match variant {
            SubscriptionVariant::Spike(subscription) => Some(subscription),
            _ => None,
        }
    }
}

impl SubscribableMessage for SynapticImpactMessage {
    fn wrap(subscription: Subscription<Self>) -> SubscriptionVariant {
        SubscriptionVariant::SynapticImpact(subscription)
    }

    fn subscription_ref(variant: &SubscriptionVariant) -> Option<&Subscription<Self>> {
        match variant {
            SubscriptionVariant::SynapticImpact(subscription) => Some(subscription),
            _ => None,
        }
    }

    fn subscription_mut(variant: &mut SubscriptionVariant) -> Option<&mut Subscription<Self>> {
        match variant {
            SubscriptionVariant::SynapticImpact(subscription) => Some(subscription),
            _ => None,
        }
    }
}

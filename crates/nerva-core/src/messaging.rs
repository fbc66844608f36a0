// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Message types exchanged over the bus.
//!
//! The list of message types is closed. The position of a type in [`Message`]
//! is its *type index*: subscription keys and any external format that stores
//! message type tags rely on this order, so variants must never be reordered.

use serde::{Deserialize, Serialize};

use crate::uid::Uid;

/// Discrete scheduler step number.
pub type Step = u64;

/// Index of a neuron inside its population.
pub type SpikeIndex = u32;

/// Ordered list of spiked neuron indexes.
pub type SpikeData = Vec<SpikeIndex>;

/// Number of message types in the closed list.
pub const MESSAGE_TYPE_COUNT: usize = 2;

/// Common message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// UID of the entity that sent the message.
    pub sender_uid: Uid,
    /// Step on which the message was sent.
    pub send_time: Step,
}

/// Message carrying the indexes of neurons that spiked on one step.
///
/// Empty spike messages are never put on the bus; [`crate::MessageEndpoint`]
/// drops them at the send call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpikeMessage {
    pub header: MessageHeader,
    pub neuron_indexes: SpikeData,
}

/// How a synaptic impact acts on the receiving neuron.
///
/// Variant ordinals are the stable synapse-output registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynapseOutputKind {
    /// Adds the impact value to the membrane potential.
    Excitatory = 0,
    /// Subtracts the impact value from the membrane potential.
    InhibitoryCurrent = 1,
    /// Adds the impact value to the inhibitory conductance.
    InhibitoryConductance = 2,
    /// Accumulates into the neuron's dopamine value.
    Dopamine = 3,
    /// Blocks all neuron activity for the given number of steps.
    Blocking = 4,
}

/// Synaptic impact value and the connection it travelled through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynapticImpact {
    /// Position of the synapse inside its projection.
    pub connection_index: usize,
    /// Value used to change the target neuron state.
    pub impact_value: f32,
    /// How the value acts on the target neuron.
    pub synapse_kind: SynapseOutputKind,
    /// Index of the presynaptic neuron connected to the synapse.
    pub presynaptic_neuron_index: u32,
    /// Index of the postsynaptic neuron connected to the synapse.
    pub postsynaptic_neuron_index: u32,
}

/// Message carrying the impacts a projection delivers on one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynapticImpactMessage {
    pub header: MessageHeader,
    /// Population that sends spikes to the projection. Nil for projections
    /// driven by an external channel.
    pub presynaptic_population_uid: Uid,
    /// Population that receives the impacts.
    pub postsynaptic_population_uid: Uid,
    /// `true` if the impacts come from a projection without plasticity.
    /// Plasticity-enabled neurons treat forced excitatory input specially
    /// during training.
    pub is_forcing: bool,
    pub impacts: Vec<SynapticImpact>,
}

/// Closed variant over every message type the bus can route. The variant
/// ordinal is the type index used by subscription keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    Spike(SpikeMessage),
    SynapticImpact(SynapticImpactMessage),
}

impl Message {
    pub fn header(&self) -> &MessageHeader {
        match self {
            Message::Spike(message) => &message.header,
            Message::SynapticImpact(message) => &message.header,
        }
    }

    pub fn sender_uid(&self) -> Uid {
        self.header().sender_uid
    }

    /// Position of this message's type in the closed type list.
    pub fn type_index(&self) -> usize {
        match self {
            Message::Spike(_) => SpikeMessage::TYPE_INDEX,
            Message::SynapticImpact(_) => SynapticImpactMessage::TYPE_INDEX,
        }
    }

    /// `true` when the message carries no payload and must not be routed.
    pub fn is_empty(&self) -> bool {
        match self {
            Message::Spike(message) => message.neuron_indexes.is_empty(),
            Message::SynapticImpact(message) => message.impacts.is_empty(),
        }
    }
}

impl From<SpikeMessage> for Message {
    fn from(message: SpikeMessage) -> Self {
        Message::Spike(message)
    }
}

impl From<SynapticImpactMessage> for Message {
    fn from(message: SynapticImpactMessage) -> Self {
        Message::SynapticImpact(message)
    }
}

/// Maps a concrete message type to its position in the closed message list
/// and extracts it back out of a routed [`Message`].
pub trait MessageKind: Clone + Into<Message> {
    const TYPE_INDEX: usize;

    fn sender_uid(&self) -> Uid;

    fn from_message(message: Message) -> Option<Self>;

    fn from_message_ref(message: &Message) -> Option<&Self>;
}

impl MessageKind for SpikeMessage {
    const TYPE_INDEX: usize = 0;

    fn sender_uid(&self) -> Uid {
        self.header.sender_uid
    }

    fn from_message(message: Message) -> Option<Self> {
        match message {
            Message::Spike(message) => Some(message),
            _ => None,
        }
    }

    fn from_message_ref(message: &Message) -> Option<&Self> {
        match message {
            Message::Spike(message) => Some(message),
            _ => None,
        }
    }
}

impl MessageKind for SynapticImpactMessage {
    const TYPE_INDEX: usize = 1;

    fn sender_uid(&self) -> Uid {
        self.header.sender_uid
    }

    fn from_message(message: Message) -> Option<Self> {
        match message {
            Message::SynapticImpact(message) => Some(message),
            _ => None,
        }
    }

    fn from_message_ref(message: &Message) -> Option<&Self> {
        match message {
            Message::SynapticImpact(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_indexes_are_stable() {
        let spike = Message::from(SpikeMessage {
            header: MessageHeader {
                sender_uid: Uid::random(),
                send_time: 0,
            },
            neuron_indexes: vec![1],
        });
        let impact = Message::from(SynapticImpactMessage {
            header: MessageHeader {
                sender_uid: Uid::random(),
                send_time: 0,
            },
            presynaptic_population_uid: Uid::nil(),
            postsynaptic_population_uid: Uid::nil(),
            is_forcing: false,
            impacts: vec![],
        });

        assert_eq!(spike.type_index(), 0);
        assert_eq!(impact.type_index(), 1);
        assert_eq!(spike.type_index(), SpikeMessage::TYPE_INDEX);
        assert_eq!(impact.type_index(), SynapticImpactMessage::TYPE_INDEX);
    }

    #[test]
    fn test_empty_detection() {
        let header = MessageHeader {
            sender_uid: Uid::random(),
            send_time: 3,
        };
        assert!(Message::from(SpikeMessage {
            header,
            neuron_indexes: vec![],
        })
        .is_empty());
        assert!(!Message::from(SpikeMessage {
            header,
            neuron_indexes: vec![7],
        })
        .is_empty());
    }

    #[test]
    fn test_extraction() {
        let message = Message::from(SpikeMessage {
            header: MessageHeader {
                sender_uid: Uid::random(),
                send_time: 1,
            },
            neuron_indexes: vec![1, 2],
        });

        assert!(SynapticImpactMessage::from_message_ref(&message).is_none());
        let spike = SpikeMessage::from_message(message).unwrap();
        assert_eq!(spike.neuron_indexes, vec![1, 2]);
    }
}

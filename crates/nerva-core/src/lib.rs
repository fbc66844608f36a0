// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # NERVA Core
//!
//! Network data model and messaging layer of the NERVA spiking neural
//! network runtime:
//! - **Identities**: 128-bit entity UIDs and per-entity tag maps
//! - **Messaging**: spike and synaptic-impact messages, the fan-out bus and
//!   per-participant endpoints with sender-filtered subscriptions
//! - **Data model**: populations of neuron parameter records and projections
//!   of synapses with a multi-key synaptic index
//! - **Backend contract**: the step-scheduler surface implemented by the
//!   execution backends
//!
//! All type lists (message kinds, neuron kinds, synapse kinds) are closed
//! enums; variant ordinals are stable and double as the type indexes used by
//! subscription keys and external formats.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod backend;
pub mod bus;
pub mod endpoint;
pub mod error;
pub mod messaging;
pub mod neuron;
pub mod population;
pub mod projection;
pub mod subscription;
pub mod synapse;
pub mod synaptic_index;
pub mod tags;
pub mod uid;

pub use backend::{Backend, RunFlag};
pub use bus::MessageBus;
pub use endpoint::MessageEndpoint;
pub use error::{CoreError, Result};
pub use messaging::{
    Message, MessageHeader, MessageKind, SpikeData, SpikeIndex, SpikeMessage, Step,
    SynapseOutputKind, SynapticImpact, SynapticImpactMessage,
};
pub use neuron::{
    BlifatDynamics, BlifatNeuron, IsiStatus, NeuronKind, NeuronType, ResourceStdpBlifatNeuron,
};
pub use population::{Population, PopulationVariant};
pub use projection::{Projection, ProjectionVariant, Synapse};
pub use subscription::{SubscribableMessage, Subscription, SubscriptionVariant};
pub use synapse::{
    DeltaSynapse, ResourceStdpDeltaSynapse, StdpSharedParams, SynapseKind, SynapseType,
    SynapticResourceRule,
};
pub use synaptic_index::SynapticIndex;
pub use tags::{IoType, TagMap, TagValue, IO_TYPE_TAG};
pub use uid::{SequentialUidGenerator, Uid};

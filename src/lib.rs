// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # NERVA - Discrete-time spiking neural network simulation core
//!
//! NERVA advances a network of neuron populations and synaptic projections
//! one step at a time, routing spike and synaptic-impact messages between
//! them through a publish/subscribe bus.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! nerva = "0.1"  # Umbrella crate
//! ```
//!
//! ## Components
//!
//! - [`core`]: identities, tags, messaging, bus, populations, projections
//! - [`engine`]: BLIFAT/delta/STDP kernels and the CPU backends
//! - [`framework`]: network/model composition, IO channels, handlers
//!
//! ## Usage Example
//!
//! ```no_run
//! use nerva::engine::SingleThreadedBackend;
//! use nerva::prelude::*;
//!
//! // One excitatory neuron driven by an external channel.
//! let population = Population::<BlifatNeuron>::new(|_| Some(BlifatNeuron::default()), 1);
//! let projection = Projection::<DeltaSynapse>::from_generator(
//!     Uid::random(),
//!     Uid::nil(),
//!     population.uid(),
//!     |_| Some(Synapse { params: DeltaSynapse::excitatory(1.0, 1), source: 0, target: 0 }),
//!     1,
//! );
//!
//! let mut backend = SingleThreadedBackend::new();
//! backend.load_populations(vec![population.into()]).unwrap();
//! backend.load_projections(vec![projection.into()]).unwrap();
//! backend.init().unwrap();
//! backend.start_while(&mut |step| step < 100).unwrap();
//! ```

pub use nerva_core as core;
pub use nerva_engine as engine;
pub use nerva_framework as framework;

/// The types needed by most simulations.
pub mod prelude {
    pub use nerva_core::backend::{Backend, RunFlag};
    pub use nerva_core::bus::MessageBus;
    pub use nerva_core::endpoint::MessageEndpoint;
    pub use nerva_core::error::{CoreError, Result};
    pub use nerva_core::messaging::{
        Message, MessageHeader, SpikeData, SpikeMessage, Step, SynapseOutputKind, SynapticImpact,
        SynapticImpactMessage,
    };
    pub use nerva_core::neuron::{BlifatNeuron, NeuronKind, ResourceStdpBlifatNeuron};
    pub use nerva_core::population::{Population, PopulationVariant};
    pub use nerva_core::projection::{Projection, ProjectionVariant, Synapse};
    pub use nerva_core::synapse::{
        DeltaSynapse, ResourceStdpDeltaSynapse, SynapseKind, SynapticResourceRule,
    };
    pub use nerva_core::tags::{IoType, TagMap, IO_TYPE_TAG};
    pub use nerva_core::uid::Uid;
}

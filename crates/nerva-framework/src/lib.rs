// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # NERVA Framework
//!
//! Modelling layer over the simulation core:
//! - **Network**: UID-indexed containers of populations and projections
//! - **Model**: a network plus its input/output channel wiring
//! - **ModelLoader / ModelExecutor**: compose a model with a backend and
//!   drive it, pumping channels, handlers and observers around every tick
//! - **IO**: generator-driven input channels and buffered output channels
//! - **Handlers**: winner-take-all and union spike processors living on the
//!   bus like any other participant

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod connectors;
pub mod handlers;
pub mod io;
pub mod model;
pub mod model_executor;
pub mod model_loader;
pub mod network;
pub mod observer;

pub use handlers::{GroupWtaRandomHandler, KWtaRandomHandler, SpikeMessageHandler, SpikeUnionHandler};
pub use io::{InputChannel, OutputChannel, SpikeGenerator};
pub use model::Model;
pub use model_executor::ModelExecutor;
pub use model_loader::{InputGeneratorMap, ModelLoader};
pub use network::Network;
pub use observer::{MessageObserver, ObserverVariant};

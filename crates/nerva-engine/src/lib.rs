// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # NERVA Engine
//!
//! Execution layer of the NERVA runtime:
//! - **Kernels**: BLIFAT membrane dynamics, delta synapse propagation with
//!   future-impact scheduling, and the synaptic-resource STDP rule
//! - **Backends**: single-threaded and multi-threaded CPU step schedulers
//!   implementing the three-phase tick
//!   (route → populations → route → projections → route); the
//!   multi-threaded backend fans its phases out with Rayon
//!
//! Kernels touch only their own population or projection state; the only
//! shared resource inside a phase is the backend's endpoint, guarded by a
//! mutex around `send`/`unload`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod backend;
pub mod blifat;
pub mod delta;
pub mod stdp;

pub use backend::{MultiThreadedBackend, SingleThreadedBackend};
pub use blifat::process_blifat_population;
pub use delta::{process_delta_projection, FutureImpacts};
pub use stdp::{process_resource_stdp, weight_from_resource};

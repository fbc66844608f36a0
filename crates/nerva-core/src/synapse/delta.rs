// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Delta synapse: one weighted impulse after a fixed integer delay.

use serde::{Deserialize, Serialize};

use crate::messaging::SynapseOutputKind;

/// Parameter record of a delta synapse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaSynapse {
    pub weight: f32,
    /// Transmission delay in steps, at least 1.
    pub delay: u32,
    pub output_kind: SynapseOutputKind,
}

impl DeltaSynapse {
    pub fn new(weight: f32, delay: u32, output_kind: SynapseOutputKind) -> Self {
        Self {
            weight,
            delay,
            output_kind,
        }
    }

    pub fn excitatory(weight: f32, delay: u32) -> Self {
        Self::new(weight, delay, SynapseOutputKind::Excitatory)
    }
}

impl Default for DeltaSynapse {
    fn default() -> Self {
        Self {
            weight: 0.0,
            delay: 1,
            output_kind: SynapseOutputKind::Excitatory,
        }
    }
}

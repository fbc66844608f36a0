// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! BLIFAT neuron extended with synaptic-resource plasticity state.

use serde::{Deserialize, Serialize};

use super::blifat::{BlifatDynamics, BlifatNeuron};
use crate::messaging::Step;

/// Where a neuron stands in its inter-spike-interval sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IsiStatus {
    /// The neuron has not spiked yet, or its last period expired.
    NotInIsi,
    /// The current spike opened a new period.
    PeriodStarted,
    /// The current spike continues a running period.
    PeriodContinued,
    /// The neuron is being driven by forcing input; spikes do not advance
    /// the unforced sequence.
    Forced,
}

/// BLIFAT parameter record plus the per-neuron state of the
/// synaptic-resource STDP rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceStdpBlifatNeuron {
    /// Membrane dynamics state.
    pub blifat: BlifatNeuron,
    /// Resource not currently bound to any synapse.
    pub free_synaptic_resource: f64,
    /// The free pool is redistributed once its magnitude reaches this value.
    pub synaptic_resource_threshold: f64,
    /// Share of the free pool that leaks out during redistribution.
    pub resource_drain_coefficient: u32,
    /// Resistance of this neuron's synapses to further change.
    pub stability: f64,
    pub stability_change_parameter: f64,
    /// Stability drop applied when a new ISI period starts.
    pub stability_change_at_isi: f64,
    /// Maximum inter-spike interval that still continues a period.
    pub isi_max: u64,
    /// Hebbian resource increment applied at full stability gain.
    pub d_h: f64,
    pub isi_status: IsiStatus,
    /// Step of the spike that opened the current period.
    pub first_isi_spike: Step,
    /// Step of the last unforced spike processed by the rule.
    pub last_step: Step,
    pub last_unforced_spike: Step,
    /// Set while a forcing excitatory impact is acting during this step.
    pub is_being_forced: bool,
}

impl Default for ResourceStdpBlifatNeuron {
    fn default() -> Self {
        Self {
            blifat: BlifatNeuron::default(),
            free_synaptic_resource: 0.0,
            synaptic_resource_threshold: f64::INFINITY,
            resource_drain_coefficient: 0,
            stability: 0.0,
            stability_change_parameter: 0.0,
            stability_change_at_isi: 0.0,
            isi_max: 1,
            d_h: 1.0,
            isi_status: IsiStatus::NotInIsi,
            first_isi_spike: 0,
            last_step: 0,
            last_unforced_spike: 0,
            is_being_forced: false,
        }
    }
}

impl ResourceStdpBlifatNeuron {
    /// Advance the ISI state machine for a spike observed on `step`.
    pub fn update_isi(&mut self, step: Step) {
        if self.is_being_forced {
            self.isi_status = IsiStatus::Forced;
            // A forced spike does not advance the unforced sequence.
            return;
        }

        match self.isi_status {
            IsiStatus::Forced | IsiStatus::NotInIsi => self.begin_period(step),
            IsiStatus::PeriodStarted => {
                if step.saturating_sub(self.last_step) < self.isi_max {
                    self.isi_status = IsiStatus::PeriodContinued;
                } else {
                    self.begin_period(step);
                }
            }
            IsiStatus::PeriodContinued => {
                if step.saturating_sub(self.last_step) >= self.isi_max
                    || self.blifat.dopamine_value != 0.0
                {
                    self.begin_period(step);
                }
            }
        }
        self.last_step = step;
    }

    fn begin_period(&mut self, step: Step) {
        self.isi_status = IsiStatus::PeriodStarted;
        self.first_isi_spike = step;
    }
}

impl BlifatDynamics for ResourceStdpBlifatNeuron {
    fn blifat(&self) -> &BlifatNeuron {
        &self.blifat
    }

    fn blifat_mut(&mut self) -> &mut BlifatNeuron {
        &mut self.blifat
    }

    fn begin_step(&mut self) {
        self.blifat.dopamine_value = 0.0;
        self.is_being_forced = false;
    }

    fn mark_forced(&mut self) {
        self.is_being_forced = true;
    }
}

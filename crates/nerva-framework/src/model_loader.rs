// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Composes a model with a backend.

use ahash::AHashMap;
use tracing::debug;

use nerva_core::backend::Backend;
use nerva_core::error::{CoreError, Result};
use nerva_core::messaging::SpikeMessage;
use nerva_core::tags::{IoType, IO_TYPE_TAG};
use nerva_core::uid::Uid;

use crate::io::{InputChannel, OutputChannel, SpikeGenerator};
use crate::model::Model;

/// Spike generators for the model's input channels, keyed by channel UID.
pub type InputGeneratorMap = AHashMap<Uid, SpikeGenerator>;

/// Builds the channel endpoints of a model, wires their subscriptions, and
/// loads the network into the backend.
pub struct ModelLoader<B: Backend> {
    pub(crate) backend: B,
    pub(crate) input_channels: Vec<InputChannel>,
    pub(crate) output_channels: Vec<OutputChannel>,
}

impl<B: Backend> ModelLoader<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            input_channels: Vec::new(),
            output_channels: Vec::new(),
        }
    }

    /// Load `model` into the backend:
    /// - every input channel gets a fresh endpoint and its generator; the
    ///   target projections subscribe to the channel and are tagged
    ///   `io_type = input`,
    /// - every output channel gets an endpoint subscribed to its source
    ///   populations, which are tagged `io_type = output`,
    /// - populations and projections are loaded and the backend is
    ///   initialized.
    ///
    /// A registered input channel without a generator in `input_generators`
    /// is a [`CoreError::ChannelNotFound`].
    pub fn load(&mut self, model: &mut Model, mut input_generators: InputGeneratorMap) -> Result<()> {
        debug!("loading model");

        let inputs: Vec<(Uid, Vec<Uid>)> = model
            .input_channels()
            .iter()
            .map(|(channel, projections)| (*channel, projections.clone()))
            .collect();
        for (channel_uid, projection_uids) in inputs {
            let generator = input_generators
                .remove(&channel_uid)
                .ok_or(CoreError::ChannelNotFound(channel_uid))?;
            let endpoint = self.backend.message_bus().create_endpoint();
            self.input_channels
                .push(InputChannel::new(channel_uid, endpoint, generator));

            for projection_uid in projection_uids {
                debug!(projection = %projection_uid, channel = %channel_uid, "wiring input channel");
                self.backend
                    .subscribe::<SpikeMessage>(projection_uid, &[channel_uid]);
                model
                    .network_mut()
                    .projection_mut(projection_uid)?
                    .tags_mut()
                    .set(IO_TYPE_TAG, IoType::Input);
            }
        }

        let outputs: Vec<(Uid, Vec<Uid>)> = model
            .output_channels()
            .iter()
            .map(|(channel, populations)| (*channel, populations.clone()))
            .collect();
        for (channel_uid, population_uids) in outputs {
            let mut endpoint = self.backend.message_bus().create_endpoint();
            endpoint.subscribe::<SpikeMessage>(channel_uid, &population_uids);
            self.output_channels
                .push(OutputChannel::new(channel_uid, endpoint));

            for population_uid in population_uids {
                debug!(population = %population_uid, channel = %channel_uid, "wiring output channel");
                model
                    .network_mut()
                    .population_mut(population_uid)?
                    .tags_mut()
                    .set(IO_TYPE_TAG, IoType::Output);
            }
        }

        self.backend
            .load_populations(model.network().populations().to_vec())?;
        self.backend
            .load_projections(model.network().projections().to_vec())?;
        self.backend.init()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn input_channel(&mut self, uid: Uid) -> Result<&mut InputChannel> {
        self.input_channels
            .iter_mut()
            .find(|channel| channel.uid() == uid)
            .ok_or(CoreError::ChannelNotFound(uid))
    }

    pub fn output_channel(&mut self, uid: Uid) -> Result<&mut OutputChannel> {
        self.output_channels
            .iter_mut()
            .find(|channel| channel.uid() == uid)
            .ok_or(CoreError::ChannelNotFound(uid))
    }

    pub fn inputs_mut(&mut self) -> &mut [InputChannel] {
        &mut self.input_channels
    }

    pub fn outputs_mut(&mut self) -> &mut [OutputChannel] {
        &mut self.output_channels
    }
}

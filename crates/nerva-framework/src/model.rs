// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! A network plus its channel wiring.

use ahash::AHashMap;

use nerva_core::error::{CoreError, Result};
use nerva_core::uid::Uid;

use crate::network::Network;

/// A [`Network`] together with the bookkeeping of which input channels feed
/// which projections and which populations feed which output channels.
#[derive(Debug, Clone, Default)]
pub struct Model {
    network: Network,
    /// input channel UID -> target projection UIDs
    input_channels: AHashMap<Uid, Vec<Uid>>,
    /// output channel UID -> source population UIDs
    output_channels: AHashMap<Uid, Vec<Uid>>,
}

impl Model {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            input_channels: AHashMap::new(),
            output_channels: AHashMap::new(),
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Associate an input channel with a projection it will drive. The
    /// projection must exist in the network.
    pub fn add_input_channel(&mut self, channel_uid: Uid, projection_uid: Uid) -> Result<()> {
        if !self.network.contains_projection(projection_uid) {
            return Err(CoreError::ProjectionNotFound(projection_uid));
        }
        self.input_channels
            .entry(channel_uid)
            .or_default()
            .push(projection_uid);
        Ok(())
    }

    /// Associate an output channel with a population it will observe. The
    /// population must exist in the network.
    pub fn add_output_channel(&mut self, channel_uid: Uid, population_uid: Uid) -> Result<()> {
        if !self.network.contains_population(population_uid) {
            return Err(CoreError::PopulationNotFound(population_uid));
        }
        self.output_channels
            .entry(channel_uid)
            .or_default()
            .push(population_uid);
        Ok(())
    }

    pub fn input_channels(&self) -> &AHashMap<Uid, Vec<Uid>> {
        &self.input_channels
    }

    pub fn output_channels(&self) -> &AHashMap<Uid, Vec<Uid>> {
        &self.output_channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nerva_core::neuron::BlifatNeuron;
    use nerva_core::population::Population;
    use nerva_core::projection::Projection;
    use nerva_core::synapse::DeltaSynapse;

    #[test]
    fn test_channel_registration_validates_targets() {
        let mut network = Network::new();
        let population = Population::<BlifatNeuron>::new(|_| Some(BlifatNeuron::default()), 1);
        let population_uid = population.uid();
        network.add_population(population).unwrap();
        let projection = Projection::<DeltaSynapse>::new(Uid::nil(), population_uid);
        let projection_uid = projection.uid();
        network.add_projection(projection).unwrap();

        let mut model = Model::new(network);
        let in_channel = Uid::random();
        let out_channel = Uid::random();

        model.add_input_channel(in_channel, projection_uid).unwrap();
        model
            .add_output_channel(out_channel, population_uid)
            .unwrap();
        assert_eq!(model.input_channels()[&in_channel], vec![projection_uid]);
        assert_eq!(model.output_channels()[&out_channel], vec![population_uid]);

        let error = model
            .add_input_channel(in_channel, Uid::random())
            .unwrap_err();
        assert!(matches!(error, CoreError::ProjectionNotFound(_)));
        let error = model
            .add_output_channel(out_channel, Uid::random())
            .unwrap_err();
        assert!(matches!(error, CoreError::PopulationNotFound(_)));
    }

    #[test]
    fn test_one_channel_can_feed_many_projections() {
        let mut network = Network::new();
        let population = Population::<BlifatNeuron>::new(|_| Some(BlifatNeuron::default()), 1);
        let population_uid = population.uid();
        network.add_population(population).unwrap();

        let first = Projection::<DeltaSynapse>::new(Uid::nil(), population_uid);
        let second = Projection::<DeltaSynapse>::new(Uid::nil(), population_uid);
        let (first_uid, second_uid) = (first.uid(), second.uid());
        network.add_projection(first).unwrap();
        network.add_projection(second).unwrap();

        let mut model = Model::new(network);
        let channel = Uid::random();
        model.add_input_channel(channel, first_uid).unwrap();
        model.add_input_channel(channel, second_uid).unwrap();
        assert_eq!(model.input_channels()[&channel].len(), 2);
    }
}

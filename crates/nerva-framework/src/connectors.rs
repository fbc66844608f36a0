// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Builders for common population and projection shapes.

use nerva_core::population::Population;
use nerva_core::projection::{Projection, Synapse};
use nerva_core::synapse::SynapseType;
use nerva_core::uid::Uid;

/// Population of `count` copies of a template parameter record.
pub fn uniform_population<N: Clone>(template: N, count: usize) -> Population<N> {
    Population::new(|_| Some(template.clone()), count)
}

/// Projection connecting every presynaptic neuron to every postsynaptic
/// neuron. `params` is called with each (source, target) pair.
pub fn all_to_all<S, F>(
    presynaptic_uid: Uid,
    postsynaptic_uid: Uid,
    presynaptic_size: u32,
    postsynaptic_size: u32,
    mut params: F,
) -> Projection<S>
where
    S: SynapseType,
    F: FnMut(u32, u32) -> S,
{
    Projection::from_generator(
        Uid::random(),
        presynaptic_uid,
        postsynaptic_uid,
        |index| {
            let source = index as u32 / postsynaptic_size;
            let target = index as u32 % postsynaptic_size;
            Some(Synapse {
                params: params(source, target),
                source,
                target,
            })
        },
        (presynaptic_size * postsynaptic_size) as usize,
    )
}

/// Projection connecting neuron `n` to neuron `n`.
pub fn one_to_one<S, F>(
    presynaptic_uid: Uid,
    postsynaptic_uid: Uid,
    size: u32,
    mut params: F,
) -> Projection<S>
where
    S: SynapseType,
    F: FnMut(u32) -> S,
{
    Projection::from_generator(
        Uid::random(),
        presynaptic_uid,
        postsynaptic_uid,
        |index| {
            let neuron = index as u32;
            Some(Synapse {
                params: params(neuron),
                source: neuron,
                target: neuron,
            })
        },
        size as usize,
    )
}

/// Projection built from explicit (source, target, parameters) triples.
pub fn from_pairs<S: SynapseType>(
    presynaptic_uid: Uid,
    postsynaptic_uid: Uid,
    connections: &[(u32, u32, S)],
) -> Projection<S> {
    Projection::from_generator(
        Uid::random(),
        presynaptic_uid,
        postsynaptic_uid,
        |index| {
            let (source, target, params) = &connections[index];
            Some(Synapse {
                params: params.clone(),
                source: *source,
                target: *target,
            })
        },
        connections.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nerva_core::neuron::BlifatNeuron;
    use nerva_core::synapse::DeltaSynapse;

    #[test]
    fn test_all_to_all_covers_every_pair() {
        let mut projection = all_to_all::<DeltaSynapse, _>(
            Uid::random(),
            Uid::random(),
            3,
            5,
            |_, _| DeltaSynapse::excitatory(1.0, 1),
        );
        assert_eq!(projection.len(), 15);
        for source in 0..3 {
            assert_eq!(projection.synapses_from(source).len(), 5);
        }
        for target in 0..5 {
            assert_eq!(projection.synapses_to(target).len(), 3);
        }
    }

    #[test]
    fn test_one_to_one_diagonal() {
        let mut projection = one_to_one::<DeltaSynapse, _>(
            Uid::random(),
            Uid::random(),
            4,
            |neuron| DeltaSynapse::excitatory(neuron as f32, 1),
        );
        assert_eq!(projection.len(), 4);
        let positions = projection.synapses_from(2).to_vec();
        assert_eq!(positions.len(), 1);
        assert_eq!(projection[positions[0]].target, 2);
        assert_eq!(projection[positions[0]].params.weight, 2.0);
    }

    #[test]
    fn test_from_pairs() {
        let projection = from_pairs(
            Uid::random(),
            Uid::random(),
            &[
                (0, 1, DeltaSynapse::excitatory(0.5, 1)),
                (1, 0, DeltaSynapse::excitatory(0.25, 2)),
            ],
        );
        assert_eq!(projection.len(), 2);
        assert_eq!(projection[1].params.delay, 2);
    }

    #[test]
    fn test_uniform_population() {
        let template = BlifatNeuron {
            activation_threshold: 2.0,
            ..Default::default()
        };
        let population = uniform_population(template, 6);
        assert_eq!(population.len(), 6);
        assert_eq!(population[5].activation_threshold, 2.0);
    }
}

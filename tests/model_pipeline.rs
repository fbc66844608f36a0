// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The feedback-loop network driven through the model layer: channels come
//! from the model wiring, the executor pumps them around every tick.

use nerva::engine::SingleThreadedBackend;
use nerva::framework::{InputGeneratorMap, Model, ModelExecutor, Network};
use nerva::prelude::*;

#[test]
fn executor_reproduces_the_feedback_loop_train() {
    let mut network = Network::new();
    let population = Population::<BlifatNeuron>::new(|_| Some(BlifatNeuron::default()), 1);
    let population_uid = population.uid();
    network.add_population(population).unwrap();

    let input_projection = Projection::<DeltaSynapse>::from_generator(
        Uid::random(),
        Uid::nil(),
        population_uid,
        |_| {
            Some(Synapse {
                params: DeltaSynapse::excitatory(1.0, 1),
                source: 0,
                target: 0,
            })
        },
        1,
    );
    let input_uid = input_projection.uid();
    network.add_projection(input_projection).unwrap();

    let loop_projection = Projection::<DeltaSynapse>::from_generator(
        Uid::random(),
        population_uid,
        population_uid,
        |_| {
            Some(Synapse {
                params: DeltaSynapse::excitatory(1.0, 6),
                source: 0,
                target: 0,
            })
        },
        1,
    );
    network.add_projection(loop_projection).unwrap();

    let mut model = Model::new(network);
    let in_channel = Uid::random();
    let out_channel = Uid::random();
    model.add_input_channel(in_channel, input_uid).unwrap();
    model.add_output_channel(out_channel, population_uid).unwrap();

    let mut generators = InputGeneratorMap::new();
    generators.insert(
        in_channel,
        Box::new(|step| if step % 5 == 0 { vec![0] } else { vec![] }),
    );

    let mut executor =
        ModelExecutor::new(SingleThreadedBackend::new(), &mut model, generators).unwrap();
    executor.start_while(&mut |step| step < 20).unwrap();

    let spike_steps: Vec<Step> = executor
        .loader_mut()
        .output_channel(out_channel)
        .unwrap()
        .read_spikes_range(0, 19)
        .iter()
        .map(|message| message.header.send_time)
        .collect();
    assert_eq!(spike_steps, vec![1, 6, 7, 11, 12, 13, 16, 17, 18, 19]);

    // The loaded entities carry their channel-endpoint tags.
    let network = model.network();
    assert_eq!(
        network
            .population(population_uid)
            .unwrap()
            .tags()
            .get_io_type(IO_TYPE_TAG)
            .unwrap(),
        IoType::Output
    );
    assert_eq!(
        network
            .projection(input_uid)
            .unwrap()
            .tags()
            .get_io_type(IO_TYPE_TAG)
            .unwrap(),
        IoType::Input
    );
}

#[test]
fn stop_token_halts_an_unbounded_run() {
    let mut model = Model::new(Network::new());
    let mut executor = ModelExecutor::new(
        SingleThreadedBackend::new(),
        &mut model,
        InputGeneratorMap::new(),
    )
    .unwrap();

    let token = executor.stop_token();
    let stopper = std::thread::spawn(move || {
        while !token.is_running() {
            std::thread::yield_now();
        }
        token.stop();
    });

    executor.start().unwrap();
    stopper.join().unwrap();
    assert!(!executor.backend().is_running());
}

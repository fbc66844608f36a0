// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Drives a loaded model on its backend.

use tracing::info;

use nerva_core::backend::{Backend, RunFlag};
use nerva_core::error::Result;
use nerva_core::messaging::{SpikeMessage, Step};
use nerva_core::uid::Uid;

use crate::handlers::{SpikeHandlerFn, SpikeMessageHandler};
use crate::model::Model;
use crate::model_loader::{InputGeneratorMap, ModelLoader};
use crate::observer::{MessageObserver, MessageProcessor, ObserverVariant};

/// Runs a model: before every tick the input channels send, after every tick
/// the output channels, spike handlers and observers update.
pub struct ModelExecutor<B: Backend> {
    loader: ModelLoader<B>,
    handlers: Vec<SpikeMessageHandler>,
    observers: Vec<ObserverVariant>,
}

impl<B: Backend> ModelExecutor<B> {
    /// Load `model` into `backend` and build an executor for it.
    pub fn new(
        backend: B,
        model: &mut Model,
        input_generators: InputGeneratorMap,
    ) -> Result<Self> {
        let mut loader = ModelLoader::new(backend);
        loader.load(model, input_generators)?;
        Ok(Self {
            loader,
            handlers: Vec::new(),
            observers: Vec::new(),
        })
    }

    /// Run until [`ModelExecutor::stop_token`] fires.
    pub fn start(&mut self) -> Result<()> {
        self.start_while(&mut |_| true)
    }

    /// Run while `predicate` holds, checking it before every tick.
    pub fn start_while(&mut self, predicate: &mut dyn FnMut(Step) -> bool) -> Result<()> {
        info!("starting model execution");
        let Self {
            loader,
            handlers,
            observers,
        } = self;
        let ModelLoader {
            backend,
            input_channels,
            output_channels,
        } = loader;

        let result = backend.start_with(
            &mut |step| {
                for channel in input_channels.iter_mut() {
                    channel.send(step);
                }
                predicate(step)
            },
            &mut |step| {
                for channel in output_channels.iter_mut() {
                    channel.update();
                }
                for handler in handlers.iter_mut() {
                    handler.update(step);
                }
                for observer in observers.iter_mut() {
                    observer.update();
                }
                true
            },
        );
        info!("model execution stopped");
        result
    }

    /// Handle for stopping a running execution from another thread.
    pub fn stop_token(&self) -> RunFlag {
        self.loader.backend().run_flag().clone()
    }

    /// Register a spike handler: it reads messages from `senders` and its
    /// output is delivered to `receivers`.
    pub fn add_spike_message_handler(
        &mut self,
        function: SpikeHandlerFn,
        senders: &[Uid],
        receivers: &[Uid],
        uid: Uid,
    ) {
        let endpoint = self.loader.backend().message_bus().create_endpoint();
        let mut handler = SpikeMessageHandler::new(function, endpoint, uid);
        handler.subscribe(senders);
        for receiver in receivers {
            self.loader
                .backend_mut()
                .subscribe::<SpikeMessage>(*receiver, &[uid]);
        }
        self.handlers.push(handler);
    }

    /// Register an observer over spike messages from `senders`.
    pub fn add_spike_observer(
        &mut self,
        processor: MessageProcessor<SpikeMessage>,
        senders: &[Uid],
    ) {
        let endpoint = self.loader.backend().message_bus().create_endpoint();
        let mut observer = MessageObserver::new(endpoint, processor, Uid::random());
        observer.subscribe(senders);
        self.observers.push(ObserverVariant::Spike(observer));
    }

    pub fn start_learning(&mut self) {
        self.loader.backend_mut().start_learning();
    }

    pub fn stop_learning(&mut self) {
        self.loader.backend_mut().stop_learning();
    }

    pub fn backend(&self) -> &B {
        self.loader.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.loader.backend_mut()
    }

    pub fn loader(&self) -> &ModelLoader<B> {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut ModelLoader<B> {
        &mut self.loader
    }
}

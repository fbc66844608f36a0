// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Input and output channels.
//!
//! Channels are ordinary bus participants: an input channel owns an endpoint
//! it sends spike messages from, an output channel owns an endpoint
//! subscribed to the populations it observes.

use std::collections::BTreeSet;

use tracing::trace;

use nerva_core::endpoint::MessageEndpoint;
use nerva_core::messaging::{MessageHeader, SpikeData, SpikeIndex, SpikeMessage, Step};
use nerva_core::uid::Uid;

/// Produces the spike data an input channel sends for a step.
pub type SpikeGenerator = Box<dyn FnMut(Step) -> SpikeData + Send>;

/// Pushes externally generated spikes onto the bus before each tick.
pub struct InputChannel {
    uid: Uid,
    endpoint: MessageEndpoint,
    generator: SpikeGenerator,
}

impl InputChannel {
    pub fn new(uid: Uid, endpoint: MessageEndpoint, generator: SpikeGenerator) -> Self {
        Self {
            uid,
            endpoint,
            generator,
        }
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// Produce and send this step's spikes. Returns whether a message went
    /// out; empty spike sets send nothing.
    pub fn send(&mut self, step: Step) -> bool {
        let spikes = (self.generator)(step);
        if spikes.is_empty() {
            return false;
        }
        trace!(channel = %self.uid, step, spikes = spikes.len(), "input channel sending");
        self.endpoint.send_message(SpikeMessage {
            header: MessageHeader {
                sender_uid: self.uid,
                send_time: step,
            },
            neuron_indexes: spikes,
        });
        true
    }
}

/// Turn a pre-recorded sequence of spike sets into a generator: the set at
/// position `n` is sent on the `n`-th call. Exhausted sequences go silent.
pub fn sequence_generator(sets: Vec<SpikeData>) -> SpikeGenerator {
    let mut sets = sets.into_iter();
    Box::new(move |_| sets.next().unwrap_or_default())
}

/// Collects the spike messages of the populations it subscribes to.
pub struct OutputChannel {
    uid: Uid,
    endpoint: MessageEndpoint,
    // Kept sorted by send step; messages arrive in step order.
    buffer: Vec<SpikeMessage>,
}

impl OutputChannel {
    pub fn new(uid: Uid, endpoint: MessageEndpoint) -> Self {
        Self {
            uid,
            endpoint,
            buffer: Vec::new(),
        }
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// Pull freshly routed messages into the buffer. Returns the number of
    /// new messages.
    pub fn update(&mut self) -> usize {
        self.endpoint.receive_all_messages(None);
        let messages = self
            .endpoint
            .unload_messages::<SpikeMessage>(self.uid)
            .unwrap_or_default();
        let count = messages.len();
        self.buffer.extend(messages);
        count
    }

    /// Buffered messages, oldest first.
    pub fn messages(&self) -> &[SpikeMessage] {
        &self.buffer
    }

    /// Drain the whole buffer.
    pub fn take_messages(&mut self) -> Vec<SpikeMessage> {
        self.update();
        std::mem::take(&mut self.buffer)
    }

    /// Drain the buffered messages whose send step lies in
    /// `first_step..=final_step`. Both bounds are inclusive.
    pub fn read_spikes_range(&mut self, first_step: Step, final_step: Step) -> Vec<SpikeMessage> {
        self.update();
        let mut taken = Vec::new();
        let mut kept = Vec::with_capacity(self.buffer.len());
        for message in self.buffer.drain(..) {
            if (first_step..=final_step).contains(&message.header.send_time) {
                taken.push(message);
            } else {
                kept.push(message);
            }
        }
        self.buffer = kept;
        taken
    }
}

/// Set of spiked indexes across `messages`, ignoring indexes at or above
/// `output_size`.
pub fn to_index_set(messages: &[SpikeMessage], output_size: usize) -> BTreeSet<SpikeIndex> {
    messages
        .iter()
        .flat_map(|message| message.neuron_indexes.iter().copied())
        .filter(|&index| (index as usize) < output_size)
        .collect()
}

/// Per-neuron spike counts across `messages`, for neurons `0..output_size`.
pub fn to_spike_counts(messages: &[SpikeMessage], output_size: usize) -> Vec<usize> {
    let mut counts = vec![0usize; output_size];
    for message in messages {
        for &index in &message.neuron_indexes {
            if let Some(count) = counts.get_mut(index as usize) {
                *count += 1;
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use nerva_core::bus::MessageBus;

    fn spike(sender: Uid, step: Step, indexes: Vec<u32>) -> SpikeMessage {
        SpikeMessage {
            header: MessageHeader {
                sender_uid: sender,
                send_time: step,
            },
            neuron_indexes: indexes,
        }
    }

    #[test]
    fn test_input_channel_suppresses_empty_sets() {
        let bus = MessageBus::new();
        let channel_uid = Uid::random();
        let mut channel = InputChannel::new(
            channel_uid,
            bus.create_endpoint(),
            Box::new(|step| if step % 2 == 0 { vec![0] } else { vec![] }),
        );

        assert!(channel.send(0));
        assert!(!channel.send(1));
        // Only the non-empty message was routed.
        let mut watcher = bus.create_endpoint();
        let receiver = Uid::random();
        watcher.subscribe::<SpikeMessage>(receiver, &[channel_uid]);
        bus.route_messages();
        watcher.receive_all_messages(None);
        assert_eq!(
            watcher.unload_messages::<SpikeMessage>(receiver).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_sequence_generator_goes_silent_when_exhausted() {
        let mut generator = sequence_generator(vec![vec![1, 2], vec![], vec![3]]);
        assert_eq!(generator(0), vec![1, 2]);
        assert_eq!(generator(1), Vec::<u32>::new());
        assert_eq!(generator(2), vec![3]);
        assert_eq!(generator(3), Vec::<u32>::new());
    }

    #[test]
    fn test_output_channel_collects_and_reads_ranges() {
        let bus = MessageBus::new();
        let population = Uid::random();
        let channel_uid = Uid::random();
        let mut endpoint = bus.create_endpoint();
        endpoint.subscribe::<SpikeMessage>(channel_uid, &[population]);
        let mut channel = OutputChannel::new(channel_uid, endpoint);

        let sender = bus.create_endpoint();
        for step in [1u64, 3, 5, 8] {
            sender.send_message(spike(population, step, vec![step as u32]));
        }
        bus.route_messages();

        assert_eq!(channel.update(), 4);

        // Inclusive on both bounds.
        let range = channel.read_spikes_range(3, 5);
        let steps: Vec<Step> = range.iter().map(|m| m.header.send_time).collect();
        assert_eq!(steps, vec![3, 5]);

        // The rest stays buffered.
        let remaining: Vec<Step> = channel
            .messages()
            .iter()
            .map(|m| m.header.send_time)
            .collect();
        assert_eq!(remaining, vec![1, 8]);
    }

    #[test]
    fn test_converters() {
        let sender = Uid::random();
        let messages = vec![
            spike(sender, 0, vec![0, 2, 9]),
            spike(sender, 1, vec![2, 3]),
        ];

        let set = to_index_set(&messages, 5);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![0, 2, 3]);

        let counts = to_spike_counts(&messages, 5);
        assert_eq!(counts, vec![1, 0, 2, 1, 0]);
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Spike message handlers.
//!
//! A handler is a bus participant that reads the spike messages addressed to
//! it, maps them to a spike set, and resends that set under its own UID.
//! The winner-take-all functors use a seeded RNG so runs are reproducible.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use nerva_core::endpoint::MessageEndpoint;
use nerva_core::messaging::{MessageHeader, SpikeData, SpikeIndex, SpikeMessage, Step};
use nerva_core::uid::Uid;

/// Maps the incoming spike messages of one step to an outgoing spike set.
pub type SpikeHandlerFn = Box<dyn FnMut(Vec<SpikeMessage>) -> SpikeData + Send>;

/// Wraps a handler function with an endpoint and a UID of its own.
pub struct SpikeMessageHandler {
    uid: Uid,
    endpoint: MessageEndpoint,
    function: SpikeHandlerFn,
}

impl SpikeMessageHandler {
    pub fn new(function: SpikeHandlerFn, endpoint: MessageEndpoint, uid: Uid) -> Self {
        Self {
            uid,
            endpoint,
            function,
        }
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn subscribe(&mut self, senders: &[Uid]) {
        self.endpoint.subscribe::<SpikeMessage>(self.uid, senders);
    }

    /// Process the messages routed to this handler and resend the result.
    /// Empty results send nothing.
    pub fn update(&mut self, step: Step) {
        self.endpoint.receive_all_messages(None);
        let incoming = self
            .endpoint
            .unload_messages::<SpikeMessage>(self.uid)
            .unwrap_or_default();
        let outgoing = (self.function)(incoming);
        if outgoing.is_empty() {
            return;
        }
        self.endpoint.send_message(SpikeMessage {
            header: MessageHeader {
                sender_uid: self.uid,
                send_time: step,
            },
            neuron_indexes: outgoing,
        });
    }
}

/// Selects up to `k` random spikes out of the first incoming message.
pub struct KWtaRandomHandler {
    num_winners: usize,
    rng: StdRng,
}

impl KWtaRandomHandler {
    pub fn new(num_winners: usize, seed: u64) -> Self {
        Self {
            num_winners,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Handlers get at most one message per step; extra messages are
    /// ignored.
    pub fn handle(&mut self, mut messages: Vec<SpikeMessage>) -> SpikeData {
        let Some(message) = messages.first_mut() else {
            return SpikeData::new();
        };
        let spikes = &mut message.neuron_indexes;
        if spikes.len() <= self.num_winners {
            return spikes.clone();
        }

        let mut winners = SpikeData::with_capacity(self.num_winners);
        for drawn in 0..self.num_winners {
            let index = self.rng.gen_range(0..spikes.len() - drawn);
            winners.push(spikes[index]);
            let last_free = spikes.len() - 1 - drawn;
            spikes.swap(index, last_free);
        }
        winners
    }
}

/// Passes through the spikes of the `k` groups that spiked the most.
///
/// Groups are defined by their right borders: `[3, 6, 9]` makes the groups
/// `[0..3)`, `[3..6)`, `[6..9)` and `[9..)`. When the last winning place is
/// shared, the tied groups are shuffled with the seeded RNG.
pub struct GroupWtaRandomHandler {
    group_borders: Vec<SpikeIndex>,
    num_winners: usize,
    rng: StdRng,
}

impl GroupWtaRandomHandler {
    pub fn new(mut group_borders: Vec<SpikeIndex>, num_winners: usize, seed: u64) -> Self {
        group_borders.sort_unstable();
        Self {
            group_borders,
            num_winners,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn handle(&mut self, messages: Vec<SpikeMessage>) -> SpikeData {
        let Some(message) = messages.first() else {
            return SpikeData::new();
        };
        if self.num_winners > self.group_borders.len() {
            return message.neuron_indexes.clone();
        }
        let spikes = &message.neuron_indexes;
        if spikes.is_empty() {
            return SpikeData::new();
        }

        let mut groups: Vec<SpikeData> = vec![SpikeData::new(); self.group_borders.len() + 1];
        for &spike in spikes {
            let group = self.group_borders.partition_point(|&border| border <= spike);
            groups[group].push(spike);
        }

        // Largest groups first; the sort is stable, so ties keep group order
        // until the shuffle below.
        groups.sort_by(|left, right| right.len().cmp(&left.len()));

        let kth_len = groups[self.num_winners - 1].len();
        let tie_start = groups.partition_point(|group| group.len() > kth_len);
        let tie_end = groups.partition_point(|group| group.len() >= kth_len);
        groups[tie_start..tie_end].shuffle(&mut self.rng);

        groups
            .iter()
            .take(self.num_winners)
            .flatten()
            .copied()
            .collect()
    }
}

/// Unions the spike sets of every incoming message.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpikeUnionHandler;

impl SpikeUnionHandler {
    pub fn handle(&mut self, messages: Vec<SpikeMessage>) -> SpikeData {
        let union: BTreeSet<SpikeIndex> = messages
            .iter()
            .flat_map(|message| message.neuron_indexes.iter().copied())
            .collect();
        union.into_iter().collect()
    }
}

//! Named random streams.
//!
//! Every logical source of randomness draws from its own PCG stream, so that
//! reconfiguring one subsystem never shifts the sequence seen by another.

use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::Rng;
use rand_pcg::Pcg64;

use crate::distribution::Distribution;
use crate::error::Result;
use crate::task::TaskClass;

/// Identifier of a logical random stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamId {
    Arrival(TaskClass),
    CloudletService(TaskClass),
    CloudService(TaskClass),
    Setup,
    Selection,
}

pub const STREAM_COUNT: usize = 8;

impl StreamId {
    pub fn index(self) -> usize {
        match self {
            StreamId::Arrival(class) => class.index(),
            StreamId::CloudletService(class) => 2 + class.index(),
            StreamId::CloudService(class) => 4 + class.index(),
            StreamId::Setup => 6,
            StreamId::Selection => 7,
        }
    }
}

/// Fixed-size table of independent generators, one per [`StreamId`].
#[derive(Clone)]
pub struct RandomStreams {
    seed: u64,
    streams: [Pcg64; STREAM_COUNT],
    selected: usize,
}

impl RandomStreams {
    pub fn new(seed: u64) -> Self {
        let streams = std::array::from_fn(|index| Pcg64::new(seed as u128, index as u128));
        Self {
            seed,
            streams,
            selected: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Makes `id` the stream used by subsequent [`RandomStreams::draw`] calls.
    pub fn select_stream(&mut self, id: StreamId) {
        self.selected = id.index();
    }

    /// Uniform draw in `[0, 1)` from the selected stream.
    pub fn draw(&mut self) -> f64 {
        self.streams[self.selected].gen_range(0.0..1.0)
    }

    /// Samples `dist` using the generator of stream `id`.
    pub fn sample(&mut self, id: StreamId, dist: &Distribution) -> Result<f64> {
        dist.sample(&mut self.streams[id.index()])
    }

    pub fn gen_range<T, R>(&mut self, id: StreamId, range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        self.streams[id.index()].gen_range(range)
    }
}

//! Strategies for picking a Cloudlet server.

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

use crate::random::{RandomStreams, StreamId};
use crate::server::Server;
use crate::task::TaskClass;

/// Strategy name as it appears in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    Order,
    Cyclic,
    Equity,
    Random,
}

impl Display for SelectionStrategy {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            SelectionStrategy::Order => write!(f, "order"),
            SelectionStrategy::Cyclic => write!(f, "cyclic"),
            SelectionStrategy::Equity => write!(f, "equity"),
            SelectionStrategy::Random => write!(f, "random"),
        }
    }
}

/// Picks servers among the Cloudlet pool. Callers must make sure a matching server exists.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerSelector {
    /// First match by position.
    Order,
    /// First match after the last chosen position, wrapping around.
    Cyclic { last: Option<usize> },
    /// Idle server with the largest idle time, or the busy server whose task consumed the least service.
    Equity,
    /// Uniform choice among matches.
    Random,
}

impl ServerSelector {
    pub fn new(strategy: SelectionStrategy) -> Self {
        match strategy {
            SelectionStrategy::Order => ServerSelector::Order,
            SelectionStrategy::Cyclic => ServerSelector::Cyclic { last: None },
            SelectionStrategy::Equity => ServerSelector::Equity,
            SelectionStrategy::Random => ServerSelector::Random,
        }
    }

    pub fn strategy(&self) -> SelectionStrategy {
        match self {
            ServerSelector::Order => SelectionStrategy::Order,
            ServerSelector::Cyclic { .. } => SelectionStrategy::Cyclic,
            ServerSelector::Equity => SelectionStrategy::Equity,
            ServerSelector::Random => SelectionStrategy::Random,
        }
    }

    /// Index of the idle server that should take the next task.
    pub fn select_idle(&mut self, servers: &[Server], now: f64, streams: &mut RandomStreams) -> Option<usize> {
        self.select(servers, |server| server.is_idle(), |server| server.idle_time(now), streams)
    }

    /// Index of the server whose task of `class` should be evicted.
    pub fn select_interruptible(&mut self, servers: &[Server], class: TaskClass, now: f64,
                                streams: &mut RandomStreams) -> Option<usize> {
        self.select(servers, |server| server.is_interruptible(class, now),
                    |server| -server.elapsed_service(now), streams)
    }

    fn select<F, S>(&mut self, servers: &[Server], filter: F, score: S, streams: &mut RandomStreams) -> Option<usize>
    where
        F: Fn(&Server) -> bool,
        S: Fn(&Server) -> f64,
    {
        let candidates: Vec<usize> = (0..servers.len()).filter(|&i| filter(&servers[i])).collect();
        if candidates.is_empty() {
            return None;
        }
        match self {
            ServerSelector::Order => Some(candidates[0]),
            ServerSelector::Cyclic { last } => {
                let chosen = match *last {
                    Some(prev) => candidates.iter().copied().find(|&i| i > prev).unwrap_or(candidates[0]),
                    None => candidates[0],
                };
                *last = Some(chosen);
                Some(chosen)
            }
            ServerSelector::Equity => {
                let mut best = candidates[0];
                for &i in candidates.iter().skip(1) {
                    if score(&servers[i]) > score(&servers[best]) {
                        best = i;
                    }
                }
                Some(best)
            }
            ServerSelector::Random => {
                let pos = streams.gen_range(StreamId::Selection, 0..candidates.len());
                Some(candidates[pos])
            }
        }
    }
}

//! Enumeration of the Cloudlet occupancy states reachable under an admission controller.

use std::collections::{BTreeSet, VecDeque};

use crate::controller::{Controller, Verdict};
use crate::task::TaskClass;

/// Cloudlet occupancy `(n1, n2)`: tasks of Class1 and Class2 in service.
pub type OccupancyState = (usize, usize);

/// Successor states of `state`: one per arrival class and one per departure class.
pub fn transitions(controller: &Controller, state: OccupancyState) -> Vec<OccupancyState> {
    let (n1, n2) = state;
    let mut next = Vec::with_capacity(4);
    for class in TaskClass::ALL {
        let target = match (class, controller.decide(class, [n1, n2])) {
            (_, Verdict::AdmitCloud) => None,
            (TaskClass::Class1, Verdict::AdmitCloudlet) => Some((n1 + 1, n2)),
            (TaskClass::Class2, Verdict::AdmitCloudlet) => Some((n1, n2 + 1)),
            (TaskClass::Class1, Verdict::AdmitCloudletWithPreemption) => Some((n1 + 1, n2 - 1)),
            (TaskClass::Class2, Verdict::AdmitCloudletWithPreemption) => None,
        };
        if let Some(target) = target {
            next.push(target);
        }
    }
    if n1 > 0 {
        next.push((n1 - 1, n2));
    }
    if n2 > 0 {
        next.push((n1, n2 - 1));
    }
    next
}

/// Breadth-first exploration from the empty Cloudlet, without recursion.
pub fn reachable_states(controller: &Controller) -> BTreeSet<OccupancyState> {
    let mut visited = BTreeSet::new();
    let mut states_queue = VecDeque::new();
    visited.insert((0, 0));
    states_queue.push_back((0, 0));

    while let Some(state) = states_queue.pop_front() {
        for target in transitions(controller, state) {
            if visited.insert(target) {
                states_queue.push_back(target);
            }
        }
    }
    visited
}

//! Boolean networks: a state-space workload for graph traversal.
//!
//! A network of `n` boolean variables has `2^n` states. Each variable has an
//! update function; a state gets one successor per variable whose update
//! disagrees with its current value (asynchronous semantics). The whole state
//! space is materialized up front, and traversals tag states in place through
//! [`StateInfo`] instead of keeping an external visited set.

mod info;
mod network;

pub use info::StateInfo;
pub use network::{BooleanNetwork, MAX_VARIABLES, NetworkError, State, StateHandle, generate, pathway};

use std::collections::VecDeque;

/// Breadth-first search from `start`, returning every reachable state with
/// its distance from `start`, in visiting order.
///
/// Holds the network's traversal lock, so concurrent searches on one network
/// run one after another.
pub fn reachable<'a>(network: &'a BooleanNetwork, start: StateHandle<'a>) -> Vec<(StateHandle<'a>, u32)> {
    let _traversal = network.traversal();
    let distance = StateInfo::<u32>::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    distance.store(&start, 0);
    queue.push_back(start);
    while let Some(state) = queue.pop_front() {
        let Some(d) = distance.get(&state) else {
            continue;
        };
        order.push((state, d));
        for next in state.successors() {
            if distance.get(&next).is_none() {
                distance.store(&next, d + 1);
                queue.push_back(next);
            }
        }
    }
    tracing::debug!(start = start.literal(), reached = order.len(), "reachability search done");
    order
}

use std::any::Any;
use std::fmt;
use std::ops::Deref;

use parking_lot::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::debug;

/// Largest supported variable count.
pub const MAX_VARIABLES: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Cannot create a boolean network with 2^{0} states (at most {MAX_VARIABLES} variables)")]
    TooManyVariables(usize),
}

/// Slot for the traversal tag of one state: the owning accessor's id plus
/// its value.
pub(crate) type Tag = Option<(u64, Box<dyn Any + Send>)>;

/// One valuation of the network's variables.
///
/// Bit `i` of the literal is the value of variable `i`.
pub struct State {
    literal: u32,
    successors: Vec<u32>,
    pub(crate) tag: Mutex<Tag>,
}

impl State {
    fn new(literal: u32) -> Self {
        Self {
            literal,
            successors: Vec::new(),
            tag: Mutex::new(None),
        }
    }

    pub fn literal(&self) -> u32 {
        self.literal
    }

    pub fn value_at(&self, var: usize) -> bool {
        var < 32 && (self.literal >> var) & 1 == 1
    }

    /// Literals of the successor states. [`StateHandle::successors`] yields
    /// the states themselves.
    pub fn successor_literals(&self) -> &[u32] {
        &self.successors
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("literal", &format_args!("{:#b}", self.literal))
            .field("successors", &self.successors)
            .finish()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.literal == other.literal
    }
}

impl Eq for State {}

/// A state together with the network it belongs to.
#[derive(Clone, Copy)]
pub struct StateHandle<'a> {
    network: &'a BooleanNetwork,
    state: &'a State,
}

impl<'a> StateHandle<'a> {
    pub fn state(&self) -> &'a State {
        self.state
    }

    pub fn successors(&self) -> impl Iterator<Item = StateHandle<'a>> + use<'a> {
        let network = self.network;
        self.state
            .successors
            .iter()
            .filter_map(move |&literal| network.state(literal))
    }
}

impl Deref for StateHandle<'_> {
    type Target = State;

    fn deref(&self) -> &State {
        self.state
    }
}

impl fmt::Debug for StateHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.state.fmt(f)
    }
}

impl PartialEq for StateHandle<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.network, other.network) && self.state == other.state
    }
}

impl Eq for StateHandle<'_> {}

/// A fully materialized asynchronous boolean network.
///
/// Each state has a single tag slot, so two traversals tagging the same
/// network at once would evict each other's tags. Traversals hold
/// [`BooleanNetwork::traversal`] for their whole run.
#[derive(Debug)]
pub struct BooleanNetwork {
    var_count: usize,
    states: Vec<State>,
    traversal: Mutex<()>,
}

impl BooleanNetwork {
    /// Build the state space. `update(state, var)` is the next value of
    /// `var` in `state`.
    pub fn new(var_count: usize, update: impl Fn(&State, usize) -> bool) -> Result<Self, NetworkError> {
        if var_count > MAX_VARIABLES {
            return Err(NetworkError::TooManyVariables(var_count));
        }
        Ok(Self::build(var_count, update))
    }

    fn build(var_count: usize, update: impl Fn(&State, usize) -> bool) -> Self {
        let state_count = 1u32 << var_count;
        let mut states: Vec<State> = (0..state_count).map(State::new).collect();

        let mut edges = 0usize;
        for literal in 0..state_count {
            let state = &states[literal as usize];
            let successors: Vec<u32> = (0..var_count)
                .filter(|&var| update(state, var) != state.value_at(var))
                .map(|var| literal ^ (1 << var))
                .collect();
            edges += successors.len();
            states[literal as usize].successors = successors;
        }
        debug!(var_count, states = state_count, edges, "boolean network built");

        Self {
            var_count,
            states,
            traversal: Mutex::new(()),
        }
    }

    pub fn var_count(&self) -> usize {
        self.var_count
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, literal: u32) -> Option<StateHandle<'_>> {
        self.states
            .get(literal as usize)
            .map(|state| StateHandle { network: self, state })
    }

    pub fn states(&self) -> impl Iterator<Item = StateHandle<'_>> {
        self.states
            .iter()
            .map(move |state| StateHandle { network: self, state })
    }

    /// Exclusive right to tag this network's states.
    pub fn traversal(&self) -> MutexGuard<'_, ()> {
        self.traversal.lock()
    }
}

/// Variables of the sample pathway returned by [`generate`].
pub mod pathway {
    pub const GROWTH_SIGNAL: usize = 0;
    pub const RECEPTOR: usize = 1;
    pub const KINASE: usize = 2;
    pub const TRANSCRIPTION: usize = 3;
    pub const APOPTOSIS: usize = 4;
    pub const VARIABLES: usize = 5;
}

/// A small fixed signalling pathway: a growth signal activates a receptor,
/// which drives a kinase cascade into transcription; apoptosis fires when
/// transcription runs without the growth signal and shuts the kinase down.
pub fn generate() -> BooleanNetwork {
    use pathway::*;

    let update = |state: &State, var: usize| match var {
        GROWTH_SIGNAL => state.value_at(GROWTH_SIGNAL),
        RECEPTOR => state.value_at(GROWTH_SIGNAL),
        KINASE => state.value_at(RECEPTOR) && !state.value_at(APOPTOSIS),
        TRANSCRIPTION => state.value_at(KINASE),
        APOPTOSIS => state.value_at(TRANSCRIPTION) && !state.value_at(GROWTH_SIGNAL),
        _ => state.value_at(var),
    };
    BooleanNetwork::build(VARIABLES, update)
}

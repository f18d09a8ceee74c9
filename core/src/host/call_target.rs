//! Call targets and their execution tiers.
//!
//! A [`CallTarget`] pairs a root node with the state shared by all of its
//! activations: the frame descriptor, the code generation, the name registry
//! and the target's own name and element shape caches. It also simulates a compiling host: after
//! `compile_threshold` interpreted invocations it records the current code
//! generation as "compiled", and every compiled invocation first checks that
//! nothing it speculated on has changed since. A mismatch deoptimizes back to
//! the interpreter. The tier only shows up in [`TargetStats`]; results are
//! identical in both.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use static_assertions::assert_impl_all;
use tracing::debug;

use crate::{
    api::ExecutionOptions,
    cache::{NameCache, NameRegistry, ShapeArena},
    evaluator::{Activation, ExecutionError},
    frame::{Frame, FrameDescriptor},
    host::{Assumption, CodeGeneration},
    nodes::RootNode,
    values::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Interpreted,
    /// Compiled against the given code generation.
    Compiled { generation: u64 },
}

/// Event counters of one call target.
#[derive(Debug, Default)]
pub struct TargetStats {
    invocations: AtomicU64,
    compilations: AtomicU64,
    deoptimizations: AtomicU64,
    osr_entries: AtomicU64,
}

impl TargetStats {
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    pub fn compilations(&self) -> u64 {
        self.compilations.load(Ordering::Relaxed)
    }

    pub fn deoptimizations(&self) -> u64 {
        self.deoptimizations.load(Ordering::Relaxed)
    }

    pub fn osr_entries(&self) -> u64 {
        self.osr_entries.load(Ordering::Relaxed)
    }

    pub(crate) fn record_osr_entry(&self) {
        self.osr_entries.fetch_add(1, Ordering::Relaxed);
    }
}

/// State shared by every activation of one call target.
#[derive(Debug)]
pub struct TargetState {
    descriptor: FrameDescriptor,
    generation: CodeGeneration,
    names: Arc<NameRegistry>,
    name_cache: NameCache,
    shapes: ShapeArena,
    options: ExecutionOptions,
    stats: TargetStats,
}

impl TargetState {
    pub fn descriptor(&self) -> &FrameDescriptor {
        &self.descriptor
    }

    pub fn generation(&self) -> &CodeGeneration {
        &self.generation
    }

    pub fn names(&self) -> &NameRegistry {
        &self.names
    }

    pub fn name_cache(&self) -> &NameCache {
        &self.name_cache
    }

    pub(crate) fn shares_names(&self, names: &Arc<NameRegistry>) -> bool {
        Arc::ptr_eq(&self.names, names)
    }

    pub fn shapes(&self) -> &ShapeArena {
        &self.shapes
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    pub fn stats(&self) -> &TargetStats {
        &self.stats
    }
}

#[derive(Debug)]
pub struct CallTarget {
    root: RootNode,
    state: TargetState,
    assumptions: Vec<Arc<Assumption>>,
    /// `0` while interpreted, otherwise the compiled generation plus one.
    compiled: AtomicU64,
    /// Invalid dependent assumptions at compile time. Assumptions never
    /// become valid again, so any increase means one broke since.
    invalid_at_compile: AtomicUsize,
    /// Interpreted invocations since the last tier change.
    warmth: AtomicU64,
}

assert_impl_all!(CallTarget: Send, Sync);

impl CallTarget {
    pub fn new(root: RootNode, names: Arc<NameRegistry>, options: ExecutionOptions) -> Self {
        let shapes = ShapeArena::new(names.cache_limit());
        let name_cache = names.new_cache();
        Self {
            state: TargetState {
                descriptor: FrameDescriptor::new(root.frame_size()),
                generation: CodeGeneration::new(),
                names,
                name_cache,
                shapes,
                options,
                stats: TargetStats::default(),
            },
            root,
            assumptions: Vec::new(),
            compiled: AtomicU64::new(0),
            invalid_at_compile: AtomicUsize::new(0),
            warmth: AtomicU64::new(0),
        }
    }

    /// Make compiled code of this target depend on `assumption`.
    pub fn depend_on(mut self, assumption: Arc<Assumption>) -> Self {
        self.assumptions.push(assumption);
        self
    }

    pub fn name(&self) -> &str {
        self.root.name()
    }

    pub fn root(&self) -> &RootNode {
        &self.root
    }

    pub fn state(&self) -> &TargetState {
        &self.state
    }

    pub fn stats(&self) -> &TargetStats {
        &self.state.stats
    }

    pub fn frame_descriptor(&self) -> &FrameDescriptor {
        &self.state.descriptor
    }

    pub fn generation(&self) -> u64 {
        self.state.generation.current()
    }

    pub fn tier(&self) -> Tier {
        match self.compiled.load(Ordering::Acquire) {
            0 => Tier::Interpreted,
            tagged => Tier::Compiled {
                generation: tagged - 1,
            },
        }
    }

    /// Run the target with `args`.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, ExecutionError> {
        self.state.stats.invocations.fetch_add(1, Ordering::Relaxed);
        self.update_tier();

        let mut activation = Activation::new(&self.state, args);
        self.root
            .execute(&mut activation)
            .map_err(|kind| ExecutionError::new(kind, self.root.name()))
    }

    /// A fresh activation, for driving parts of the graph by hand.
    pub fn activation<'a>(&'a self, args: &'a [Value]) -> Activation<'a> {
        Activation::new(&self.state, args)
    }

    /// An activation continuing from `frame`.
    pub fn resume<'a>(&'a self, args: &'a [Value], frame: Frame) -> Activation<'a> {
        Activation::resume(&self.state, args, frame)
    }

    fn update_tier(&self) {
        match self.tier() {
            Tier::Compiled { generation } => {
                let current = self.state.generation.current();
                if generation != current {
                    self.deoptimize(generation, "code generation changed");
                } else if self.invalid_assumptions() > self.invalid_at_compile.load(Ordering::Acquire) {
                    self.deoptimize(generation, "assumption invalidated");
                }
            }
            Tier::Interpreted => {
                let warmth = self.warmth.fetch_add(1, Ordering::Relaxed) + 1;
                if warmth >= self.state.options.compile_threshold {
                    self.compile();
                }
            }
        }
    }

    fn compile(&self) {
        let generation = self.state.generation.current();
        let tagged = generation.wrapping_add(1);
        if self
            .compiled
            .compare_exchange(0, tagged, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.invalid_at_compile
                .store(self.invalid_assumptions(), Ordering::Release);
            self.state.stats.compilations.fetch_add(1, Ordering::Relaxed);
            debug!(call_target = self.name(), generation, "call target compiled");
        }
    }

    fn deoptimize(&self, generation: u64, reason: &'static str) {
        let tagged = generation.wrapping_add(1);
        if self
            .compiled
            .compare_exchange(tagged, 0, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.warmth.store(0, Ordering::Relaxed);
            self.state.stats.deoptimizations.fetch_add(1, Ordering::Relaxed);
            debug!(call_target = self.name(), generation, reason, "call target deoptimized");
        }
    }

    fn invalid_assumptions(&self) -> usize {
        self.assumptions.iter().filter(|a| !a.is_valid()).count()
    }
}

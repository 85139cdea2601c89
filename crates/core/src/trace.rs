//! # Traced Stages
//!
//! A pipeline stage is a pure, synchronous transform `Input → Output`.
//! Stages chain with [`StageExt::then`] and can be wrapped in [`Traced`]
//! to record how long each one took.
//!
//! ## Compile-time selection
//!
//! - `Traced<S, false>`: no timing code is generated; the wrapper compiles away.
//! - `Traced<S, true>`: the output is paired with a [`TraceNode`] tree.
//!
//! ```rust
//! use distributional_core::trace::{Stage, StageExt};
//! use distributional_core::CoreError;
//!
//! struct Double;
//!
//! impl Stage for Double {
//!     type Input = u32;
//!     type Output = u32;
//!     type Error = CoreError;
//!
//!     fn run(&self, input: &u32) -> Result<u32, CoreError> {
//!         Ok(input * 2)
//!     }
//! }
//!
//! let (out, trace) = Double.then(Double).traced().run(&3).unwrap();
//! assert_eq!(out, 12);
//! assert_eq!(trace.children.len(), 2);
//! ```

use std::time::{Duration, Instant};

use tracing::debug;

/// A pure transform from a borrowed input to an owned output.
pub trait Stage {
    /// What the stage reads. May be unsized (e.g. `[usize]`).
    type Input: ?Sized;

    /// What the stage produces.
    type Output;

    /// Failure type.
    type Error;

    /// Execute the stage.
    fn run(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;

    /// Name used in trace trees and log events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Execute and time the stage.
    ///
    /// Composite stages override this to attach one child per sub-stage.
    fn run_traced(&self, input: &Self::Input) -> Result<(Self::Output, TraceNode), Self::Error> {
        let start = Instant::now();
        let output = self.run(input)?;
        let elapsed = start.elapsed();
        debug!(stage = self.name(), elapsed_us = elapsed.as_micros() as u64, "stage finished");
        Ok((output, TraceNode::new(self.name(), elapsed)))
    }
}

/// A node in the trace tree, recording timing and hierarchy.
#[derive(Debug, Clone)]
pub struct TraceNode {
    /// The name of the stage
    pub name: String,
    /// How long this stage took
    pub duration: Duration,
    /// Child traces (for composed stages)
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    /// Create a new trace node.
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
            children: Vec::new(),
        }
    }

    /// Add a child trace.
    pub fn with_child(mut self, child: TraceNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add multiple children.
    pub fn with_children(mut self, children: Vec<TraceNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&TraceNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Pretty-print the trace tree.
    pub fn display(&self) -> String {
        self.display_indent(0)
    }

    fn display_indent(&self, indent: usize) -> String {
        let mut out = format!("{}[{:?}] {}\n", "  ".repeat(indent), self.duration, self.name);
        for child in &self.children {
            out.push_str(&child.display_indent(indent + 1));
        }
        out
    }
}

impl std::fmt::Display for TraceNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Sequential composition: run `first`, feed its output to `second`.
#[derive(Debug, Clone)]
pub struct Then<A, B> {
    first: A,
    second: B,
}

impl<A, B> Then<A, B> {
    /// Chain two stages.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// The upstream stage.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// The downstream stage.
    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<A, B> Stage for Then<A, B>
where
    A: Stage,
    B: Stage<Input = A::Output, Error = A::Error>,
{
    type Input = A::Input;
    type Output = B::Output;
    type Error = A::Error;

    fn run(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let mid = self.first.run(input)?;
        self.second.run(&mid)
    }

    fn name(&self) -> &'static str {
        "then"
    }

    fn run_traced(&self, input: &Self::Input) -> Result<(Self::Output, TraceNode), Self::Error> {
        let start = Instant::now();
        let (mid, first_trace) = self.first.run_traced(input)?;
        let (output, second_trace) = self.second.run_traced(&mid)?;

        // Flatten nested `then` nodes so a chain reads as one list of stages.
        let mut children = Vec::new();
        for trace in [first_trace, second_trace] {
            if trace.name == "then" {
                children.extend(trace.children);
            } else {
                children.push(trace);
            }
        }
        Ok((output, TraceNode::new(self.name(), start.elapsed()).with_children(children)))
    }
}

/// A traced wrapper around a stage.
///
/// The const generic `ENABLED` determines whether tracing is active:
/// - `Traced<S, false>`: zero overhead, plain output
/// - `Traced<S, true>`: output paired with a [`TraceNode`]
#[derive(Debug, Clone)]
pub struct Traced<S, const ENABLED: bool> {
    inner: S,
}

impl<S, const ENABLED: bool> Traced<S, ENABLED> {
    /// Create a new traced wrapper.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Get a reference to the inner stage.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap and return the inner stage.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Stage> Stage for Traced<S, false> {
    type Input = S::Input;
    type Output = S::Output;
    type Error = S::Error;

    fn run(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        self.inner.run(input)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

impl<S: Stage> Stage for Traced<S, true> {
    type Input = S::Input;
    type Output = (S::Output, TraceNode);
    type Error = S::Error;

    fn run(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        self.inner.run_traced(input)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Traced in debug builds, untraced in release builds.
#[cfg(debug_assertions)]
pub type AutoTraced<S> = Traced<S, true>;

/// Traced in debug builds, untraced in release builds.
#[cfg(not(debug_assertions))]
pub type AutoTraced<S> = Traced<S, false>;

/// Combinators available on every stage.
pub trait StageExt: Stage + Sized {
    /// Chain `next` after this stage.
    fn then<B>(self, next: B) -> Then<Self, B>
    where
        B: Stage<Input = Self::Output, Error = Self::Error>,
    {
        Then::new(self, next)
    }

    /// Wrap this stage with tracing enabled.
    fn traced(self) -> Traced<Self, true> {
        Traced::new(self)
    }

    /// Wrap this stage with tracing disabled.
    fn untraced(self) -> Traced<Self, false> {
        Traced::new(self)
    }

    /// Wrap with auto-selected tracing (debug = on, release = off).
    fn auto_traced(self) -> AutoTraced<Self> {
        Traced::new(self)
    }
}

impl<S: Stage + Sized> StageExt for S {}

//! # Core - Foundations for Distributional Pipelines
//!
//! This crate provides the plumbing shared by every stage of a word-vector
//! pipeline:
//!
//! - **Shapes**: runtime descriptions of token streams and matrices
//! - **Errors**: shape mismatches and rejected inputs as first-class values
//! - **Stages**: pure transforms that chain with `then` and can be traced
//!
//! ## Design Philosophy
//!
//! A pipeline is a value. Instead of "count, then weight, then factorize"
//! as three unrelated calls, stages are composed into one chain whose
//! timing tree can be inspected after it runs.

pub mod error;
pub mod shape;
pub mod trace;

pub use error::CoreError;
pub use shape::{Shape, TypeId};
pub use trace::{AutoTraced, Stage, StageExt, Then, TraceNode, Traced};

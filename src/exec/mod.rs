// src/exec/mod.rs

//! Process execution layer.
//!
//! The executor talks to an [`ExecBackend`] instead of spawning processes
//! directly. This is the only point where the core touches the OS process
//! table, and it makes it easy to swap in a fake backend in tests.

pub mod backend;

pub use backend::{ExecBackend, RealExecBackend};

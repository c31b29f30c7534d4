//! Concrete collaborators: an in-process backend for offline use and tests,
//! and a client for the hosted REST backend.

pub mod memory;
pub mod rest;

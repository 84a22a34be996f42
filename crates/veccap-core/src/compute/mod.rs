//! Computation backends.

pub mod cpu;

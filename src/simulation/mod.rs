//! Synthetic data for demos and benchmarks.

pub mod generator;

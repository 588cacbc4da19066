//! Stage adapters. Only simulated ones exist: no real provider is contacted.

pub mod simulated;

//! Deterministic random number generation
//!
//! Uses the xorshift64* algorithm. Every stochastic draw in the kernel
//! (demographics, arrivals, service times, routing, diagnosis, LWBS,
//! mortality) goes through the simulator's own `RngManager`.

mod xorshift;

pub use xorshift::RngManager;

//! Deterministic stand-in data for when live sources are unavailable.
//!
//! Every generator derives its PRNG seed from plain string keys (see [`seed_from_keys`]) so the
//! same region/commodity inputs always produce the same series.

mod generators;
mod seed;

pub use generators::{crop_health, price_history, trade_flow, weather};
pub use seed::{rng_from_keys, seed_from_keys};

//! Deterministic random number generation for configuration seeding.
//!
//! A seed string is digested into a key ([`seed_key`]), the key drives a
//! 64-bit Mersenne Twister ([`mersenne_twister`]), and derivation code
//! consumes it through the [`source::RandomSource`] trait.

pub mod mersenne_twister;
pub mod seed_key;
pub mod source;

//! Typed async client for the Tika gateway.

mod client;

pub use client::*;

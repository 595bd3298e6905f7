//! Application layer for FitRoom.
//!
//! This crate provides the use case implementation that coordinates between
//! the domain and infrastructure layers: the [`Stylist`] state machine
//! driving a styling session against the synthesis provider.

pub mod stylist;

#[cfg(test)]
mod stylist_test;

pub use stylist::Stylist;

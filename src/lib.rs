//! Ninja Thief simulation core.
//!
//! A fixed-timestep platformer: a player and patrolling enemies move under
//! gravity, collide with a tile grid, climb ladders and collect items while
//! the level runs through its win/lose lifecycle. Front ends feed
//! [`sim::session::Session::tick`] an input snapshot and the elapsed time,
//! then draw from the read-only accessors.

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;

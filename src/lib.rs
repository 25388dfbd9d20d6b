//! Strider third-person character controller library
//!
//! This module exposes the controller core (input, motion, locomotion,
//! orientation, camera) together with the Rapier-backed simulation it drives.

pub mod config;
pub mod game;

//! Shared types for the cubeyard viewer.

mod types;

pub use types::{Axis, Cube};

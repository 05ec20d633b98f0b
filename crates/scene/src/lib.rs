//! Scene store: the ordered committed cubes plus the single active cube.
//!
//! # Invariants
//! - There is always exactly one active cube; the scene is never without one.
//! - Committed order is insertion order and is also draw order.
//! - All mutations flow through explicit operations; every operation is total.

mod scene;

pub use scene::{ROTATION_STEP, Scene};

//! Logical input actions.
//!
//! The platform layer translates raw key events into `Action`s and queues
//! them; the application step drains the queue once per frame and applies it
//! to the scene. The scene never sees raw key codes.
//!
//! # Invariants
//! - Actions are discrete; holding a key does not stream actions.
//! - The same action vocabulary works for any windowing backend.

pub mod action;

pub use action::{Action, MOVE_STEP};

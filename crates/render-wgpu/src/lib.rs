//! wgpu render backend for the cubeyard viewer.
//!
//! Draws a full-screen gradient background, then every committed cube and
//! finally the active cube as instances of one shared unit-cube mesh.
//!
//! # Invariants
//! - The renderer never mutates scene state.
//! - The perspective projection is computed once at startup and never
//!   rewritten; the view transform is the identity.
//! - The background pass never writes depth, so the 3D pass always wins
//!   where geometry exists.

mod gpu;
mod projection;
mod shaders;

pub use gpu::SceneRenderer;
pub use projection::Projection;

use cubeyard_common::Axis;

/// World-space distance the active cube moves per key activation.
pub const MOVE_STEP: f32 = 0.05;

/// A discrete user intent produced by the platform layer.
///
/// The scene store consumes actions, never raw key events, so the key
/// bindings live entirely in the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Translate the active cube along an axis by a delta.
    Move(Axis, f32),
    /// Flip the active cube's auto-rotation flag.
    ToggleRotation,
    /// Commit the active cube to the scene and spawn a fresh one.
    Commit,
    /// Request application shutdown.
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_carries_axis_and_delta() {
        let a = Action::Move(Axis::Y, MOVE_STEP);
        assert_eq!(a, Action::Move(Axis::Y, 0.05));
    }

    #[test]
    fn actions_are_comparable() {
        assert_eq!(Action::Commit, Action::Commit);
        assert_ne!(Action::ToggleRotation, Action::Exit);
    }
}

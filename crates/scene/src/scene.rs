use cubeyard_common::{Axis, Cube};
use glam::Vec3;

/// Degrees added to the active cube's angle per tick while auto-rotation
/// is enabled.
pub const ROTATION_STEP: f32 = 0.5;

/// Floor grid dimensions and spacing.
const GRID_ROWS: usize = 6;
const GRID_COLS: usize = 25;
const GRID_FIRST_Z: f32 = 4.1;
const GRID_FIRST_X: f32 = -3.4;
const GRID_Y: f32 = -1.7;
const GRID_SPACING: f32 = 0.3;

/// The authoritative scene state.
///
/// Holds the ordered sequence of committed cubes plus the single active cube
/// being positioned by the user. The input layer and `tick` are the only
/// writers; the renderer reads it once per frame.
#[derive(Debug, Clone)]
pub struct Scene {
    committed: Vec<Cube>,
    active: Cube,
    rotating: bool,
}

impl Scene {
    /// Create an empty scene with a fresh active cube at the spawn pose.
    pub fn new() -> Self {
        Self {
            committed: Vec::new(),
            active: Cube::SPAWN,
            rotating: false,
        }
    }

    /// Create the startup scene: a 6x25 floor grid of committed cubes at
    /// deterministic positions, all with zero rotation.
    pub fn with_floor_grid() -> Self {
        let mut scene = Self::new();
        for row in 0..GRID_ROWS {
            let z = GRID_FIRST_Z - row as f32 * GRID_SPACING;
            for col in 0..GRID_COLS {
                let x = GRID_FIRST_X + col as f32 * GRID_SPACING;
                scene.committed.push(Cube::new(Vec3::new(x, GRID_Y, z), 0.0));
            }
        }
        scene
    }

    /// Committed cubes in insertion (= draw) order.
    pub fn committed(&self) -> &[Cube] {
        &self.committed
    }

    /// The cube currently being positioned by the user.
    pub fn active(&self) -> &Cube {
        &self.active
    }

    /// Whether the active cube auto-rotates each tick.
    pub fn rotating(&self) -> bool {
        self.rotating
    }

    /// Append a copy of the active cube to the committed sequence, then
    /// replace the active cube with a fresh one at the spawn pose.
    ///
    /// The committed copy is by value; later edits to the new active cube
    /// cannot touch it.
    pub fn commit_active(&mut self) {
        self.committed.push(self.active);
        self.active = Cube::SPAWN;
    }

    /// Add `delta` to the named coordinate of the active cube.
    pub fn translate_active(&mut self, axis: Axis, delta: f32) {
        self.active.translate(axis, delta);
    }

    /// Flip the auto-rotation flag.
    pub fn toggle_rotation(&mut self) {
        self.rotating = !self.rotating;
    }

    /// Advance one frame of time-driven state: while the rotation flag is
    /// set, the active cube's angle grows by `ROTATION_STEP` per call.
    pub fn tick(&mut self) {
        if self.rotating {
            self.active.angle += ROTATION_STEP;
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scene_has_spawn_active_and_no_committed() {
        let s = Scene::new();
        assert!(s.committed().is_empty());
        assert_eq!(*s.active(), Cube::SPAWN);
        assert!(!s.rotating());
    }

    #[test]
    fn floor_grid_has_150_cubes() {
        let s = Scene::with_floor_grid();
        assert_eq!(s.committed().len(), 150);
    }

    #[test]
    fn floor_grid_positions_are_deterministic() {
        let s = Scene::with_floor_grid();
        let cubes = s.committed();

        // Row 0, column 0.
        assert_eq!(cubes[0].position, Vec3::new(-3.4, -1.7, 4.1));
        // Row 0, column 24.
        assert_eq!(
            cubes[24].position,
            Vec3::new(-3.4 + 24.0 * 0.3, -1.7, 4.1)
        );
        // Row 5, column 0.
        assert_eq!(
            cubes[5 * 25].position,
            Vec3::new(-3.4, -1.7, 4.1 - 5.0 * 0.3)
        );
        // Every cube starts unrotated at floor height.
        for cube in cubes {
            assert_eq!(cube.angle, 0.0);
            assert_eq!(cube.position.y, -1.7);
        }
    }

    #[test]
    fn translate_active_accumulates_without_clamping() {
        let mut s = Scene::new();
        let deltas = [0.5_f32, -1.0, 100.0, -0.25];
        let mut expected = s.active().position.x;
        for d in deltas {
            s.translate_active(Axis::X, d);
            expected += d;
        }
        assert_eq!(s.active().position.x, expected);
    }

    #[test]
    fn toggle_rotation_is_an_involution() {
        let mut s = Scene::new();
        assert!(!s.rotating());
        s.toggle_rotation();
        assert!(s.rotating());
        s.toggle_rotation();
        assert!(!s.rotating());
    }

    #[test]
    fn commit_appends_one_and_resets_active() {
        let mut s = Scene::new();
        s.translate_active(Axis::X, 2.0);
        s.translate_active(Axis::Y, 1.0);
        s.toggle_rotation();
        for _ in 0..4 {
            s.tick();
        }
        let placed = *s.active();

        s.commit_active();
        assert_eq!(s.committed().len(), 1);
        assert_eq!(s.committed()[0], placed);
        assert_eq!(*s.active(), Cube::SPAWN);
    }

    #[test]
    fn committed_copy_is_isolated_from_new_active() {
        let mut s = Scene::new();
        s.translate_active(Axis::Z, 1.5);
        s.commit_active();
        let before = s.committed()[0];

        s.translate_active(Axis::Z, -3.0);
        s.translate_active(Axis::X, 7.0);
        assert_eq!(s.committed()[0], before);
    }

    #[test]
    fn tick_accumulates_rotation_linearly() {
        let mut s = Scene::new();
        s.toggle_rotation();
        for _ in 0..7 {
            s.tick();
        }
        assert_eq!(s.active().angle, 7.0 * ROTATION_STEP);
    }

    #[test]
    fn tick_without_flag_leaves_angle_untouched() {
        let mut s = Scene::new();
        for _ in 0..10 {
            s.tick();
        }
        assert_eq!(s.active().angle, 0.0);
    }

    #[test]
    fn commit_from_startup_scene() {
        let mut s = Scene::with_floor_grid();
        assert_eq!(s.committed().len(), 150);

        s.commit_active();
        assert_eq!(s.committed().len(), 151);
        assert_eq!(s.committed()[150], Cube::SPAWN);
        assert_eq!(*s.active(), Cube::SPAWN);
    }

    #[test]
    fn rotation_stops_where_it_was_toggled_off() {
        let mut s = Scene::with_floor_grid();
        s.toggle_rotation();
        for _ in 0..10 {
            s.tick();
        }
        assert_eq!(s.active().angle, 5.0);

        s.toggle_rotation();
        for _ in 0..10 {
            s.tick();
        }
        assert_eq!(s.active().angle, 5.0);
    }
}

use glam::Vec3;

/// Names one of the three world-space coordinates of a cube position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A cube in the scene: position plus a single yaw rotation.
///
/// The angle is in degrees around +Y and is unbounded. It is never
/// normalized; rendering composes it into a rotation matrix, which is
/// inherently modular.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    pub position: Vec3,
    pub angle: f32,
}

impl Cube {
    /// Pose given to every freshly spawned cube awaiting placement.
    pub const SPAWN: Cube = Cube {
        position: Vec3::new(0.0, 0.0, -5.0),
        angle: 0.0,
    };

    pub fn new(position: Vec3, angle: f32) -> Self {
        Self { position, angle }
    }

    /// Add `delta` to the named coordinate. No clamping.
    pub fn translate(&mut self, axis: Axis, delta: f32) {
        match axis {
            Axis::X => self.position.x += delta,
            Axis::Y => self.position.y += delta,
            Axis::Z => self.position.z += delta,
        }
    }
}

impl Default for Cube {
    fn default() -> Self {
        Self::SPAWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_pose() {
        let c = Cube::SPAWN;
        assert_eq!(c.position, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(c.angle, 0.0);
    }

    #[test]
    fn translate_sums_deltas_in_order() {
        let mut c = Cube::SPAWN;
        let deltas = [0.25_f32, -0.5, 1.0, 0.125, -0.25];
        let mut expected = c.position.y;
        for d in deltas {
            c.translate(Axis::Y, d);
            expected += d;
        }
        assert_eq!(c.position.y, expected);
    }

    #[test]
    fn translate_axes_are_independent() {
        let mut c = Cube::SPAWN;
        c.translate(Axis::X, 1.0);
        c.translate(Axis::Z, -2.0);
        assert_eq!(c.position, Vec3::new(1.0, 0.0, -7.0));
        assert_eq!(c.angle, 0.0);
    }
}

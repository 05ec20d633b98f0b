use glam::Mat4;

/// Fixed perspective projection for the 3D pass.
///
/// There is no movable camera: the view transform is the identity, so the
/// projection matrix alone maps world space to clip space. It is built once
/// at startup and reused unchanged every frame, including across resizes.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: 45.0_f32.to_radians(),
            aspect: 1200.0 / 800.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn default_projection_is_valid() {
        let m = Projection::default().matrix();
        assert!(!m.col(0).x.is_nan());
        assert!(m.col(0).x > 0.0);
    }

    #[test]
    fn spawn_point_projects_inside_the_frustum() {
        let m = Projection::default().matrix();
        let clip = m * Vec3::new(0.0, 0.0, -5.0).extend(1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}

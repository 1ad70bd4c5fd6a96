//! Orbit and spin composition.

use glam::{Mat3, Mat4, Vec3};

use crate::body::{BodyDescriptor, BodyId};

/// Angle in radians reached after `sim_time` seconds at `rate` degrees per
/// second. Reduced to one turn in `f64` so long runs keep their precision.
fn angle_at(rate: f32, sim_time: f64) -> f32 {
    (f64::from(rate) * sim_time).rem_euclid(360.0).to_radians() as f32
}

/// World-space centre of `body` at `sim_time`.
///
/// The resting offset is rotated about +Y by the orbit angle, then shifted by
/// the parent's centre when there is one.
pub fn orbit_center(body: &BodyDescriptor, sim_time: f64, parent_center: Option<Vec3>) -> Vec3 {
    let orbit = Mat3::from_rotation_y(angle_at(body.orbit_rate, sim_time));
    orbit * body.resting_offset + parent_center.unwrap_or(Vec3::ZERO)
}

/// Model matrix of `body` at `sim_time`: `T(center) · R_y(spin) · R_z(tilt)`.
///
/// Pure: the same inputs always give a bit-identical matrix.
pub fn compute_model_matrix(
    body: &BodyDescriptor,
    sim_time: f64,
    parent_center: Option<Vec3>,
) -> Mat4 {
    let center = orbit_center(body, sim_time, parent_center);
    Mat4::from_translation(center)
        * Mat4::from_rotation_y(angle_at(body.spin_rate, sim_time))
        * Mat4::from_rotation_z(body.axial_tilt.to_radians())
}

/// Placement of one body for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTransform {
    pub body: BodyId,
    pub center: Vec3,
    pub model: Mat4,
}

/// Per-frame camera and clock state shared by every draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    /// Seconds of simulation time.
    pub sim_time: f64,
}

impl FrameContext {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// `projection · view · model`.
    pub fn mvp(&self, model: Mat4) -> Mat4 {
        self.view_projection() * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orbiting(radius: f32, orbit_rate: f32, spin_rate: f32, tilt: f32) -> BodyDescriptor {
        BodyDescriptor {
            resting_offset: Vec3::new(radius, 0.0, 0.0),
            orbit_rate,
            spin_rate,
            axial_tilt: tilt,
            ..BodyDescriptor::new("test")
        }
    }

    #[test]
    fn test_rest_pose_is_pure_translation() {
        let body = orbiting(10.0, 36.0, 0.0, 0.0);
        let model = compute_model_matrix(&body, 0.0, None);
        assert_eq!(model, Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_root_body_without_motion_is_identity() {
        let sun = BodyDescriptor::new("sun");
        for t in [0.0, 1.5, 1000.0] {
            assert_eq!(compute_model_matrix(&sun, t, None), Mat4::IDENTITY);
        }
    }

    #[test]
    fn test_quarter_orbit() {
        // 36 deg/s for 2.5 s is 90 degrees: +X rotates onto -Z about +Y.
        let body = orbiting(10.0, 36.0, 0.0, 0.0);
        let center = orbit_center(&body, 2.5, None);
        assert!(center.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-4), "{center}");
    }

    #[test]
    fn test_orbit_keeps_distance_and_plane() {
        let body = orbiting(2.0, 144.0, 144.0, 0.0);
        let parent = Vec3::new(3.0, -1.0, 4.0);
        for step in 0..200 {
            let t = step as f64 * 0.173;
            let offset = orbit_center(&body, t, Some(parent)) - parent;
            assert!((offset.length() - 2.0).abs() < 1e-4);
            assert!(offset.y.abs() < 1e-6);
        }
    }

    #[test]
    fn test_composition_order() {
        let body = orbiting(10.0, 36.0, 72.0, 23.5);
        let t = 0.7;
        let center = orbit_center(&body, t, None);
        let expected = Mat4::from_translation(center)
            * Mat4::from_rotation_y((72.0_f64 * t).to_radians() as f32)
            * Mat4::from_rotation_z(23.5_f32.to_radians());
        assert!(compute_model_matrix(&body, t, None).abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_tilt_sits_beneath_spin() {
        // Spinning after tilting swings the tilted pole around +Y.
        let body = orbiting(0.0, 0.0, 180.0, 30.0);
        let pole_at = |t: f64| compute_model_matrix(&body, t, None).transform_vector3(Vec3::Y);

        let start = pole_at(0.0);
        let half_turn = pole_at(1.0);
        assert!(start.x < -0.49 && half_turn.x > 0.49, "{start} {half_turn}");
        assert!((start.y - 30.0_f32.to_radians().cos()).abs() < 1e-5);
        assert!((half_turn.y - start.y).abs() < 1e-5);
    }

    #[test]
    fn test_composer_is_idempotent() {
        let body = orbiting(2.0, 144.0, 72.0, 23.5);
        let parent = Some(Vec3::new(7.0, 0.0, -7.0));
        for t in [0.0, 0.016, 3.3, 1.0e6] {
            let a = compute_model_matrix(&body, t, parent);
            let b = compute_model_matrix(&body, t, parent);
            assert_eq!(a.to_cols_array(), b.to_cols_array());
        }
    }

    #[test]
    fn test_long_runs_stay_periodic() {
        let body = orbiting(10.0, 36.0, 72.0, 0.0);
        let early = compute_model_matrix(&body, 1.25, None);
        let late = compute_model_matrix(&body, 1.25 + 10.0 * 100_000.0, None);
        assert!(early.abs_diff_eq(late, 1e-4));
    }

    #[test]
    fn test_frame_context_mvp() {
        let frame = FrameContext {
            view: Mat4::look_at_rh(Vec3::new(0.0, 8.0, 30.0), Vec3::ZERO, Vec3::Y),
            projection: Mat4::perspective_rh(45_f32.to_radians(), 4.0 / 3.0, 80.1, 0.1),
            camera_position: Vec3::new(0.0, 8.0, 30.0),
            sim_time: 0.0,
        };
        let model = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let expected = frame.projection * frame.view * model;
        assert_eq!(frame.mvp(model), expected);
    }
}

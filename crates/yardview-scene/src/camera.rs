use glam::{Mat4, Vec3};
use yardview_core::CameraState;
use yardview_settings::CameraConfig;

/// Y-up perspective camera looking at a target point.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov: f32, // degrees
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl PerspectiveCamera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: Vec3::from_array(config.initial.position),
            target: Vec3::from_array(config.initial.target),
            fov: config.fov,
            aspect_ratio: 1.0,
            near: config.near,
            far: config.far,
        }
    }

    pub fn update_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 && width > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    pub fn state(&self) -> CameraState {
        CameraState::new(self.position.to_array(), self.target.to_array())
    }

    /// Assign position and look-at target. Non-finite states are ignored.
    pub fn set_state(&mut self, state: &CameraState) -> bool {
        if !state.is_finite() {
            tracing::debug!(?state, "ignoring non-finite camera state");
            return false;
        }
        self.position = Vec3::from_array(state.position);
        self.target = Vec3::from_array(state.target);
        true
    }

    fn up(&self) -> Vec3 {
        let forward = (self.target - self.position).normalize_or_zero();
        // Looking straight down or up: fall back to -Z as screen-up
        if forward.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::NEG_Z
        } else {
            Vec3::Y
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Orbit controls with inertial damping.
///
/// Pointer input accumulates angular/zoom velocity; `update` bleeds it off
/// by `damping_factor` per frame. Programmatic camera assignment suspends
/// the controls so residual velocity cannot drag the camera away from the
/// assigned pose; the render loop resumes them on its next tick.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    enabled: bool,
    damping_factor: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
    pan_velocity: Vec3,
}

const REST_EPSILON: f32 = 1e-5;
const PITCH_LIMIT: f32 = 1.55; // just under 89 degrees

impl OrbitControls {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            enabled: true,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
            pan_velocity: Vec3::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disable until the next `resume`, dropping any residual motion.
    pub fn suspend(&mut self) {
        self.enabled = false;
        self.stop();
    }

    pub fn resume(&mut self) {
        self.enabled = true;
    }

    pub fn stop(&mut self) {
        self.yaw_velocity = 0.0;
        self.pitch_velocity = 0.0;
        self.zoom_velocity = 0.0;
        self.pan_velocity = Vec3::ZERO;
    }

    pub fn is_moving(&self) -> bool {
        self.yaw_velocity.abs() > REST_EPSILON
            || self.pitch_velocity.abs() > REST_EPSILON
            || self.zoom_velocity.abs() > REST_EPSILON
            || self.pan_velocity.length_squared() > REST_EPSILON * REST_EPSILON
    }

    /// Pointer drag in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if !self.enabled {
            return;
        }
        self.yaw_velocity -= dx * self.rotate_speed;
        self.pitch_velocity += dy * self.rotate_speed;
    }

    /// Scroll steps; positive zooms out.
    pub fn zoom(&mut self, steps: f32) {
        if !self.enabled {
            return;
        }
        self.zoom_velocity += steps * self.zoom_speed;
    }

    /// Pan in screen space, pixels scaled by camera distance.
    pub fn pan(&mut self, camera: &PerspectiveCamera, dx: f32, dy: f32) {
        if !self.enabled {
            return;
        }
        let forward = (camera.target - camera.position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        let scale = (camera.target - camera.position).length() * 0.001;
        self.pan_velocity += (-right * dx + up * dy) * scale;
    }

    /// Apply one frame of motion. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        if !self.enabled || !self.is_moving() {
            return false;
        }

        let offset = camera.position - camera.target;
        let radius = offset.length().max(f32::EPSILON);
        let mut yaw = offset.x.atan2(offset.z);
        let mut pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();

        yaw += self.yaw_velocity;
        pitch = (pitch + self.pitch_velocity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        let radius =
            (radius * (1.0 + self.zoom_velocity)).clamp(self.min_distance, self.max_distance);

        camera.target += self.pan_velocity;
        let (sin_yaw, cos_yaw) = yaw.sin_cos();
        let (sin_pitch, cos_pitch) = pitch.sin_cos();
        camera.position =
            camera.target + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * radius;

        let keep = 1.0 - self.damping_factor;
        self.yaw_velocity *= keep;
        self.pitch_velocity *= keep;
        self.zoom_velocity *= keep;
        self.pan_velocity *= keep;
        if !self.is_moving() {
            self.stop();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip() {
        let mut camera = PerspectiveCamera::default();
        let state = CameraState::new([10.0, 5.0, 10.0], [1.0, 0.0, -1.0]);
        assert!(camera.set_state(&state));
        assert_eq!(camera.state(), state);
    }

    #[test]
    fn test_non_finite_state_ignored() {
        let mut camera = PerspectiveCamera::default();
        let before = camera.state();
        assert!(!camera.set_state(&CameraState::new([f32::NAN, 0.0, 0.0], [0.0; 3])));
        assert_eq!(camera.state(), before);
    }

    #[test]
    fn test_aspect_ignores_zero_height() {
        let mut camera = PerspectiveCamera::default();
        camera.update_aspect_ratio(800.0, 400.0);
        assert_eq!(camera.aspect_ratio, 2.0);
        camera.update_aspect_ratio(800.0, 0.0);
        assert_eq!(camera.aspect_ratio, 2.0);
    }

    #[test]
    fn test_top_down_view_matrix_is_finite() {
        let mut camera = PerspectiveCamera::default();
        camera.set_state(&CameraState::new([0.0, 50.0, 0.0], [0.0, 0.0, 0.0]));
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn test_damping_decays_to_rest() {
        let config = CameraConfig::default();
        let mut camera = PerspectiveCamera::from_config(&config);
        let mut controls = OrbitControls::new(&config);
        let start_distance = camera.state().distance();

        controls.rotate(40.0, 0.0);
        assert!(controls.update(&mut camera));

        let mut frames = 0;
        while controls.update(&mut camera) {
            frames += 1;
            assert!(frames < 1000, "controls never came to rest");
        }
        assert!(!controls.is_moving());
        assert!((camera.state().distance() - start_distance).abs() < 1e-2);
    }

    #[test]
    fn test_suspended_controls_ignore_input() {
        let config = CameraConfig::default();
        let mut camera = PerspectiveCamera::from_config(&config);
        let mut controls = OrbitControls::new(&config);

        controls.rotate(10.0, 10.0);
        controls.suspend();
        let before = camera.state();
        assert!(!controls.update(&mut camera));
        controls.zoom(3.0);
        assert!(!controls.is_moving());
        assert_eq!(camera.state(), before);

        controls.resume();
        assert!(controls.is_enabled());
    }
}

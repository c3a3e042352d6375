//! Orbit camera that keeps the debris in view.

use macroquad::prelude::*;

/// Camera circling a target point at a fixed distance.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
    /// Multiplier for scroll wheel zoom
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of the remaining distance to the focus point covered per second.
    pub follow_rate: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: Vec3::ZERO,
            zoom_speed: 1.0,
            min_distance: 3.0,
            max_distance: 60.0,
            follow_rate: 2.0,
        }
    }

    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    pub fn with_zoom(mut self, speed: f32, min: f32, max: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Applies mouse drag, scroll and arrow key input.
    pub fn handle_input(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.orbit(-delta.x * 2.0, -delta.y * 2.0);
        }

        let step = 1.5 * get_frame_time();
        let horizontal = f32::from(u8::from(is_key_down(KeyCode::Left)))
            - f32::from(u8::from(is_key_down(KeyCode::Right)));
        let vertical = f32::from(u8::from(is_key_down(KeyCode::Up)))
            - f32::from(u8::from(is_key_down(KeyCode::Down)));
        self.orbit(horizontal * step, vertical * step);

        self.zoom(mouse_wheel().1);
    }

    /// Rotates around the target; pitch stays short of the poles.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        self.yaw += yaw;
        self.pitch = (self.pitch + pitch).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, scroll: f32) {
        self.distance =
            (self.distance - scroll * self.zoom_speed).clamp(self.min_distance, self.max_distance);
    }

    /// Eases the target towards `focus`.
    pub fn follow(&mut self, focus: Vec3, dt: f32) {
        let t = (self.follow_rate * dt).clamp(0.0, 1.0);
        self.target = self.target.lerp(focus, t);
    }

    pub fn position(&self) -> Vec3 {
        let offset = vec3(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        );
        self.target + offset * self.distance
    }

    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: Vec3::Y,
            target: self.target,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_at_distance() {
        let camera = OrbitCamera::new(10.0, 0.7, 0.4).with_target(vec3(1.0, 2.0, 3.0));
        let d = (camera.position() - camera.target).length();
        assert!((d - 10.0).abs() < 1e-4);
    }

    #[test]
    fn pitch_and_zoom_are_clamped() {
        let mut camera = OrbitCamera::new(10.0, 0.0, 0.0).with_zoom(1.0, 5.0, 20.0);
        camera.orbit(0.0, 10.0);
        camera.zoom(100.0);
        assert_eq!(camera.pitch, 1.5);
        assert_eq!(camera.distance, 5.0);
    }

    #[test]
    fn follow_moves_part_way() {
        let mut camera = OrbitCamera::new(10.0, 0.0, 0.0);
        camera.follow(vec3(4.0, 0.0, 0.0), 0.25);
        assert!((camera.target.x - 2.0).abs() < 1e-5);
    }
}

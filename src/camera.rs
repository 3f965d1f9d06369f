use bevy::{
    input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll},
    prelude::*,
};
use std::f32::consts::FRAC_PI_2;

const MIN_PITCH: f32 = 0.05;
const MAX_PITCH: f32 = FRAC_PI_2 - 0.05;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 800.0;
const SCROLL_SENSITIVITY: f32 = 0.25;

/// Damped yaw/pitch state of the rig, in radians.
#[derive(Clone, Copy, Debug)]
struct RotationData {
    target: Vec2,
    current: Vec2,
}

/// Damped zoom state, carried as the log2 of the orbit distance.
#[derive(Clone, Copy, Debug)]
struct ZoomData {
    target: f32,
    current: f32,
}

/// Orbit rig around a single shared look-at target: dragging rotates,
/// scrolling zooms. Rotation and zoom are separate sub-behaviors of the one
/// component, reconciled by one update system.
#[derive(Clone, Debug, Component)]
pub struct OrbitalCamera {
    pub target: Vec3,
    pub rotation_speed: f32,
    pub zoom_speed: f32,
    pub time_to_reach_target: f32,
    rotation: RotationData,
    zoom: ZoomData,
}

impl Default for OrbitalCamera {
    fn default() -> Self {
        Self::from_position(Vec3::new(6.0, 8.0, 14.0), Vec3::ZERO, 1.5)
    }
}

impl OrbitalCamera {
    /// Builds the rig so that its smoothed state starts exactly at the
    /// given eye position.
    pub fn from_position(position: Vec3, target: Vec3, zoom_speed: f32) -> Self {
        let offset = position - target;
        let distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);

        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / distance).asin().clamp(MIN_PITCH, MAX_PITCH);
        let zoom = distance.log2();

        Self {
            target,
            rotation_speed: 0.005,
            zoom_speed,
            time_to_reach_target: 0.1,
            rotation: RotationData {
                target: Vec2::new(yaw, pitch),
                current: Vec2::new(yaw, pitch),
            },
            zoom: ZoomData {
                target: zoom,
                current: zoom,
            },
        }
    }

    /// The eye position of the rig's current (smoothed) state.
    pub fn eye_position(&self) -> Vec3 {
        let Vec2 { x: yaw, y: pitch } = self.rotation.current;
        let distance = self.zoom.current.exp2();

        let offset = distance
            * Vec3::new(
                pitch.cos() * yaw.sin(),
                pitch.sin(),
                pitch.cos() * yaw.cos(),
            );

        self.target + offset
    }
}

pub(crate) fn orbital_camera_controller(
    time: Res<Time>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mut cameras: Query<(&mut Transform, &mut OrbitalCamera)>,
) {
    let Ok((mut transform, mut camera)) = cameras.get_single_mut() else {
        return;
    };

    let smoothing = (time.delta_secs() / camera.time_to_reach_target).min(1.0);

    if mouse_buttons.pressed(MouseButton::Left) && mouse_motion.delta != Vec2::ZERO {
        let delta = mouse_motion.delta * camera.rotation_speed;

        camera.rotation.target.x -= delta.x;
        camera.rotation.target.y =
            (camera.rotation.target.y + delta.y).clamp(MIN_PITCH, MAX_PITCH);
    }

    let scroll = mouse_scroll.delta.y;
    if scroll != 0.0 {
        let delta = scroll * SCROLL_SENSITIVITY * camera.zoom_speed;

        camera.zoom.target = (camera.zoom.target - delta)
            .clamp(MIN_DISTANCE.log2(), MAX_DISTANCE.log2());
    }

    camera.rotation.current = camera.rotation.current.lerp(camera.rotation.target, smoothing);
    camera.zoom.current = camera.zoom.current.lerp(camera.zoom.target, smoothing);

    let target = camera.target;
    *transform = Transform::from_translation(camera.eye_position()).looking_at(target, Vec3::Y);
}

/// Updates the [`OrbitalCamera`] rig of the primary camera every frame.
pub struct OrbitalCameraPlugin;

impl Plugin for OrbitalCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, orbital_camera_controller);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_starts_at_the_requested_position() {
        let position = Vec3::new(6.0, 8.0, 14.0);
        let camera = OrbitalCamera::from_position(position, Vec3::ZERO, 1.5);

        assert!(camera.eye_position().abs_diff_eq(position, 1e-4));
    }

    #[test]
    fn rig_orbits_its_target() {
        let target = Vec3::new(10.0, 0.0, -3.0);
        let camera = OrbitalCamera::from_position(target + Vec3::new(3.0, 4.0, 5.0), target, 1.5);

        let distance = (camera.eye_position() - target).length();
        assert!((distance - Vec3::new(3.0, 4.0, 5.0).length()).abs() < 1e-3);
    }

    #[test]
    fn pitch_never_reaches_the_ground_or_the_pole() {
        let flat = OrbitalCamera::from_position(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, 1.5);
        assert!(flat.eye_position().y > 0.0);

        let top = OrbitalCamera::from_position(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, 1.5);
        let offset = top.eye_position();
        assert!(offset.y < 10.0);
        assert!(offset.xz().length() > 0.0);
    }
}

use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;
use terratile::prelude::*;

fn main() {
    let config = match ViewerConfig::load(DEFAULT_CONFIG_PATH) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error:#}");
            std::process::exit(1);
        }
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "terratile".into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb_u8(254, 254, 254)))
        .insert_resource(config)
        .add_plugins((TerrainTilePlugin, OrbitalCameraPlugin))
        .add_systems(Startup, setup)
        .add_systems(Update, draw_reference_grid)
        .run();
}

fn setup(mut commands: Commands, config: Res<ViewerConfig>) {
    let position = Vec3::from_array(config.camera_position);

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 45.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitalCamera::from_position(position, Vec3::ZERO, config.zoom_speed),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::OVERCAST_DAY,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -1.0, 0.6, 0.0)),
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
    });
}

/// Ground reference: a 12x12 cell grid plus an axes gizmo of length 4.
fn draw_reference_grid(mut gizmos: Gizmos) {
    gizmos.grid(
        Isometry3d::from_rotation(Quat::from_rotation_x(FRAC_PI_2)),
        UVec2::splat(12),
        Vec2::splat(1.0),
        Color::srgb(0.55, 0.55, 0.55),
    );
    gizmos.axes(Transform::IDENTITY, 4.0);
}

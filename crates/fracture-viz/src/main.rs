use fracture_viz::{OrbitCamera, Scene};
use macroquad::prelude::*;
use tracing_subscriber::EnvFilter;

/// Longest simulation step; slower frames run the physics in slow motion.
const MAX_STEP: f32 = 1.0 / 30.0;

#[macroquad::main("Mesh Fracture")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut scene = Scene::new(42);
    let mut camera = OrbitCamera::new(12.0, 0.6, 0.35)
        .with_zoom(1.0, 4.0, 40.0)
        .with_target(vec3(0.0, 3.0, 0.0));

    loop {
        let dt = get_frame_time().min(MAX_STEP);
        camera.handle_input();
        scene.handle_input();
        scene.update(dt);
        camera.follow(scene.focus(), dt);

        clear_background(Color::from_rgba(15, 15, 25, 255));
        set_camera(&camera.to_camera3d());

        draw_grid(20, 1.0, DARKGRAY, Color::from_rgba(40, 40, 50, 255));
        scene.draw();

        set_default_camera();

        draw_text("Mesh Fracture", 10.0, 25.0, 24.0, WHITE);
        scene.draw_ui(50.0);
        draw_text("Drag mouse to rotate, scroll to zoom", 10.0, 135.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 155.0, 16.0, DARKGRAY);

        next_frame().await
    }
}

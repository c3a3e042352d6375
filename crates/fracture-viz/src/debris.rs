//! Destructible pieces and the scene that simulates them.

use ::rand::rngs::StdRng;
use ::rand::{Rng, SeedableRng};
use macroquad::prelude::{
    Color, DARKGRAY, GRAY, KeyCode, ORANGE, Vec3, WHITE, YELLOW, draw_text, is_key_pressed,
    vec3,
};
use mesh_fracture::{
    Aabb, Destructible, FractureConfig, FractureError, Mesh, MeshSource, destruct,
    random_unit_vector,
};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use tracing::{debug, info, warn};

use crate::{draw_fragment, fragment_color};

const GRAVITY: f32 = -9.81;
const FLOOR_HEIGHT: f32 = 0.0;
/// Fraction of vertical speed kept after hitting the floor.
const RESTITUTION: f32 = 0.35;
/// Fraction of horizontal speed and spin kept per floor contact.
const FLOOR_FRICTION: f32 = 0.8;
const SCATTER_SPEED: f32 = 3.0;
const MAX_SPIN: f32 = 4.0;
/// Pieces this many fractures deep are not broken any further.
const MAX_GENERATION: u32 = 4;
const MAX_GRANULARITY: i32 = 8;
const SPAWN_HEIGHT: f32 = 3.0;

/// Starting objects for the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    #[default]
    Crate,
    Ball,
    Gem,
}

impl Shape {
    pub fn next(self) -> Self {
        match self {
            Shape::Crate => Shape::Ball,
            Shape::Ball => Shape::Gem,
            Shape::Gem => Shape::Crate,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Shape::Crate => "crate",
            Shape::Ball => "ball",
            Shape::Gem => "gem",
        }
    }

    /// Unscaled mesh, centered on the origin.
    pub fn mesh(self) -> Mesh {
        match self {
            Shape::Crate => Mesh::cube(Point3::origin(), 1.6),
            Shape::Ball => Mesh::uv_sphere(Point3::origin(), 1.0, 24, 12),
            Shape::Gem => Mesh::octahedron(Point3::origin(), 1.2),
        }
    }

    /// Local scale applied when the piece is destructed.
    pub fn scale(self) -> Vector3<f32> {
        match self {
            Shape::Crate => Vector3::new(1.5, 1.0, 1.0),
            Shape::Ball => Vector3::repeat(1.0),
            Shape::Gem => Vector3::new(1.0, 1.6, 1.0),
        }
    }
}

/// A rigid piece of debris that can be broken further.
pub struct Piece {
    mesh: Mesh,
    bounds: Aabb,
    scale: Vector3<f32>,
    color: Color,
    /// Distance from the origin to the farthest vertex, after scaling.
    radius: f32,
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub velocity: Vector3<f32>,
    /// Angular velocity, radians per second about each axis.
    pub spin: Vector3<f32>,
    pub generation: u32,
    fragments: Option<Vec<Mesh>>,
}

impl Piece {
    /// Creates a resting piece at `position`. Returns `None` for a mesh
    /// without vertices.
    pub fn new(mesh: Mesh, scale: Vector3<f32>, position: Point3<f32>) -> Option<Self> {
        let bounds = mesh.bounds()?;
        let radius = mesh
            .vertices()
            .iter()
            .map(|v| v.coords.component_mul(&scale).norm())
            .fold(0.0, f32::max);
        Some(Self {
            color: fragment_color(&mesh),
            mesh,
            bounds,
            scale,
            radius,
            position,
            rotation: UnitQuaternion::identity(),
            velocity: Vector3::zeros(),
            spin: Vector3::zeros(),
            generation: 0,
            fragments: None,
        })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Volume in world units.
    pub fn volume(&self) -> f32 {
        self.mesh.signed_volume() * self.scale.x * self.scale.y * self.scale.z
    }

    fn transform(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.rotation)
    }

    /// Advances the piece by `dt` seconds under gravity, bouncing off the floor.
    pub fn step(&mut self, dt: f32) {
        self.velocity.y += GRAVITY * dt;
        self.position += self.velocity * dt;
        self.rotation = UnitQuaternion::from_scaled_axis(self.spin * dt) * self.rotation;

        let lowest = FLOOR_HEIGHT + self.radius;
        if self.position.y < lowest {
            self.position.y = lowest;
            if self.velocity.y < 0.0 {
                self.velocity.y = -self.velocity.y * RESTITUTION;
                self.velocity.x *= FLOOR_FRICTION;
                self.velocity.z *= FLOOR_FRICTION;
                self.spin *= FLOOR_FRICTION;
            }
        }
    }

    /// Breaks the piece into child pieces thrown outwards.
    ///
    /// Children are re-centered on their own centroid and placed where that
    /// centroid sits in the world.
    pub fn shatter<R: Rng + ?Sized>(
        &mut self,
        config: &FractureConfig,
        rng: &mut R,
    ) -> Result<Vec<Piece>, FractureError> {
        destruct(self, config)?;
        let fragments = self.fragments.take().unwrap_or_default();
        let transform = self.transform();

        let children = fragments
            .into_iter()
            .filter_map(|fragment| {
                let center = fragment.centroid()?;
                let local = fragment.translated(&-center.coords);
                let mut child = Piece::new(local, Vector3::repeat(1.0), transform * center)?;
                child.rotation = self.rotation;
                child.velocity = self.velocity + random_unit_vector(rng) * SCATTER_SPEED;
                child.spin = random_unit_vector(rng) * rng.random_range(0.0..MAX_SPIN);
                child.generation = self.generation + 1;
                Some(child)
            })
            .collect();
        Ok(children)
    }

    pub fn draw(&self) {
        draw_fragment(&self.mesh.scaled(&self.scale), &self.transform(), self.color);
    }
}

impl Destructible for Piece {
    fn pre_destruct(&mut self) {
        debug!(generation = self.generation, "breaking piece");
        self.fragments = None;
    }

    fn mesh_source(&self) -> MeshSource {
        MeshSource {
            mesh: self.mesh.clone(),
            bounds: self.bounds,
        }
    }

    fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    fn post_destruct(&mut self, fragments: Vec<Mesh>) {
        self.fragments = Some(fragments);
    }
}

/// All pieces in the demo, plus the fracture settings used on them.
pub struct Scene {
    pieces: Vec<Piece>,
    shape: Shape,
    config: FractureConfig,
    paused: bool,
    rng: StdRng,
    last_error: Option<FractureError>,
}

impl Scene {
    pub fn new(seed: u64) -> Self {
        let mut scene = Self {
            pieces: Vec::new(),
            shape: Shape::default(),
            config: FractureConfig::default(),
            paused: false,
            rng: StdRng::seed_from_u64(seed),
            last_error: None,
        };
        scene.reset();
        scene
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn config(&self) -> &FractureConfig {
        &self.config
    }

    /// Replaces everything with one whole object of the current shape.
    pub fn reset(&mut self) {
        let position = Point3::new(0.0, SPAWN_HEIGHT, 0.0);
        self.pieces = Piece::new(self.shape.mesh(), self.shape.scale(), position)
            .into_iter()
            .collect();
        self.last_error = None;
        info!(shape = self.shape.name(), "scene reset");
    }

    pub fn set_granularity(&mut self, granularity: i32) {
        self.config = self
            .config
            .with_granularity(granularity.clamp(0, MAX_GRANULARITY));
    }

    /// Breaks every piece that has not reached the generation limit.
    ///
    /// Each break gets its own seed from the scene's generator, so a run is
    /// reproducible from the scene seed. Pieces that fail to break stay whole.
    pub fn shatter_all(&mut self) -> usize {
        let mut next = Vec::with_capacity(self.pieces.len());
        let mut broken = 0;

        for mut piece in std::mem::take(&mut self.pieces) {
            if piece.generation >= MAX_GENERATION {
                next.push(piece);
                continue;
            }
            let config = self.config.with_seed(self.rng.random());
            match piece.shatter(&config, &mut self.rng) {
                Ok(children) if !children.is_empty() => {
                    broken += 1;
                    next.extend(children);
                }
                Ok(_) => next.push(piece),
                Err(error) => {
                    warn!(%error, "piece could not be broken");
                    self.last_error = Some(error);
                    next.push(piece);
                }
            }
        }

        self.pieces = next;
        info!(broken, pieces = self.pieces.len(), "shattered");
        broken
    }

    pub fn update(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        for piece in &mut self.pieces {
            piece.step(dt);
        }
    }

    /// Average piece position, used as the camera focus.
    pub fn focus(&self) -> Vec3 {
        if self.pieces.is_empty() {
            return vec3(0.0, SPAWN_HEIGHT, 0.0);
        }
        let sum = self
            .pieces
            .iter()
            .fold(Vector3::zeros(), |sum, p| sum + p.position.coords);
        let mean = sum / self.pieces.len() as f32;
        vec3(mean.x, mean.y, mean.z)
    }

    /// Total volume of all pieces.
    pub fn volume(&self) -> f32 {
        self.pieces.iter().map(Piece::volume).sum()
    }

    pub fn handle_input(&mut self) {
        if is_key_pressed(KeyCode::Space) {
            self.shatter_all();
        }
        if is_key_pressed(KeyCode::R) {
            self.reset();
        }
        if is_key_pressed(KeyCode::Tab) {
            self.shape = self.shape.next();
            self.reset();
        }
        if is_key_pressed(KeyCode::P) {
            self.paused = !self.paused;
        }
        if is_key_pressed(KeyCode::Equal) || is_key_pressed(KeyCode::KpAdd) {
            self.set_granularity(self.config.granularity + 1);
        }
        if is_key_pressed(KeyCode::Minus) || is_key_pressed(KeyCode::KpSubtract) {
            self.set_granularity(self.config.granularity - 1);
        }
    }

    pub fn draw(&self) {
        for piece in &self.pieces {
            piece.draw();
        }
    }

    pub fn draw_ui(&self, y_offset: f32) {
        let deepest = self.pieces.iter().map(|p| p.generation).max().unwrap_or(0);
        draw_text(
            &format!(
                "Shape: {} | Pieces: {} | Generation: {}/{}",
                self.shape.name(),
                self.pieces.len(),
                deepest,
                MAX_GENERATION
            ),
            10.0,
            y_offset,
            18.0,
            WHITE,
        );
        draw_text(
            &format!(
                "Granularity: {} | Volume: {:.3}",
                self.config.granularity,
                self.volume()
            ),
            10.0,
            y_offset + 20.0,
            18.0,
            YELLOW,
        );
        if let Some(error) = &self.last_error {
            draw_text(&format!("Last error: {error}"), 10.0, y_offset + 40.0, 18.0, ORANGE);
        }
        draw_text(
            "[Space] shatter | [R]eset | [Tab] shape | [+/-] granularity | [P]ause",
            10.0,
            y_offset + 60.0,
            16.0,
            if self.paused { GRAY } else { DARKGRAY },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_scene() -> Scene {
        Scene::new(7)
    }

    #[test]
    fn reset_spawns_one_whole_piece() {
        let scene = make_scene();
        assert_eq!(scene.pieces().len(), 1);
        assert_eq!(scene.pieces()[0].generation, 0);
    }

    #[test]
    fn shatter_conserves_volume() {
        let mut scene = make_scene();
        let before = scene.volume();

        let broken = scene.shatter_all();

        assert_eq!(broken, 1);
        assert!(scene.pieces().len() > 1);
        assert!(scene.pieces().iter().all(|p| p.generation == 1));
        assert_relative_eq!(scene.volume(), before, epsilon = 1e-3);
    }

    #[test]
    fn zero_granularity_leaves_piece_whole() {
        let mut scene = make_scene();
        scene.set_granularity(0);

        scene.shatter_all();

        assert_eq!(scene.pieces().len(), 1);
        assert_eq!(scene.pieces()[0].generation, 1);
    }

    #[test]
    fn granularity_is_clamped() {
        let mut scene = make_scene();
        scene.set_granularity(-4);
        assert_eq!(scene.config().granularity, 0);
        scene.set_granularity(100);
        assert_eq!(scene.config().granularity, MAX_GRANULARITY);
    }

    #[test]
    fn piece_comes_to_rest_on_the_floor() {
        let mesh = Mesh::cube(Point3::origin(), 1.0);
        let mut piece = Piece::new(mesh, Vector3::repeat(1.0), Point3::new(0.0, 2.0, 0.0)).unwrap();

        for _ in 0..600 {
            piece.step(1.0 / 60.0);
        }

        assert!(piece.position.y >= piece.radius - 1e-5);
        assert!(piece.position.y < piece.radius + 0.1);
    }

    #[test]
    fn children_keep_their_world_position() {
        let mesh = Mesh::cube(Point3::origin(), 2.0);
        let mut piece =
            Piece::new(mesh, Vector3::repeat(1.0), Point3::new(10.0, 5.0, 0.0)).unwrap();
        let config = FractureConfig::default().with_granularity(1).with_seed(4);
        let mut rng = StdRng::seed_from_u64(1);

        let children = piece.shatter(&config, &mut rng).unwrap();

        for child in &children {
            assert!((child.position - piece.position).norm() < 2.0);
        }
        let volume: f32 = children.iter().map(Piece::volume).sum();
        assert_relative_eq!(volume, 8.0, epsilon = 1e-3);
    }
}

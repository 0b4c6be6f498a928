//! Core rendering engine.
//!
//! The [`Engine`] struct is the main entry point for the renderer. It owns the
//! camera, the mesh and its material, the frame buffers and the mode state,
//! and drives one frame at a time: [`Engine::update`] advances the camera and
//! mesh, [`Engine::render`] rasterizes the mesh into the color buffer.

use std::fmt;
use std::path::Path;

use log::{debug, info};

use crate::camera::{Camera, CameraInput};
use crate::colors::{self, ColorRgb};
use crate::light::DirectionalLight;
use crate::math::vec2::Vec2;
use crate::mesh::Mesh;
use crate::render::pipeline::ndc_to_raster;
use crate::render::{
    primitives, EdgeFunctionRasterizer, FlatShader, FrameBuffer, PixelShader, Renderer,
    SurfaceShader, TriangleOutcome,
};
use crate::texture::Material;

/// What the rasterizer writes into the color buffer (key: F4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Lit, textured surfaces
    #[default]
    Normal,
    /// Depth buffer as grayscale, stretched over the far end of the range
    DepthBuffer,
    /// Solid white bounding box of every surviving triangle
    BoundingBox,
}

impl RenderMode {
    /// The next mode in the cycle, wrapping around.
    pub fn next(self) -> Self {
        match self {
            RenderMode::Normal => RenderMode::DepthBuffer,
            RenderMode::DepthBuffer => RenderMode::BoundingBox,
            RenderMode::BoundingBox => RenderMode::Normal,
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Normal => write!(f, "Normal"),
            RenderMode::DepthBuffer => write!(f, "DepthBuffer"),
            RenderMode::BoundingBox => write!(f, "BoundingBox"),
        }
    }
}

/// Which lighting terms the surface shader outputs (key: F5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightingMode {
    /// Diffuse plus specular
    #[default]
    Combined,
    Diffuse,
    /// Only the cosine term, as gray
    ObservedArea,
    Specular,
}

impl LightingMode {
    /// The next mode in the cycle, wrapping around.
    pub fn next(self) -> Self {
        match self {
            LightingMode::Combined => LightingMode::Diffuse,
            LightingMode::Diffuse => LightingMode::ObservedArea,
            LightingMode::ObservedArea => LightingMode::Specular,
            LightingMode::Specular => LightingMode::Combined,
        }
    }

    /// True for the modes that sample the gloss and specular maps.
    pub fn uses_specular(self) -> bool {
        matches!(self, LightingMode::Combined | LightingMode::Specular)
    }
}

impl fmt::Display for LightingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightingMode::Combined => write!(f, "Combined"),
            LightingMode::Diffuse => write!(f, "Diffuse"),
            LightingMode::ObservedArea => write!(f, "ObservedArea"),
            LightingMode::Specular => write!(f, "Specular"),
        }
    }
}

/// A discrete state change requested by the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    RenderMode,
    LightingMode,
    NormalMapping,
    Rotation,
}

/// Mode selection for the next frames.
///
/// Every combination of fields is valid; toggles only pick which shading
/// branch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderState {
    render_mode: RenderMode,
    lighting_mode: LightingMode,
    normal_mapping: bool,
    rotating: bool,
}

impl RenderState {
    pub fn new(normal_mapping: bool, rotating: bool) -> Self {
        Self {
            normal_mapping,
            rotating,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, toggle: Toggle) {
        match toggle {
            Toggle::RenderMode => self.render_mode = self.render_mode.next(),
            Toggle::LightingMode => self.lighting_mode = self.lighting_mode.next(),
            Toggle::NormalMapping => self.normal_mapping = !self.normal_mapping,
            Toggle::Rotation => self.rotating = !self.rotating,
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn lighting_mode(&self) -> LightingMode {
        self.lighting_mode
    }

    pub fn normal_mapping(&self) -> bool {
        self.normal_mapping
    }

    pub fn rotating(&self) -> bool {
        self.rotating
    }
}

/// Triangle counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Triangles produced by the topology walk
    pub submitted: usize,
    /// Triangles that reached the pixel loop
    pub rasterized: usize,
    /// Degenerate, out-of-frustum and back-facing triangles
    pub culled: usize,
}

pub struct Engine {
    renderer: Renderer,
    rasterizer: EdgeFunctionRasterizer,
    camera: Camera,
    mesh: Mesh,
    material: Material,
    light: DirectionalLight,
    state: RenderState,
    /// Radians per second while auto-rotation is on
    rotation_speed: f32,
    raster_positions: Vec<Vec2>,
}

impl Engine {
    /// Creates an engine rendering `mesh` with `material` into a
    /// `width` x `height` buffer.
    ///
    /// The camera's aspect ratio is set to match the buffer.
    pub fn new(
        width: u32,
        height: u32,
        mut camera: Camera,
        mesh: Mesh,
        material: Material,
    ) -> Self {
        camera.set_aspect_ratio(width as f32 / height as f32);
        Self {
            renderer: Renderer::new(width, height),
            rasterizer: EdgeFunctionRasterizer::new(),
            camera,
            raster_positions: Vec::with_capacity(mesh.vertices().len()),
            mesh,
            material,
            light: DirectionalLight::default(),
            state: RenderState::default(),
            rotation_speed: 1.0,
        }
    }

    pub fn with_state(mut self, state: RenderState) -> Self {
        self.state = state;
        self
    }

    pub fn with_light(mut self, light: DirectionalLight) -> Self {
        self.light = light;
        self
    }

    pub fn with_rotation_speed(mut self, radians_per_second: f32) -> Self {
        self.rotation_speed = radians_per_second;
        self
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn width(&self) -> u32 {
        self.renderer.width()
    }

    pub fn height(&self) -> u32 {
        self.renderer.height()
    }

    /// Applies a mode toggle; it takes effect on the next [`Engine::render`].
    pub fn toggle(&mut self, toggle: Toggle) {
        self.state.apply(toggle);
        match toggle {
            Toggle::RenderMode => info!("Render mode: {}", self.state.render_mode()),
            Toggle::LightingMode => info!("Lighting mode: {}", self.state.lighting_mode()),
            Toggle::NormalMapping => info!(
                "Normal mapping: {}",
                if self.state.normal_mapping() { "on" } else { "off" }
            ),
            Toggle::Rotation => info!(
                "Mesh rotation: {}",
                if self.state.rotating() { "on" } else { "off" }
            ),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
        self.camera.set_aspect_ratio(width as f32 / height as f32);
        info!("Resized frame buffer to {}x{}", width, height);
    }

    /// Advances the camera and, when auto-rotation is on, spins the mesh.
    pub fn update(&mut self, delta_seconds: f32, input: &CameraInput) {
        self.camera.update(delta_seconds, input);
        if self.state.rotating() {
            self.mesh.rotate(self.rotation_speed * delta_seconds);
        }
    }

    /// Renders the current frame into the color buffer.
    ///
    /// # Panics
    ///
    /// Panics in [`RenderMode::Normal`] if the lighting mode needs gloss and
    /// specular maps the material doesn't have.
    pub fn render(&mut self) -> FrameStats {
        self.renderer.clear(colors::BACKGROUND);
        self.renderer.clear_depth();

        let (width, height) = (self.renderer.width(), self.renderer.height());
        self.mesh
            .transform(self.camera.view_matrix(), self.camera.projection_matrix());
        ndc_to_raster(
            self.mesh.vertices_out(),
            width,
            height,
            &mut self.raster_positions,
        );

        let mode = self.state.render_mode();
        let pass = MeshPass {
            rasterizer: &self.rasterizer,
            mesh: &self.mesh,
            raster: &self.raster_positions,
            camera: &self.camera,
            mode,
        };
        let mut buffer = self.renderer.as_framebuffer();

        let stats = if mode == RenderMode::Normal {
            let shader = SurfaceShader::new(
                &self.material,
                self.light,
                self.state.lighting_mode(),
                self.state.normal_mapping(),
            );
            pass.draw(&shader, &mut buffer)
        } else {
            // Neither debug view runs the shader
            pass.draw(&FlatShader::new(ColorRgb::WHITE), &mut buffer)
        };

        debug!(
            "Frame: {} triangles submitted, {} rasterized, {} culled",
            stats.submitted, stats.rasterized, stats.culled
        );
        stats
    }

    /// Returns the rendered frame as bytes (ARGB8888 format)
    pub fn frame_buffer(&self) -> &[u8] {
        self.renderer.as_bytes()
    }

    /// Returns the rendered frame as packed ARGB8888 pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        self.renderer.pixels()
    }

    /// Writes the current color buffer to an image file.
    pub fn save_frame<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.renderer.save_to_file(path)
    }
}

/// Borrowed per-frame inputs of the primitive walk.
struct MeshPass<'a> {
    rasterizer: &'a EdgeFunctionRasterizer,
    mesh: &'a Mesh,
    raster: &'a [Vec2],
    camera: &'a Camera,
    mode: RenderMode,
}

impl MeshPass<'_> {
    fn draw<S: PixelShader>(&self, shader: &S, buffer: &mut FrameBuffer) -> FrameStats {
        let mut stats = FrameStats::default();
        for triangle in primitives(self.mesh.indices(), self.mesh.topology()) {
            stats.submitted += 1;
            let outcome = self.rasterizer.draw_triangle(
                triangle,
                self.mesh.vertices_out(),
                self.raster,
                self.camera,
                self.mode,
                shader,
                buffer,
            );
            match outcome {
                TriangleOutcome::Rasterized => stats.rasterized += 1,
                _ => stats.culled += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Mat4, Vec3};
    use crate::mesh::{PrimitiveTopology, Vertex};
    use crate::texture::Texture;
    use approx::assert_relative_eq;

    const WIDTH: u32 = 160;
    const HEIGHT: u32 = 120;

    /// A 2x2 quad in the XY plane facing the default camera, vertices ordered
    /// bottom-left, top-left, top-right, bottom-right.
    fn quad_vertices() -> Vec<Vertex> {
        let normal = -Vec3::FORWARD;
        [(-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (1.0, -1.0)]
            .iter()
            .map(|&(x, y)| {
                Vertex::new(
                    Vec3::new(x, y, 0.0),
                    Vec2::new((x + 1.0) / 2.0, (1.0 - y) / 2.0),
                    normal,
                    Vec3::RIGHT,
                )
            })
            .collect()
    }

    fn engine_with(indices: Vec<u32>, topology: PrimitiveTopology) -> Engine {
        let camera = Camera::new(60.0, Vec3::new(0.0, 0.0, -10.0), 1.0);
        let mesh = Mesh::new(quad_vertices(), indices, topology);
        let material = Material::new(Texture::solid(ColorRgb::WHITE));
        let mut engine = Engine::new(WIDTH, HEIGHT, camera, mesh, material);
        engine.update(0.0, &CameraInput::default());
        engine
    }

    fn engine() -> Engine {
        engine_with(vec![0, 1, 2, 0, 2, 3], PrimitiveTopology::TriangleList)
    }

    fn pixel(engine: &Engine, x: u32, y: u32) -> u32 {
        engine.pixels()[(y * engine.width() + x) as usize]
    }

    #[test]
    fn render_mode_cycles_with_period_three() {
        let mut state = RenderState::default();
        assert_eq!(state.render_mode(), RenderMode::Normal);
        state.apply(Toggle::RenderMode);
        assert_eq!(state.render_mode(), RenderMode::DepthBuffer);
        state.apply(Toggle::RenderMode);
        assert_eq!(state.render_mode(), RenderMode::BoundingBox);
        state.apply(Toggle::RenderMode);
        assert_eq!(state.render_mode(), RenderMode::Normal);
    }

    #[test]
    fn lighting_mode_cycles_with_period_four() {
        let mut state = RenderState::default();
        let mut seen = vec![state.lighting_mode()];
        for _ in 0..4 {
            state.apply(Toggle::LightingMode);
            seen.push(state.lighting_mode());
        }
        assert_eq!(
            seen,
            vec![
                LightingMode::Combined,
                LightingMode::Diffuse,
                LightingMode::ObservedArea,
                LightingMode::Specular,
                LightingMode::Combined,
            ]
        );
    }

    #[test]
    fn boolean_toggles_are_independent() {
        let mut state = RenderState::new(false, true);
        state.apply(Toggle::NormalMapping);
        assert!(state.normal_mapping());
        assert!(state.rotating());
        state.apply(Toggle::Rotation);
        assert!(!state.rotating());
        assert_eq!(state.render_mode(), RenderMode::Normal);
        assert_eq!(state.lighting_mode(), LightingMode::Combined);
    }

    #[test]
    fn mesh_at_origin_renders_at_buffer_center() {
        let mut engine = engine().with_state(RenderState::default());
        engine.toggle(Toggle::LightingMode); // Diffuse, no specular maps needed

        let stats = engine.render();
        assert_eq!(
            stats,
            FrameStats {
                submitted: 2,
                rasterized: 2,
                culled: 0,
            }
        );
        assert_ne!(pixel(&engine, WIDTH / 2, HEIGHT / 2), colors::BACKGROUND);
        assert_eq!(pixel(&engine, 0, 0), colors::BACKGROUND);
        assert_eq!(pixel(&engine, WIDTH - 1, HEIGHT - 1), colors::BACKGROUND);
    }

    #[test]
    fn observed_area_matches_light_angle() {
        let mut engine = engine();
        engine.toggle(Toggle::LightingMode);
        engine.toggle(Toggle::LightingMode);
        assert_eq!(engine.state().lighting_mode(), LightingMode::ObservedArea);
        engine.render();

        // Normal -Z against the default light gives cos = 0.577
        let expected = ColorRgb::gray(DirectionalLight::default().observed_area(-Vec3::FORWARD));
        let center = ColorRgb::from_argb(pixel(&engine, WIDTH / 2, HEIGHT / 2));
        assert_relative_eq!(center.r, expected.r, epsilon = 1.0 / 255.0);
    }

    #[test]
    fn strip_topology_covers_the_same_quad() {
        let mut list = engine();
        let mut strip = engine_with(vec![1, 2, 0, 3], PrimitiveTopology::TriangleStrip);
        for engine in [&mut list, &mut strip] {
            engine.toggle(Toggle::RenderMode);
        }

        assert_eq!(strip.render().rasterized, 2);
        list.render();
        assert_eq!(list.pixels(), strip.pixels());
    }

    #[test]
    fn debug_modes_ignore_missing_specular_maps() {
        // Combined lighting would panic in Normal mode without gloss/specular
        let mut engine = engine();
        engine.toggle(Toggle::RenderMode);
        engine.render();
        assert_ne!(pixel(&engine, WIDTH / 2, HEIGHT / 2), colors::BACKGROUND);

        engine.toggle(Toggle::RenderMode);
        engine.render();
        assert_eq!(pixel(&engine, WIDTH / 2, HEIGHT / 2), 0xFFFF_FFFF);
    }

    #[test]
    #[should_panic(expected = "requires gloss and specular maps")]
    fn combined_lighting_without_maps_panics() {
        engine().render();
    }

    #[test]
    fn camera_behind_the_quad_sees_nothing() {
        let mut engine = engine();
        engine.toggle(Toggle::RenderMode);
        // Turn around: the quad is now behind the camera
        let half_turn = CameraInput {
            yaw: 1.0,
            ..Default::default()
        };
        let seconds = std::f32::consts::PI / 5.0_f32.to_radians();
        engine.update(seconds, &half_turn);

        let stats = engine.render();
        assert_eq!(stats.rasterized, 0);
        assert!(engine.pixels().iter().all(|&p| p == colors::BACKGROUND));
    }

    #[test]
    fn rotation_only_advances_when_enabled() {
        let mut engine = engine();
        engine.update(0.5, &CameraInput::default());
        assert_eq!(engine.mesh().world_matrix(), Mat4::identity());

        engine.toggle(Toggle::Rotation);
        engine.update(0.5, &CameraInput::default());
        let expected = Mat4::rotation_y(0.5);
        for row in 0..4 {
            for col in 0..4 {
                assert_relative_eq!(
                    engine.mesh().world_matrix().get(row, col),
                    expected.get(row, col),
                    epsilon = 1e-6
                );
            }
        }
    }

    #[test]
    fn resize_updates_buffers_and_aspect_ratio() {
        let mut engine = engine();
        engine.resize(200, 100);
        assert_eq!(engine.pixels().len(), 200 * 100);
        assert_eq!(engine.frame_buffer().len(), 200 * 100 * 4);
        assert_relative_eq!(engine.camera().aspect_ratio(), 2.0);
    }
}

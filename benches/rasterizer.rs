use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use softrast::camera::{Camera, CameraInput};
use softrast::colors::{ColorRgb, BACKGROUND};
use softrast::engine::{Engine, RenderMode, Toggle};
use softrast::math::{Vec2, Vec3, Vec4};
use softrast::mesh::{Mesh, PrimitiveTopology, Vertex, VertexOut};
use softrast::render::{EdgeFunctionRasterizer, FlatShader, FrameBuffer};
use softrast::texture::{Material, Texture};

const BUFFER_WIDTH: u32 = 800;
const BUFFER_HEIGHT: u32 = 600;

struct Buffers {
    color: Vec<u32>,
    depth: Vec<f32>,
}

impl Buffers {
    fn new() -> Self {
        let size = (BUFFER_WIDTH * BUFFER_HEIGHT) as usize;
        Self {
            color: vec![BACKGROUND; size],
            depth: vec![f32::INFINITY; size],
        }
    }

    fn frame(&mut self) -> FrameBuffer<'_> {
        self.depth.fill(f32::INFINITY);
        FrameBuffer::new(&mut self.color, &mut self.depth, BUFFER_WIDTH, BUFFER_HEIGHT)
    }
}

fn camera() -> Camera {
    let mut camera = Camera::new(
        60.0,
        Vec3::new(0.0, 0.0, -10.0),
        BUFFER_WIDTH as f32 / BUFFER_HEIGHT as f32,
    );
    camera.update(0.0, &CameraInput::default());
    camera
}

/// Screen-space triangles with transformed vertices to match, clockwise on screen.
fn screen_triangles(points: &[[(f32, f32); 3]]) -> (Vec<VertexOut>, Vec<Vec2>) {
    let mut vertices = Vec::new();
    let mut raster = Vec::new();
    for triangle in points {
        for &(x, y) in triangle {
            vertices.push(VertexOut {
                position: Vec4::new(
                    x / BUFFER_WIDTH as f32 * 2.0 - 1.0,
                    1.0 - y / BUFFER_HEIGHT as f32 * 2.0,
                    0.99,
                    10.0,
                ),
                normal: -Vec3::FORWARD,
                tangent: Vec3::RIGHT,
                view_direction: Vec3::FORWARD,
                ..Default::default()
            });
            raster.push(Vec2::new(x, y));
        }
    }
    (vertices, raster)
}

fn benchmark_single_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_triangle");

    let rasterizer = EdgeFunctionRasterizer::new();
    let camera = camera();
    let shader = FlatShader::new(ColorRgb::new(1.0, 0.0, 0.0));

    for (name, points) in [
        ("small", [(100.0, 100.0), (120.0, 100.0), (110.0, 120.0)]),
        ("medium", [(100.0, 100.0), (300.0, 100.0), (200.0, 300.0)]),
        ("large", [(50.0, 50.0), (750.0, 100.0), (400.0, 550.0)]),
    ] {
        let triangle = screen_triangles(&[points]);

        for mode in [RenderMode::Normal, RenderMode::DepthBuffer] {
            let id = BenchmarkId::new(format!("{mode}"), name);
            group.bench_with_input(id, &triangle, |b, (vertices, raster)| {
                let mut buffers = Buffers::new();
                b.iter(|| {
                    let mut fb = buffers.frame();
                    rasterizer.draw_triangle(
                        black_box([0, 1, 2]),
                        vertices,
                        raster,
                        &camera,
                        mode,
                        &shader,
                        &mut fb,
                    )
                });
            });
        }
    }

    group.finish();
}

fn benchmark_many_triangles(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_triangles");

    let rasterizer = EdgeFunctionRasterizer::new();
    let camera = camera();
    let shader = FlatShader::new(ColorRgb::new(1.0, 0.0, 0.0));

    // Generate a grid of small triangles
    let points: Vec<[(f32, f32); 3]> = (0..20)
        .flat_map(|row| {
            (0..20).map(move |col| {
                let x = col as f32 * 40.0;
                let y = row as f32 * 30.0;
                [(x, y), (x + 35.0, y), (x + 17.5, y + 25.0)]
            })
        })
        .collect();
    let (vertices, raster) = screen_triangles(&points);

    group.bench_function("edge_function_400_triangles", |b| {
        let mut buffers = Buffers::new();
        b.iter(|| {
            let mut fb = buffers.frame();
            for i in 0..points.len() as u32 {
                rasterizer.draw_triangle(
                    black_box([i * 3, i * 3 + 1, i * 3 + 2]),
                    &vertices,
                    &raster,
                    &camera,
                    RenderMode::Normal,
                    &shader,
                    &mut fb,
                );
            }
        });
    });

    group.finish();
}

/// A tessellated square facing the camera, `cells` x `cells` quads.
fn grid_mesh(cells: u32) -> Mesh {
    let mut vertices = Vec::new();
    for row in 0..=cells {
        for col in 0..=cells {
            let u = col as f32 / cells as f32;
            let v = row as f32 / cells as f32;
            vertices.push(Vertex::new(
                Vec3::new(u * 8.0 - 4.0, 4.0 - v * 8.0, 0.0),
                Vec2::new(u, v),
                -Vec3::FORWARD,
                Vec3::RIGHT,
            ));
        }
    }

    let stride = cells + 1;
    let mut indices = Vec::new();
    for row in 0..cells {
        for col in 0..cells {
            let top_left = row * stride + col;
            let bottom_left = top_left + stride;
            indices.extend_from_slice(&[bottom_left, top_left, top_left + 1]);
            indices.extend_from_slice(&[bottom_left, top_left + 1, bottom_left + 1]);
        }
    }

    Mesh::new(vertices, indices, PrimitiveTopology::TriangleList)
}

fn benchmark_full_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_frame");

    let checker: Vec<u32> = (0..64 * 64)
        .map(|i| if (i / 64 + i % 64) % 2 == 0 { 0xFFC0_C0C0 } else { 0xFF40_4040 })
        .collect();
    let material = Material::new(Texture::from_pixels(64, 64, checker))
        .with_gloss(Texture::solid(ColorRgb::gray(0.5)))
        .with_specular(Texture::solid(ColorRgb::WHITE));

    let mut engine = Engine::new(
        BUFFER_WIDTH,
        BUFFER_HEIGHT,
        camera(),
        grid_mesh(32),
        material,
    );
    engine.update(0.0, &CameraInput::default());

    group.bench_function("grid_2048_triangles_combined", |b| {
        b.iter(|| black_box(engine.render()));
    });

    engine.toggle(Toggle::RenderMode);
    group.bench_function("grid_2048_triangles_depth", |b| {
        b.iter(|| black_box(engine.render()));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_triangle,
    benchmark_many_triangles,
    benchmark_full_frame
);
criterion_main!(benches);

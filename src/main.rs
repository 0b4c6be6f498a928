use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use softrast::config::Config;
use softrast::prelude::*;

/// Fixed time step of headless frames, in seconds
const HEADLESS_DELTA: f32 = 1.0 / 60.0;

#[derive(Parser, Debug)]
#[command(name = "softrast")]
#[command(about = "CPU software rasterizer for textured, normal-mapped meshes")]
struct Args {
    /// Configuration file (TOML). Defaults to rasterizer.toml when present
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Render without opening a window and save the last frame
    #[arg(long)]
    headless: bool,

    /// Number of frames to render in headless mode
    #[arg(long, value_name = "N", default_value_t = 1)]
    frames: u32,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = Config::discover(args.config.as_deref())?;
    let mut engine = build_engine(&config)?;

    if args.headless {
        run_headless(&mut engine, &config, args.frames)
    } else {
        run_interactive(&mut engine, &config)
    }
}

fn build_engine(config: &Config) -> Result<Engine, Box<dyn Error>> {
    let (width, height) = (config.window.width, config.window.height);

    let textures = &config.textures;
    let material = Material::load(
        &textures.diffuse,
        textures.normal(),
        textures.gloss(),
        textures.specular(),
    )?;

    let mesh = Mesh::from_obj(&config.mesh.path, config.mesh.obj_options())?
        .with_world_matrix(config.mesh.world_matrix());

    let camera = config.camera.build(width as f32 / height as f32);
    let state = RenderState::new(config.render.normal_mapping, config.mesh.auto_rotate);

    Ok(Engine::new(width, height, camera, mesh, material)
        .with_state(state)
        .with_rotation_speed(config.mesh.rotation_speed))
}

fn run_headless(engine: &mut Engine, config: &Config, frames: u32) -> Result<(), Box<dyn Error>> {
    info!("Rendering {} headless frame(s)", frames);
    for _ in 0..frames.max(1) {
        engine.update(HEADLESS_DELTA, &CameraInput::default());
        engine.render();
    }
    engine.save_frame(&config.render.output)?;
    Ok(())
}

fn run_interactive(engine: &mut Engine, config: &Config) -> Result<(), Box<dyn Error>> {
    let mut window = Window::new(
        &config.window.title,
        config.window.width,
        config.window.height,
    )?;
    let mut frame_limiter = FrameLimiter::new(&window, config.window.fps);
    let mut fps_counter = FpsCounter::new();
    let mouse_scale = config.camera.mouse_move_speed / config.camera.move_speed;

    info!("Controls: WASD/ZQSD move, mouse drag to look, F4 render mode, F5 lighting mode");
    info!("          F6 normal mapping, F7 rotation, X screenshot, Esc quit");

    'running: loop {
        let delta_ms = frame_limiter.wait_and_get_delta(&window);
        fps_counter.tick(delta_ms);

        for event in window.poll_events() {
            match event {
                WindowEvent::Quit => break 'running,
                WindowEvent::Resize(width, height) => {
                    window.resize(width, height)?;
                    engine.resize(width, height);
                }
                WindowEvent::Toggle(toggle) => engine.toggle(toggle),
                WindowEvent::Screenshot => {
                    if let Err(err) = engine.save_frame(&config.render.output) {
                        error!("Screenshot failed: {}", err);
                    }
                }
                WindowEvent::None => {}
            }
        }

        let input = window.input_state().camera_input(mouse_scale);
        engine.update(delta_ms as f32 / 1000.0, &input);
        engine.render();

        window.present(engine.frame_buffer())?;
    }

    Ok(())
}

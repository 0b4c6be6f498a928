//! SDL2 window, input translation and frame pacing.
//!
//! Everything SDL-specific lives here. The rest of the crate only sees
//! [`WindowEvent`]s and the device-independent [`CameraInput`] built from an
//! [`InputState`] snapshot.

use log::info;
use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::camera::CameraInput;
use crate::engine::Toggle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    Quit,
    Resize(u32, u32),
    Toggle(Toggle),
    Screenshot,
}

/// Maps a key press to its discrete event.
///
/// F4 render mode, F5 lighting mode, F6 normal mapping, F7 mesh rotation,
/// X screenshot, Escape quit.
pub fn key_event(keycode: Keycode) -> WindowEvent {
    match keycode {
        Keycode::Escape => WindowEvent::Quit,
        Keycode::F4 => WindowEvent::Toggle(Toggle::RenderMode),
        Keycode::F5 => WindowEvent::Toggle(Toggle::LightingMode),
        Keycode::F6 => WindowEvent::Toggle(Toggle::NormalMapping),
        Keycode::F7 => WindowEvent::Toggle(Toggle::Rotation),
        Keycode::X => WindowEvent::Screenshot,
        _ => WindowEvent::None,
    }
}

/// Which mouse button drives a drag. Only one button at a time counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseDrag {
    /// Move forward/back and yaw
    Left,
    /// Yaw and pitch
    Right,
    /// Move up/down
    X2,
}

/// Snapshot of held movement keys and relative mouse motion for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub mouse_dx: i32,
    pub mouse_dy: i32,
    pub drag: Option<MouseDrag>,
}

impl InputState {
    /// Converts the snapshot into camera input units.
    ///
    /// Keys contribute ±1. Mouse travel is in pixels; drag movement is scaled
    /// by `mouse_scale`, the ratio of mouse to keyboard movement speed.
    /// Dragging toward the bottom of the screen moves back, down, or tips the
    /// view down.
    pub fn camera_input(&self, mouse_scale: f32) -> CameraInput {
        let axis = |positive: bool, negative: bool| positive as i32 as f32 - negative as i32 as f32;
        let mut input = CameraInput {
            forward: axis(self.forward, self.back),
            strafe: axis(self.right, self.left),
            ..Default::default()
        };

        let (dx, dy) = (self.mouse_dx as f32, self.mouse_dy as f32);
        match self.drag {
            Some(MouseDrag::Left) => {
                input.forward -= dy * mouse_scale;
                input.yaw = dx;
            }
            Some(MouseDrag::Right) => {
                input.yaw = dx;
                input.pitch = dy;
            }
            Some(MouseDrag::X2) => input.vertical = -dy * mouse_scale,
            None => {}
        }
        input
    }
}

pub struct FrameLimiter {
    previous_frame_time: u64,
    frame_target_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window, fps: u32) -> Self {
        Self {
            previous_frame_time: window.timer().ticks64(),
            frame_target_time: 1000 / u64::from(fps.max(1)),
        }
    }

    /// Waits if necessary to maintain frame rate and returns the delta time in milliseconds.
    /// Delta time represents the time elapsed since the last call to this method.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time - self.previous_frame_time;

        if delta_time < self.frame_target_time {
            let time_to_wait = self.frame_target_time - delta_time;
            std::thread::sleep(std::time::Duration::from_millis(time_to_wait));
            current_time = window.timer().ticks64();
            delta_time = current_time - self.previous_frame_time;
        }

        self.previous_frame_time = current_time;
        delta_time
    }
}

/// Counts frames and reports the rate once per second.
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    elapsed_ms: u64,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame. Returns the frame count of the last second each
    /// time a full second has accumulated.
    pub fn tick(&mut self, delta_ms: u64) -> Option<u32> {
        self.frames += 1;
        self.elapsed_ms += delta_ms;
        if self.elapsed_ms < 1000 {
            return None;
        }
        let fps = self.frames;
        self.frames = 0;
        self.elapsed_ms -= 1000;
        info!("FPS: {}", fps);
        Some(fps)
    }
}

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    // Declared before the creator so it is dropped first
    texture: sdl2::render::Texture<'static>,
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;

        // SAFETY: texture_creator is heap-allocated and lives as long as Window.
        // The texture field is declared first and therefore dropped first.
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;

        info!("Opened {}x{} window", width, height);

        Ok(Self {
            canvas,
            texture,
            texture_creator,
            event_pump,
            timer_subsystem,
            width,
            height,
        })
    }

    /// Drains the SDL event queue and returns the discrete events in order.
    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        let mut events = Vec::new();
        for event in self.event_pump.poll_iter() {
            let translated = match event {
                Event::Quit { .. } => WindowEvent::Quit,
                Event::KeyDown {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } => key_event(keycode),
                Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(w, h),
                    ..
                } if w > 0 && h > 0 => WindowEvent::Resize(w as u32, h as u32),
                _ => WindowEvent::None,
            };
            if translated != WindowEvent::None {
                events.push(translated);
            }
        }
        events
    }

    /// Samples held keys and mouse motion since the previous call.
    pub fn input_state(&self) -> InputState {
        let keyboard = self.event_pump.keyboard_state();
        let pressed = |codes: &[Scancode]| codes.iter().any(|&c| keyboard.is_scancode_pressed(c));
        let mouse = self.event_pump.relative_mouse_state();

        // A drag needs exactly one button held
        let drag = match (mouse.left(), mouse.right(), mouse.x2()) {
            (true, false, false) => Some(MouseDrag::Left),
            (false, true, false) => Some(MouseDrag::Right),
            (false, false, true) => Some(MouseDrag::X2),
            _ => None,
        };

        InputState {
            forward: pressed(&[Scancode::W, Scancode::Z]),
            back: pressed(&[Scancode::S]),
            left: pressed(&[Scancode::A, Scancode::Q]),
            right: pressed(&[Scancode::D]),
            mouse_dx: mouse.x(),
            mouse_dy: mouse.y(),
            drag,
        }
    }

    pub fn present(&mut self, buffer: &[u8]) -> Result<(), String> {
        self.texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        self.width = width;
        self.height = height;
        // SAFETY: Same as in new() - texture_creator outlives texture
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(self.texture_creator.as_ref() as *const _) };
        self.texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}

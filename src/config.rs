//! Runtime configuration loaded from a TOML file.
//!
//! Every section and key is optional; missing values fall back to the
//! defaults below. Unknown keys are rejected so typos don't go unnoticed.
//!
//! ```toml
//! [window]
//! width = 1280
//! height = 720
//!
//! [mesh]
//! path = "resources/vehicle.obj"
//! auto_rotate = true
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::camera::{Camera, CameraSpeeds};
use crate::math::{Mat4, Vec3};
use crate::mesh::ObjOptions;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_PATH: &str = "rasterizer.toml";

#[derive(Debug)]
pub enum ConfigError {
    /// The file couldn't be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file isn't valid TOML or doesn't match the schema.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// A value parsed but is out of range.
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config '{}': {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config '{}': {}", path.display(), source)
            }
            ConfigError::Invalid { field, reason } => {
                write!(f, "invalid config value for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub mesh: MeshConfig,
    #[serde(default)]
    pub textures: TexturesConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Frame rate cap of the interactive loop
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    #[serde(default = "default_fov_degrees")]
    pub fov_degrees: f32,
    #[serde(default = "default_camera_origin")]
    pub origin: [f32; 3],
    /// Keyboard movement, units per second
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    /// Mouse-drag movement, units per pixel of mouse travel per second
    #[serde(default = "default_mouse_move_speed")]
    pub mouse_move_speed: f32,
    #[serde(default = "default_angular_speed_degrees")]
    pub angular_speed_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov_degrees(),
            origin: default_camera_origin(),
            move_speed: default_move_speed(),
            mouse_move_speed: default_mouse_move_speed(),
            angular_speed_degrees: default_angular_speed_degrees(),
        }
    }
}

impl CameraConfig {
    pub fn speeds(&self) -> CameraSpeeds {
        CameraSpeeds {
            movement: self.move_speed,
            angular: self.angular_speed_degrees.to_radians(),
        }
    }

    /// Builds the camera described by this section.
    pub fn build(&self, aspect_ratio: f32) -> Camera {
        let [x, y, z] = self.origin;
        Camera::new(self.fov_degrees, Vec3::new(x, y, z), aspect_ratio).with_speeds(self.speeds())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshConfig {
    #[serde(default = "default_mesh_path")]
    pub path: PathBuf,
    /// World-space translation of the mesh
    #[serde(default = "default_mesh_position")]
    pub position: [f32; 3],
    /// Radians per second while auto-rotation is on
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
    #[serde(default = "default_true")]
    pub flip_axis_and_winding: bool,
    #[serde(default)]
    pub auto_rotate: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            path: default_mesh_path(),
            position: default_mesh_position(),
            rotation_speed: default_rotation_speed(),
            flip_axis_and_winding: true,
            auto_rotate: false,
        }
    }
}

impl MeshConfig {
    pub fn obj_options(&self) -> ObjOptions {
        ObjOptions {
            flip_axis_and_winding: self.flip_axis_and_winding,
        }
    }

    pub fn world_matrix(&self) -> Mat4 {
        let [x, y, z] = self.position;
        Mat4::translation(x, y, z)
    }
}

/// Texture map paths. An empty string disables an optional map.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TexturesConfig {
    #[serde(default = "default_diffuse")]
    pub diffuse: PathBuf,
    #[serde(default = "default_normal")]
    pub normal: PathBuf,
    #[serde(default = "default_gloss")]
    pub gloss: PathBuf,
    #[serde(default = "default_specular")]
    pub specular: PathBuf,
}

impl Default for TexturesConfig {
    fn default() -> Self {
        Self {
            diffuse: default_diffuse(),
            normal: default_normal(),
            gloss: default_gloss(),
            specular: default_specular(),
        }
    }
}

impl TexturesConfig {
    pub fn normal(&self) -> Option<&Path> {
        non_empty(&self.normal)
    }

    pub fn gloss(&self) -> Option<&Path> {
        non_empty(&self.gloss)
    }

    pub fn specular(&self) -> Option<&Path> {
        non_empty(&self.specular)
    }
}

fn non_empty(path: &Path) -> Option<&Path> {
    (!path.as_os_str().is_empty()).then_some(path)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Where screenshots and headless frames are written
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub normal_mapping: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            normal_mapping: false,
        }
    }
}

impl Config {
    /// Parses and validates a TOML document.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text, path)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `explicit` if given, else [`DEFAULT_PATH`] if it exists, else
    /// the built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_PATH).is_file() => Self::load(DEFAULT_PATH),
            None => {
                info!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid {
                field: "window.width/height",
                reason: "must be non-zero",
            });
        }
        if self.window.fps == 0 {
            return Err(ConfigError::Invalid {
                field: "window.fps",
                reason: "must be non-zero",
            });
        }
        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid {
                field: "camera.fov_degrees",
                reason: "must be between 0 and 180 exclusive",
            });
        }
        Ok(())
    }
}

// Defaults

fn default_title() -> String {
    "Software Rasterizer".to_string()
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

fn default_fps() -> u32 {
    60
}

fn default_fov_degrees() -> f32 {
    60.0
}

fn default_camera_origin() -> [f32; 3] {
    [0.0, 0.0, -10.0]
}

fn default_move_speed() -> f32 {
    8.0
}

fn default_mouse_move_speed() -> f32 {
    0.7
}

fn default_angular_speed_degrees() -> f32 {
    5.0
}

fn default_mesh_path() -> PathBuf {
    PathBuf::from("resources/vehicle.obj")
}

fn default_mesh_position() -> [f32; 3] {
    [0.0, -10.0, 20.0]
}

fn default_rotation_speed() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_diffuse() -> PathBuf {
    PathBuf::from("resources/vehicle_diffuse.png")
}

fn default_normal() -> PathBuf {
    PathBuf::from("resources/vehicle_normal.png")
}

fn default_gloss() -> PathBuf {
    PathBuf::from("resources/vehicle_gloss.png")
}

fn default_specular() -> PathBuf {
    PathBuf::from("resources/vehicle_specular.png")
}

fn default_output() -> PathBuf {
    PathBuf::from("rasterizer_color_buffer.png")
}

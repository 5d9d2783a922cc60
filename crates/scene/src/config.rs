use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use vitrine_common::Color;

/// Most shoes one frame can draw: the GPU instance buffer holds 256
/// placements and the box and sphere take two.
pub const MAX_RANGE: usize = 254;

/// Errors from loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub position: Vec3,
    pub target: Vec3,
    /// Fraction of the remaining orbit velocity removed each frame.
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 25.0,
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            damping: 0.05,
        }
    }
}

/// Tunable parameters of the scene. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Layout seed; a time-derived seed is used when absent.
    pub seed: Option<u64>,
    pub pool_size: usize,
    pub range: usize,
    /// Edge length of the cube base positions are drawn from.
    pub spread: f64,
    pub asset_root: PathBuf,
    pub model_path: String,
    pub model_node: String,
    pub model_material: String,
    pub texture_path: String,
    pub label_text: String,
    pub camera: CameraConfig,
    /// CSS-style keyword or `#rrggbb`.
    pub background: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: None,
            pool_size: 50,
            range: 5,
            spread: 3.0,
            asset_root: PathBuf::from("public"),
            model_path: "/shoe.glb".into(),
            model_node: "Shoe".into(),
            model_material: "phong1SG".into(),
            texture_path: "football_texture.jpg".into(),
            label_text: "NANI??!!".into(),
            camera: CameraConfig::default(),
            background: "#ffffff".into(),
        }
    }
}

impl SceneConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), "scene config loaded");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.range > MAX_RANGE {
            return Err(ConfigError::Invalid(format!(
                "range must be at most {MAX_RANGE}, got {}",
                self.range
            )));
        }
        if !(self.spread.is_finite() && self.spread >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "spread must be a non-negative number, got {}",
                self.spread
            )));
        }
        let fov = self.camera.fov_degrees;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera fov must be in (0, 180), got {fov}"
            )));
        }
        if !(0.0..=1.0).contains(&self.camera.damping) {
            return Err(ConfigError::Invalid(format!(
                "camera damping must be in [0, 1], got {}",
                self.camera.damping
            )));
        }
        if Color::parse(&self.background).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unrecognized background color {:?}",
                self.background
            )));
        }
        Ok(())
    }

    /// The configured seed, or one derived from the current time.
    pub fn resolve_seed(&self) -> u64 {
        match self.seed {
            Some(seed) => seed,
            None => {
                let seed = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or(0);
                tracing::info!(seed, "no seed configured, using time-derived seed");
                seed
            }
        }
    }

    pub fn background_color(&self) -> Color {
        Color::parse(&self.background).unwrap_or(Color::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_demo() {
        let c = SceneConfig::default();
        assert_eq!(c.pool_size, 50);
        assert_eq!(c.range, 5);
        assert_eq!(c.spread, 3.0);
        assert_eq!(c.model_path, "/shoe.glb");
        assert_eq!(c.camera.fov_degrees, 25.0);
        assert_eq!(c.camera.position, Vec3::new(0.0, 0.0, 5.0));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = SceneConfig::from_json(r#"{ "seed": 7, "range": 12, "camera": { "fov_degrees": 40 } }"#)
            .unwrap();
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.range, 12);
        assert_eq!(c.pool_size, 50);
        assert_eq!(c.camera.fov_degrees, 40.0);
        assert_eq!(c.camera.damping, 0.05);
    }

    #[test]
    fn json_round_trips() {
        let c = SceneConfig {
            seed: Some(3),
            ..SceneConfig::default()
        };
        assert_eq!(SceneConfig::from_json(&c.to_json().unwrap()).unwrap(), c);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            SceneConfig::from_json(r#"{ "camera": { "fov_degrees": 0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SceneConfig::from_json(r#"{ "background": "mauve-ish" }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SceneConfig::from_json(r#"{ "pool_size": 500, "range": 300 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(SceneConfig::from_json(r#"{ "pool_size": 500, "range": 254 }"#).is_ok());
        assert!(matches!(
            SceneConfig::from_json("{ nope"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, r#"{ "seed": 99 }"#).unwrap();
        assert_eq!(SceneConfig::load(&path).unwrap().resolve_seed(), 99);
        assert!(matches!(
            SceneConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}

//! Simulation settings and scene description
//!
//! Persisted as JSON. Missing fields fall back to the defaults, which
//! reproduce the demo board: a ball dropped onto two thin ledges.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// What to reflect about when a hit has no edge normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingNormalPolicy {
    /// Use the axis-aligned normal of the penetrated side
    #[default]
    InferAxis,
    /// Leave velocity unchanged on rectangle and circle hits
    Skip,
}

impl MissingNormalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingNormalPolicy::InferAxis => "infer_axis",
            MissingNormalPolicy::Skip => "skip",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "infer_axis" | "infer" | "axis" => Some(MissingNormalPolicy::InferAxis),
            "skip" | "none" => Some(MissingNormalPolicy::Skip),
            _ => None,
        }
    }
}

/// One obstacle in a scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Obstacle {
    Rectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// Rectangle registered as a 4-edge polygon
    RectangleOutline {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
    },
    Segment {
        from: [f32; 2],
        to: [f32; 2],
    },
    Polygon {
        points: Vec<[f32; 2]>,
    },
}

/// Errors loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Physics ===
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    /// Bounce multiplier along the contact normal
    pub restitution: f32,
    /// Truncate each step's displacement to whole pixels
    pub pixel_snap: bool,
    /// Reflection policy for rectangle/circle hits
    pub missing_normal: MissingNormalPolicy,

    // === Ball ===
    pub ball_radius: f32,
    pub ball_start: Vec2,
    pub ball_velocity: Vec2,

    // === Scene ===
    /// Maximum shapes per kind
    pub shape_capacity: usize,
    pub obstacles: Vec<Obstacle>,

    // === Driver ===
    /// Tick period in milliseconds
    pub tick_ms: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            restitution: RESTITUTION,
            pixel_snap: true,
            missing_normal: MissingNormalPolicy::InferAxis,

            ball_radius: BALL_RADIUS,
            ball_start: Vec2::from(BALL_START),
            ball_velocity: Vec2::from(BALL_START_VELOCITY),

            shape_capacity: SHAPE_CAPACITY,
            obstacles: vec![
                // Floor along the bottom of the display
                Obstacle::Rectangle {
                    x: 0.0,
                    y: 236.0,
                    width: 320.0,
                    height: 4.0,
                },
                // Ledge from mid-screen to the right edge
                Obstacle::Rectangle {
                    x: 180.0,
                    y: 120.0,
                    width: 320.0,
                    height: 4.0,
                },
            ],

            tick_ms: TICK_MS,
        }
    }
}

impl Settings {
    /// Demo-board behaviour
    ///
    /// Rectangles are registered as 4-edge outlines, so every bounce comes
    /// from an edge normal, and rectangle/circle hits never reflect.
    pub fn faithful() -> Self {
        let mut settings = Self {
            missing_normal: MissingNormalPolicy::Skip,
            ..Self::default()
        };
        for obstacle in &mut settings.obstacles {
            if let Obstacle::Rectangle {
                x,
                y,
                width,
                height,
            } = *obstacle
            {
                *obstacle = Obstacle::RectangleOutline {
                    x,
                    y,
                    width,
                    height,
                };
            }
        }
        settings
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Reject values the physics step cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |field, reason| Err(SettingsError::Invalid { field, reason });

        if !self.gravity.is_finite() {
            return invalid("gravity", "must be finite");
        }
        if !self.restitution.is_finite() || self.restitution < 0.0 {
            return invalid("restitution", "must be finite and non-negative");
        }
        if !self.ball_radius.is_finite() || self.ball_radius <= 0.0 {
            return invalid("ball_radius", "must be positive");
        }
        if !self.ball_start.is_finite() {
            return invalid("ball_start", "must be finite");
        }
        if !self.ball_velocity.is_finite() {
            return invalid("ball_velocity", "must be finite");
        }
        if self.shape_capacity == 0 {
            return invalid("shape_capacity", "must be at least 1");
        }
        if self.tick_ms == 0 {
            return invalid("tick_ms", "must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.tick_ms, 20);
        assert!((settings.restitution - 1.1).abs() < 1e-6);
        assert_eq!(settings.obstacles.len(), 2);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "gravity": 50.0, "pixel_snap": false }"#).unwrap();
        assert_eq!(settings.gravity, 50.0);
        assert!(!settings.pixel_snap);
        assert_eq!(settings.ball_radius, BALL_RADIUS);
        assert_eq!(settings.missing_normal, MissingNormalPolicy::InferAxis);
    }

    #[test]
    fn test_obstacle_json_shapes() {
        let json = r#"{
            "missing_normal": "skip",
            "ball_start": [10.0, 20.0],
            "obstacles": [
                { "kind": "circle", "x": 50.0, "y": 60.0, "radius": 8.0 },
                { "kind": "segment", "from": [0.0, 0.0], "to": [10.0, 5.0] },
                { "kind": "rectangle_outline", "x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0 },
                { "kind": "polygon", "points": [[0.0, 0.0], [5.0, 0.0], [0.0, 5.0]] }
            ]
        }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.missing_normal, MissingNormalPolicy::Skip);
        assert_eq!(settings.ball_start, Vec2::new(10.0, 20.0));
        assert_eq!(settings.obstacles.len(), 4);
        assert_eq!(
            settings.obstacles[1],
            Obstacle::Segment {
                from: [0.0, 0.0],
                to: [10.0, 5.0]
            }
        );
    }

    #[test]
    fn test_json_roundtrip_preserves_scene() {
        let original = Settings::faithful();
        let restored = Settings::from_json(&original.to_json().unwrap()).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Settings::from_json(r#"{ "ball_radius": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "ball_radius",
                ..
            }
        ));
        assert!(Settings::from_json(r#"{ "tick_ms": 0 }"#).is_err());
        assert!(Settings::from_json(r#"{ "restitution": -1.0 }"#).is_err());
        assert!(matches!(
            Settings::from_json("not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load("/nonexistent/bounce-sim/settings.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("bounce-sim-{}.json", std::process::id()));
        let settings = Settings {
            gravity: 123.0,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.gravity, 123.0);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            MissingNormalPolicy::from_str("Skip"),
            Some(MissingNormalPolicy::Skip)
        );
        assert_eq!(
            MissingNormalPolicy::from_str(MissingNormalPolicy::InferAxis.as_str()),
            Some(MissingNormalPolicy::InferAxis)
        );
        assert_eq!(MissingNormalPolicy::from_str("bogus"), None);
    }

    #[test]
    fn test_faithful_outlines_every_rectangle() {
        let settings = Settings::faithful();
        assert_eq!(settings.missing_normal, MissingNormalPolicy::Skip);
        assert_eq!(settings.obstacles.len(), Settings::default().obstacles.len());
        assert!(
            settings
                .obstacles
                .iter()
                .all(|o| matches!(o, Obstacle::RectangleOutline { .. }))
        );
        assert_eq!(
            settings.obstacles[0],
            Obstacle::RectangleOutline {
                x: 0.0,
                y: 236.0,
                width: 320.0,
                height: 4.0
            }
        );
    }
}

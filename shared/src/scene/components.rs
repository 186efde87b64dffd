//! Node components
//!
//! A closed set of attachments with an opaque escape hatch for anything
//! the exporters don't understand.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default near clip plane for cameras that don't specify one
pub const DEFAULT_CAMERA_NEAR: f32 = 0.1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Component {
    /// Renders a mesh, optionally overriding every primitive's material
    #[serde(rename_all = "camelCase")]
    Mesh {
        mesh_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        material_id: Option<String>,
    },
    Camera(CameraComponent),
    Light(LightComponent),
    /// Opaque key-value payload passed through untouched
    Custom {
        kind: String,
        #[serde(default)]
        data: BTreeMap<String, serde_json::Value>,
    },
}

impl Component {
    /// Short tag used in diagnostics
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Mesh { .. } => "mesh",
            Self::Camera(_) => "camera",
            Self::Light(_) => "light",
            Self::Custom { kind, .. } => kind,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Projection {
    /// Vertical field of view in degrees
    #[serde(rename_all = "camelCase")]
    Perspective {
        fov_degrees: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        aspect_ratio: Option<f32>,
    },
    /// Half-extents of the view volume
    Orthographic { xmag: f32, ymag: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraComponent {
    pub projection: Projection,
    #[serde(default = "default_near")]
    pub near: f32,
    /// `None` means an infinite far plane
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub far: Option<f32>,
}

fn default_near() -> f32 {
    DEFAULT_CAMERA_NEAR
}

impl CameraComponent {
    pub fn perspective(fov_degrees: f32) -> Self {
        Self {
            projection: Projection::Perspective {
                fov_degrees,
                aspect_ratio: None,
            },
            near: DEFAULT_CAMERA_NEAR,
            far: None,
        }
    }

    pub fn orthographic(xmag: f32, ymag: f32) -> Self {
        Self {
            projection: Projection::Orthographic { xmag, ymag },
            near: DEFAULT_CAMERA_NEAR,
            far: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LightKind {
    #[default]
    Directional,
    Point,
    Spot,
}

impl LightKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "directional" | "sun" => Some(Self::Directional),
            "point" => Some(Self::Point),
            "spot" | "spotlight" => Some(Self::Spot),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightComponent {
    pub kind: LightKind,
    pub color: [f32; 3],
    pub intensity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<f32>,
    /// Radians; spot lights only
    #[serde(default)]
    pub inner_cone_angle: f32,
    /// Radians; spot lights only
    #[serde(default = "default_outer_cone")]
    pub outer_cone_angle: f32,
}

fn default_outer_cone() -> f32 {
    std::f32::consts::FRAC_PI_4
}

impl Default for LightComponent {
    fn default() -> Self {
        Self {
            kind: LightKind::Directional,
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            range: None,
            inner_cone_angle: 0.0,
            outer_cone_angle: default_outer_cone(),
        }
    }
}

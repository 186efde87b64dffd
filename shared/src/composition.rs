//! Composition input for the direct compiler
//!
//! This is the published data shape an external front end hands over: a
//! list of declared objects with loosely typed properties and traits,
//! spatial groups, lights, an optional camera and timelines. Properties
//! stay untyped here; consumers pull values out with the accessor helpers
//! and fall back to defaults when a property is missing or malformed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Loosely typed property value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<PropertyValue>),
    Object(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(*n as f32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric array of any length
    pub fn as_floats(&self) -> Option<Vec<f32>> {
        match self {
            Self::Array(items) => items.iter().map(Self::as_f32).collect(),
            _ => None,
        }
    }

    /// Exactly three numbers, or a single number splatted to all axes
    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match self {
            Self::Number(n) => Some([*n as f32; 3]),
            _ => match self.as_floats()?.as_slice() {
                [x, y, z] => Some([*x, *y, *z]),
                _ => None,
            },
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<[f32; 3]> for PropertyValue {
    fn from(value: [f32; 3]) -> Self {
        Self::Array(value.iter().map(|v| Self::Number(*v as f64)).collect())
    }
}

/// Named property bag shared by every declaration kind
pub type Properties = BTreeMap<String, PropertyValue>;

/// Typed reads with fallbacks
pub trait PropertyAccess {
    fn property(&self, key: &str) -> Option<&PropertyValue>;

    fn number(&self, key: &str, default: f32) -> f32 {
        self.property(key)
            .and_then(PropertyValue::as_f32)
            .unwrap_or(default)
    }

    fn string(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(PropertyValue::as_str)
    }

    fn vec3(&self, key: &str, default: [f32; 3]) -> [f32; 3] {
        self.property(key)
            .and_then(PropertyValue::as_vec3)
            .unwrap_or(default)
    }

    fn bool(&self, key: &str, default: bool) -> bool {
        self.property(key)
            .and_then(PropertyValue::as_bool)
            .unwrap_or(default)
    }
}

impl PropertyAccess for Properties {
    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.get(key)
    }
}

/// Trait applied to an object, e.g. `@glowing(intensity: 2)`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitDecl {
    pub name: String,
    #[serde(default)]
    pub config: Properties,
}

impl TraitDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Properties::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositionObject {
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub traits: Vec<TraitDecl>,
    #[serde(default)]
    pub children: Vec<CompositionObject>,
}

impl CompositionObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn with_trait(mut self, decl: TraitDecl) -> Self {
        self.traits.push(decl);
        self
    }
}

impl PropertyAccess for CompositionObject {
    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// Transform-only container for objects and nested groups
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialGroup {
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub objects: Vec<CompositionObject>,
    #[serde(default)]
    pub groups: Vec<SpatialGroup>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LightDecl {
    pub name: String,
    /// "directional", "point", "spot", ...
    #[serde(default = "default_light_kind")]
    pub kind: String,
    #[serde(default)]
    pub properties: Properties,
}

fn default_light_kind() -> String {
    "directional".to_string()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraDecl {
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: Vec<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineTrack {
    /// Name of the animated object
    pub target: String,
    /// "position", "rotation" (Euler degrees) or "scale"
    pub property: String,
    #[serde(default)]
    pub interpolation: Option<String>,
    pub keyframes: Vec<Keyframe>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub name: String,
    #[serde(default)]
    pub duration: f32,
    #[serde(default)]
    pub looping: bool,
    #[serde(default)]
    pub tracks: Vec<TimelineTrack>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<CompositionObject>,
    #[serde(default)]
    pub groups: Vec<SpatialGroup>,
    #[serde(default)]
    pub lights: Vec<LightDecl>,
    #[serde(default)]
    pub camera: Option<CameraDecl>,
    #[serde(default)]
    pub timelines: Vec<Timeline>,
    #[serde(default)]
    pub environment: Properties,
}

impl Composition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

//! Procedural asset generation for the direct scene compiler
//!
//! Geometry generators produce flat position/normal/uv arrays with 16-bit
//! indices. Material composition turns object properties and visual traits
//! into PBR factor tuples that can be deduplicated by key.
//!
//! # Mesh Example
//! ```
//! use proc_gen::mesh::*;
//!
//! let mesh = generate_box([2.0, 1.0, 1.0]);
//! assert_eq!(mesh.vertex_count(), 24);
//! assert_eq!(mesh.triangle_count(), 12);
//!
//! let sphere = generate_primitive(PrimitiveKind::parse("sphere").unwrap(), [1.0; 3]);
//! assert_eq!(sphere.vertex_count(), 25 * 17);
//! ```
//!
//! # Material Example
//! ```
//! use proc_gen::material::*;
//! use scenepack_shared::{Properties, PropertyValue, TraitDecl};
//!
//! let mut properties = Properties::new();
//! properties.insert("material".into(), PropertyValue::from("metal.polished"));
//! properties.insert("color".into(), PropertyValue::from("#ff0000"));
//!
//! let factors = compose_material(&properties, &[TraitDecl::new("glowing")]);
//! assert_eq!(factors.base_color, [1.0, 0.0, 0.0, 1.0]);
//! assert!(factors.metallic > 0.9);
//! assert!(factors.emissive[0] > 0.0);
//! ```

pub mod material;
pub mod mesh;

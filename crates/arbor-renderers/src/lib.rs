//! # arbor-renderers
//!
//! Renderers that turn an arbor primitive tree (a `serde_json::Value`) into the
//! bytes of a concrete format.
//!
//! ## Formats
//!
//! - `json`: [`JSONRenderer`]
//! - `yaml`: [`YAMLRenderer`]
//! - `xml`: [`XMLRenderer`]
//! - `csv`: [`CSVRenderer`]
//!
//! Renderers are looked up by format key through a [`RendererRegistry`];
//! unknown keys fail with [`RenderError::UnsupportedFormat`].
//!
//! ## Examples
//!
//! ```rust
//! use arbor_renderers::{RenderOptions, RendererRegistry};
//! use serde_json::json;
//!
//! let registry = RendererRegistry::default();
//! let tree = json!({"first_name": "john", "age": 42});
//!
//! let yaml = registry.render(&tree, "yaml", &RenderOptions::new()).unwrap();
//! assert_eq!(&yaml[..], b"first_name: john\nage: 42\n");
//! ```

pub mod csv_renderer;
pub mod json_renderer;
pub mod renderer;
pub mod xml_renderer;
pub mod yaml_renderer;

pub use csv_renderer::CSVRenderer;
pub use json_renderer::JSONRenderer;
pub use renderer::{RenderError, RenderOptions, RenderResult, Renderer, RendererRegistry};
pub use xml_renderer::XMLRenderer;
pub use yaml_renderer::YAMLRenderer;

//! Renderer trait, per-call options and the format-keyed registry.

use bytes::Bytes;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::{CSVRenderer, JSONRenderer, XMLRenderer, YAMLRenderer};

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering a primitive tree
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
	/// No renderer is registered for the requested format key
	#[error("Unsupported format: {0}")]
	UnsupportedFormat(String),

	/// The renderer could not encode the tree
	#[error("Serialization error: {0}")]
	Serialization(String),
}

/// Options applied to a single render call
///
/// Every renderer reads the options it understands and ignores the rest.
///
/// # Examples
///
/// ```
/// use arbor_renderers::RenderOptions;
///
/// let options = RenderOptions::new().indent(2).sort_keys(true);
/// assert_eq!(options.indent, Some(2));
/// assert!(options.sort_keys);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
	/// Indentation width for pretty output (JSON, XML)
	pub indent: Option<usize>,
	/// Emit mapping keys in sorted order
	pub sort_keys: bool,
	/// Field delimiter for CSV output
	pub csv_delimiter: Option<char>,
	/// Name of the XML document element
	pub xml_root: Option<String>,
}

impl RenderOptions {
	/// Creates empty options
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the indentation width
	pub fn indent(mut self, indent: usize) -> Self {
		self.indent = Some(indent);
		self
	}

	/// Sets whether mapping keys are sorted
	pub fn sort_keys(mut self, sort_keys: bool) -> Self {
		self.sort_keys = sort_keys;
		self
	}

	/// Sets the CSV delimiter
	pub fn csv_delimiter(mut self, delimiter: char) -> Self {
		self.csv_delimiter = Some(delimiter);
		self
	}

	/// Sets the XML root element name
	pub fn xml_root(mut self, root: impl Into<String>) -> Self {
		self.xml_root = Some(root.into());
		self
	}
}

/// Turns a primitive tree into bytes of one concrete format
pub trait Renderer: Send + Sync {
	/// Format key this renderer is registered under (e.g. `"json"`)
	fn format(&self) -> &str;

	/// Media type of the produced output
	fn media_type(&self) -> &str;

	/// Render the tree
	fn render(&self, data: &Value, options: &RenderOptions) -> RenderResult<Bytes>;
}

/// Format-keyed dispatch table of renderers
///
/// # Examples
///
/// ```
/// use arbor_renderers::{RenderOptions, RendererRegistry};
/// use serde_json::json;
///
/// let registry = RendererRegistry::default();
/// let bytes = registry.render(&json!({"a": 1}), "json", &RenderOptions::new()).unwrap();
/// assert_eq!(&bytes[..], br#"{"a":1}"#);
///
/// assert!(registry.render(&json!({}), "toml", &RenderOptions::new()).is_err());
/// ```
#[derive(Clone)]
pub struct RendererRegistry {
	renderers: IndexMap<String, Arc<dyn Renderer>>,
}

impl RendererRegistry {
	/// Creates a registry with no renderers
	pub fn empty() -> Self {
		Self {
			renderers: IndexMap::new(),
		}
	}

	/// Creates a registry holding the JSON, YAML, XML and CSV renderers
	pub fn with_defaults() -> Self {
		let mut registry = Self::empty();
		registry.register(JSONRenderer::new());
		registry.register(YAMLRenderer::new());
		registry.register(XMLRenderer::new());
		registry.register(CSVRenderer::new());
		registry
	}

	/// Registers a renderer under its own format key, replacing any previous one
	pub fn register<R>(&mut self, renderer: R) -> &mut Self
	where
		R: Renderer + 'static,
	{
		self.renderers
			.insert(renderer.format().to_string(), Arc::new(renderer));
		self
	}

	/// Looks up the renderer for a format key
	pub fn get(&self, format: &str) -> RenderResult<&Arc<dyn Renderer>> {
		self.renderers
			.get(format)
			.ok_or_else(|| RenderError::UnsupportedFormat(format.to_string()))
	}

	/// Registered format keys, in registration order
	pub fn formats(&self) -> Vec<&str> {
		self.renderers.keys().map(|k| k.as_str()).collect()
	}

	/// Renders the tree with the renderer registered for `format`
	pub fn render(
		&self,
		data: &Value,
		format: &str,
		options: &RenderOptions,
	) -> RenderResult<Bytes> {
		let renderer = self.get(format)?;
		tracing::debug!(format, media_type = renderer.media_type(), "rendering primitive tree");
		renderer.render(data, options)
	}
}

impl Default for RendererRegistry {
	fn default() -> Self {
		Self::with_defaults()
	}
}

impl fmt::Debug for RendererRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RendererRegistry")
			.field("formats", &self.formats())
			.finish()
	}
}

/// Returns a copy of `value` with every mapping's keys sorted
pub(crate) fn sorted(value: &Value) -> Value {
	match value {
		Value::Object(map) => {
			let mut entries: Vec<_> = map.iter().collect();
			entries.sort_by(|(a, _), (b, _)| a.cmp(b));
			let mut out = Map::new();
			for (key, inner) in entries {
				out.insert(key.clone(), sorted(inner));
			}
			Value::Object(out)
		}
		Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
		other => other.clone(),
	}
}

/// Text form of a scalar for text-only formats (XML character data, CSV cells)
pub(crate) fn scalar_text(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	struct UpperRenderer;

	impl Renderer for UpperRenderer {
		fn format(&self) -> &str {
			"upper"
		}

		fn media_type(&self) -> &str {
			"text/plain"
		}

		fn render(&self, data: &Value, _options: &RenderOptions) -> RenderResult<Bytes> {
			Ok(Bytes::from(data.to_string().to_uppercase()))
		}
	}

	#[rstest]
	fn test_default_registry_formats() {
		let registry = RendererRegistry::default();
		assert_eq!(registry.formats(), vec!["json", "yaml", "xml", "csv"]);
	}

	#[rstest]
	#[case("json")]
	#[case("yaml")]
	#[case("xml")]
	#[case("csv")]
	fn test_default_registry_resolves(#[case] format: &str) {
		let registry = RendererRegistry::default();
		assert_eq!(registry.get(format).unwrap().format(), format);
	}

	#[rstest]
	fn test_unknown_format_is_unsupported() {
		let registry = RendererRegistry::default();
		let err = registry
			.render(&json!({}), "msgpack", &RenderOptions::new())
			.unwrap_err();
		assert!(matches!(err, RenderError::UnsupportedFormat(ref f) if f == "msgpack"));
		assert_eq!(err.to_string(), "Unsupported format: msgpack");
	}

	#[rstest]
	fn test_register_custom_renderer() {
		let mut registry = RendererRegistry::empty();
		registry.register(UpperRenderer);

		let bytes = registry
			.render(&json!("abc"), "upper", &RenderOptions::new())
			.unwrap();
		assert_eq!(&bytes[..], b"\"ABC\"");
		assert!(registry.get("json").is_err());
	}

	#[rstest]
	fn test_sorted_is_recursive() {
		let value = json!({"b": {"d": 1, "c": 2}, "a": [{"z": 0, "y": 1}]});
		let out = sorted(&value);

		let keys: Vec<_> = out.as_object().unwrap().keys().cloned().collect();
		assert_eq!(keys, vec!["a", "b"]);
		let inner: Vec<_> = out["b"].as_object().unwrap().keys().cloned().collect();
		assert_eq!(inner, vec!["c", "d"]);
		let listed: Vec<_> = out["a"][0].as_object().unwrap().keys().cloned().collect();
		assert_eq!(listed, vec!["y", "z"]);
	}

	#[rstest]
	#[case(json!(null), "")]
	#[case(json!("text"), "text")]
	#[case(json!(42), "42")]
	#[case(json!(true), "true")]
	fn test_scalar_text(#[case] value: Value, #[case] expected: &str) {
		assert_eq!(scalar_text(&value), expected);
	}
}

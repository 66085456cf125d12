use bytes::Bytes;
use serde_json::Value;

use crate::renderer::{RenderError, RenderOptions, RenderResult, Renderer, sorted};

/// YAML renderer
///
/// Renders the primitive tree as a block-style YAML document. Mapping order
/// is kept as produced unless `sort_keys` is set.
#[derive(Debug, Clone, Default)]
pub struct YAMLRenderer;

impl YAMLRenderer {
	/// Creates a new YAML renderer
	///
	/// # Examples
	///
	/// ```
	/// use arbor_renderers::{RenderOptions, Renderer, YAMLRenderer};
	/// use serde_json::json;
	///
	/// let renderer = YAMLRenderer::new();
	/// let bytes = renderer.render(&json!({"age": 42}), &RenderOptions::new()).unwrap();
	/// assert_eq!(&bytes[..], b"age: 42\n");
	/// ```
	pub fn new() -> Self {
		Self
	}
}

impl Renderer for YAMLRenderer {
	fn format(&self) -> &str {
		"yaml"
	}

	fn media_type(&self) -> &str {
		"application/yaml"
	}

	fn render(&self, data: &Value, options: &RenderOptions) -> RenderResult<Bytes> {
		let yaml_string = if options.sort_keys {
			serde_yaml::to_string(&sorted(data))
		} else {
			serde_yaml::to_string(data)
		}
		.map_err(|e| RenderError::Serialization(e.to_string()))?;

		Ok(Bytes::from(yaml_string))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn render(data: &Value, options: &RenderOptions) -> String {
		let bytes = YAMLRenderer::new().render(data, options).unwrap();
		String::from_utf8(bytes.to_vec()).unwrap()
	}

	#[rstest]
	fn test_yaml_renderer_basic() {
		let out = render(&json!({"name": "test", "value": 123}), &RenderOptions::new());
		assert_eq!(out, "name: test\nvalue: 123\n");
	}

	#[rstest]
	fn test_yaml_renderer_nested() {
		let data = json!({
			"user": {
				"name": "Alice",
				"siblings": ["jane", "emily"]
			}
		});

		let out = render(&data, &RenderOptions::new());
		assert!(out.contains("user:"));
		assert!(out.contains("siblings:"));
		assert!(out.contains("- jane"));
	}

	#[rstest]
	fn test_yaml_renderer_sort_keys() {
		let out = render(&json!({"b": 1, "a": 2}), &RenderOptions::new().sort_keys(true));
		assert_eq!(out, "a: 2\nb: 1\n");
	}
}

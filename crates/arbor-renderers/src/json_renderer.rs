use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::renderer::{RenderError, RenderOptions, RenderResult, Renderer, sorted};

/// JSON renderer
///
/// Compact by default; `indent` switches to pretty output and `sort_keys`
/// orders every mapping's keys.
#[derive(Debug, Clone, Default)]
pub struct JSONRenderer;

impl JSONRenderer {
	/// Creates a new JSON renderer
	///
	/// # Examples
	///
	/// ```
	/// use arbor_renderers::{JSONRenderer, RenderOptions, Renderer};
	/// use serde_json::json;
	///
	/// let renderer = JSONRenderer::new();
	/// let bytes = renderer.render(&json!({"name": "john"}), &RenderOptions::new()).unwrap();
	/// assert_eq!(&bytes[..], br#"{"name":"john"}"#);
	/// ```
	pub fn new() -> Self {
		Self
	}
}

impl Renderer for JSONRenderer {
	fn format(&self) -> &str {
		"json"
	}

	fn media_type(&self) -> &str {
		"application/json"
	}

	fn render(&self, data: &Value, options: &RenderOptions) -> RenderResult<Bytes> {
		let sorted_data;
		let data = if options.sort_keys {
			sorted_data = sorted(data);
			&sorted_data
		} else {
			data
		};

		let out = match options.indent {
			Some(width) => {
				let indent = " ".repeat(width);
				let mut ser = Serializer::with_formatter(
					Vec::new(),
					PrettyFormatter::with_indent(indent.as_bytes()),
				);
				data.serialize(&mut ser)
					.map_err(|e| RenderError::Serialization(e.to_string()))?;
				ser.into_inner()
			}
			None => {
				serde_json::to_vec(data).map_err(|e| RenderError::Serialization(e.to_string()))?
			}
		};

		Ok(Bytes::from(out))
	}
}

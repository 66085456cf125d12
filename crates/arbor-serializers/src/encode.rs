//! Encode entry point
//!
//! Serializes with a fresh resolution context and, when a format is given,
//! renders the primitive tree through a renderer registry.

use arbor_renderers::{RenderOptions, RendererRegistry};
use bytes::Bytes;
use serde_json::Value;

use crate::error::SerializeResult;
use crate::serializer::Serializer;
use crate::value::RawValue;

/// Output of [`Serializer::encode`]
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
	/// No format was requested: the primitive tree itself
	Tree(Value),
	/// Rendered bytes of the requested format
	Rendered(Bytes),
}

impl Encoded {
	pub fn into_tree(self) -> Option<Value> {
		match self {
			Encoded::Tree(tree) => Some(tree),
			Encoded::Rendered(_) => None,
		}
	}

	pub fn into_bytes(self) -> Option<Bytes> {
		match self {
			Encoded::Rendered(bytes) => Some(bytes),
			Encoded::Tree(_) => None,
		}
	}
}

impl Serializer {
	/// Serialize `value` and render it with the default registry
	///
	/// # Examples
	///
	/// ```
	/// use arbor_renderers::RenderOptions;
	/// use arbor_serializers::{Record, Serializer};
	///
	/// let john = Record::new("Person").with("first_name", "john").with("age", 42).into_ref();
	///
	/// let encoded = Serializer::new()
	///     .encode(john, Some("json"), &RenderOptions::new())
	///     .unwrap();
	/// assert_eq!(&encoded.into_bytes().unwrap()[..], br#"{"age":42,"first_name":"john"}"#);
	/// ```
	pub fn encode(
		&self,
		value: impl Into<RawValue>,
		format: Option<&str>,
		options: &RenderOptions,
	) -> SerializeResult<Encoded> {
		self.encode_with(&RendererRegistry::default(), value, format, options)
	}

	/// Serialize `value` and render it through `registry`
	pub fn encode_with(
		&self,
		registry: &RendererRegistry,
		value: impl Into<RawValue>,
		format: Option<&str>,
		options: &RenderOptions,
	) -> SerializeResult<Encoded> {
		let tree = self.serialize(value)?;
		match format {
			None => Ok(Encoded::Tree(tree)),
			Some(format) => Ok(Encoded::Rendered(registry.render(&tree, format, options)?)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::object::Record;
	use arbor_renderers::{RenderResult, Renderer};
	use rstest::rstest;
	use serde_json::json;

	struct CountRenderer;

	impl Renderer for CountRenderer {
		fn format(&self) -> &str {
			"count"
		}

		fn media_type(&self) -> &str {
			"text/plain"
		}

		fn render(&self, data: &Value, _options: &RenderOptions) -> RenderResult<Bytes> {
			let count = data.as_object().map(|map| map.len()).unwrap_or_default();
			Ok(Bytes::from(count.to_string()))
		}
	}

	#[rstest]
	fn test_encode_without_format_returns_tree() {
		let john = Record::new("Person").with("age", 42).into_ref();
		let encoded = Serializer::new()
			.encode(john, None, &RenderOptions::new())
			.unwrap();
		assert_eq!(encoded.into_tree(), Some(json!({"age": 42})));
	}

	#[rstest]
	fn test_encode_unknown_format() {
		let john = Record::new("Person").with("age", 42).into_ref();
		let err = Serializer::new()
			.encode(john, Some("toml"), &RenderOptions::new())
			.unwrap_err();
		assert!(err.is_unsupported_format());
	}

	#[rstest]
	fn test_encode_with_custom_registry() {
		let mut registry = RendererRegistry::empty();
		registry.register(CountRenderer);
		let john = Record::new("Person").with("age", 42).with("name", "john").into_ref();

		let encoded = Serializer::new()
			.encode_with(&registry, john, Some("count"), &RenderOptions::new())
			.unwrap();
		assert_eq!(encoded, Encoded::Rendered(Bytes::from_static(b"2")));
	}

	#[rstest]
	fn test_attribute_errors_surface_before_rendering() {
		let john = Record::new("Person").into_ref();
		let serializer = Serializer::builder().fields(["age"]).build().unwrap();
		let err = serializer
			.encode(john, Some("toml"), &RenderOptions::new())
			.unwrap_err();
		assert!(err.is_attribute_error());
	}
}

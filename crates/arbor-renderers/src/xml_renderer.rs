//! XML renderer
//!
//! Writes the primitive tree under a single document element using quick-xml.
//! Mapping keys become element names, sequence items become `<list-item>`
//! elements, null values produce an empty element and other scalars become
//! escaped character data.

use bytes::Bytes;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::Value;

use crate::renderer::{RenderError, RenderOptions, RenderResult, Renderer, scalar_text};

/// XML renderer
///
/// # Examples
///
/// ```
/// use arbor_renderers::{RenderOptions, Renderer, XMLRenderer};
/// use serde_json::json;
///
/// let renderer = XMLRenderer::new();
/// let bytes = renderer.render(&json!({"age": 42}), &RenderOptions::new()).unwrap();
/// let xml = String::from_utf8(bytes.to_vec()).unwrap();
/// assert!(xml.ends_with("<root><age>42</age></root>"));
/// ```
#[derive(Debug, Clone)]
pub struct XMLRenderer {
	/// Name of the document element (default: "root")
	pub root: String,
	/// Element name used for sequence items (default: "list-item")
	pub item_tag: String,
}

impl Default for XMLRenderer {
	fn default() -> Self {
		Self {
			root: "root".to_string(),
			item_tag: "list-item".to_string(),
		}
	}
}

impl XMLRenderer {
	/// Creates a new XML renderer with default element names
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the document element name
	pub fn root(mut self, root: impl Into<String>) -> Self {
		self.root = root.into();
		self
	}

	/// Sets the element name for sequence items
	pub fn item_tag(mut self, item_tag: impl Into<String>) -> Self {
		self.item_tag = item_tag.into();
		self
	}

	fn write_value<W: std::io::Write>(
		&self,
		writer: &mut Writer<W>,
		data: &Value,
		sort_keys: bool,
	) -> RenderResult<()> {
		match data {
			Value::Array(items) => {
				for item in items {
					self.write_element(writer, &self.item_tag, item, sort_keys)?;
				}
			}
			Value::Object(map) => {
				let mut entries: Vec<_> = map.iter().collect();
				if sort_keys {
					entries.sort_by(|(a, _), (b, _)| a.cmp(b));
				}
				for (key, value) in entries {
					self.write_element(writer, &element_name(key), value, sort_keys)?;
				}
			}
			Value::Null => {}
			scalar => {
				let text = scalar_text(scalar);
				writer
					.write_event(Event::Text(BytesText::new(&text)))
					.map_err(xml_error)?;
			}
		}
		Ok(())
	}

	fn write_element<W: std::io::Write>(
		&self,
		writer: &mut Writer<W>,
		name: &str,
		data: &Value,
		sort_keys: bool,
	) -> RenderResult<()> {
		writer
			.write_event(Event::Start(BytesStart::new(name)))
			.map_err(xml_error)?;
		self.write_value(writer, data, sort_keys)?;
		writer
			.write_event(Event::End(BytesEnd::new(name)))
			.map_err(xml_error)?;
		Ok(())
	}
}

fn xml_error(e: impl std::fmt::Display) -> RenderError {
	RenderError::Serialization(e.to_string())
}

/// Maps an arbitrary mapping key onto a valid XML element name
///
/// Characters that may not appear in a name are replaced with `_`, and a name
/// that would start with a digit, `-` or `.` is prefixed with `_`.
pub fn element_name(key: &str) -> String {
	let mut name: String = key
		.chars()
		.map(|c| {
			if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
				c
			} else {
				'_'
			}
		})
		.collect();

	match name.chars().next() {
		None => name.push('_'),
		Some(first) if first.is_ascii_digit() || first == '-' || first == '.' => {
			name.insert(0, '_')
		}
		_ => {}
	}
	name
}

impl Renderer for XMLRenderer {
	fn format(&self) -> &str {
		"xml"
	}

	fn media_type(&self) -> &str {
		"application/xml"
	}

	fn render(&self, data: &Value, options: &RenderOptions) -> RenderResult<Bytes> {
		let mut writer = match options.indent {
			Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
			None => Writer::new(Vec::new()),
		};
		let root = options.xml_root.as_deref().unwrap_or(&self.root);

		writer
			.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
			.map_err(xml_error)?;
		self.write_element(&mut writer, &element_name(root), data, options.sort_keys)?;

		Ok(Bytes::from(writer.into_inner()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	const DECL: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

	fn render(data: &Value, options: &RenderOptions) -> String {
		let bytes = XMLRenderer::new().render(data, options).unwrap();
		String::from_utf8(bytes.to_vec()).unwrap()
	}

	#[rstest]
	fn test_xml_renderer_mapping() {
		let out = render(
			&json!({"first_name": "john", "age": 42}),
			&RenderOptions::new(),
		);
		assert_eq!(
			out,
			format!("{DECL}<root><first_name>john</first_name><age>42</age></root>")
		);
	}

	#[rstest]
	fn test_xml_renderer_sequence_items() {
		let out = render(&json!({"siblings": ["jane", "emily"]}), &RenderOptions::new());
		assert_eq!(
			out,
			format!(
				"{DECL}<root><siblings><list-item>jane</list-item><list-item>emily</list-item></siblings></root>"
			)
		);
	}

	#[rstest]
	fn test_xml_renderer_null_is_empty_element() {
		let out = render(&json!({"nickname": null}), &RenderOptions::new());
		assert_eq!(out, format!("{DECL}<root><nickname></nickname></root>"));
	}

	#[rstest]
	fn test_xml_renderer_sort_keys_and_escaping() {
		let out = render(
			&json!({"b": "<tag> & more", "a": true}),
			&RenderOptions::new().sort_keys(true),
		);
		assert_eq!(
			out,
			format!("{DECL}<root><a>true</a><b>&lt;tag&gt; &amp; more</b></root>")
		);
	}

	#[rstest]
	fn test_xml_renderer_custom_root() {
		let out = render(&json!([]), &RenderOptions::new().xml_root("people"));
		assert_eq!(out, format!("{DECL}<people></people>"));
	}

	#[rstest]
	#[case("first_name", "first_name")]
	#[case("Full name", "Full_name")]
	#[case("1st", "_1st")]
	#[case("", "_")]
	#[case("a/b", "a_b")]
	fn test_element_name(#[case] key: &str, #[case] expected: &str) {
		assert_eq!(element_name(key), expected);
	}
}

use bytes::Bytes;
use serde_json::{Map, Value};

use crate::renderer::{RenderError, RenderOptions, RenderResult, Renderer, scalar_text};

/// CSV renderer
///
/// Expects a sequence of mappings (a single mapping is treated as a one-row
/// sequence). The header row comes from the keys of the first row. Keys
/// missing from later rows produce empty cells, keys absent from the header
/// are an error, and nested values are written as JSON text.
#[derive(Debug, Clone)]
pub struct CSVRenderer {
	/// CSV delimiter (default: ',')
	pub delimiter: u8,
	/// Include headers in output
	pub headers: bool,
}

impl Default for CSVRenderer {
	fn default() -> Self {
		Self {
			delimiter: b',',
			headers: true,
		}
	}
}

impl CSVRenderer {
	/// Creates a new CSV renderer
	///
	/// # Examples
	///
	/// ```
	/// use arbor_renderers::CSVRenderer;
	///
	/// let renderer = CSVRenderer::new();
	/// assert_eq!(renderer.delimiter, b',');
	/// assert!(renderer.headers);
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the delimiter character
	pub fn delimiter(mut self, delimiter: u8) -> Self {
		self.delimiter = delimiter;
		self
	}

	/// Sets whether to include headers
	pub fn headers(mut self, headers: bool) -> Self {
		self.headers = headers;
		self
	}

	fn effective_delimiter(&self, options: &RenderOptions) -> RenderResult<u8> {
		match options.csv_delimiter {
			None => Ok(self.delimiter),
			Some(c) if c.is_ascii() => Ok(c as u8),
			Some(c) => Err(RenderError::Serialization(format!(
				"CSV delimiter must be ASCII, got {:?}",
				c
			))),
		}
	}
}

fn cell(value: Option<&Value>) -> String {
	match value {
		None => String::new(),
		Some(v @ (Value::Array(_) | Value::Object(_))) => v.to_string(),
		Some(v) => scalar_text(v),
	}
}

fn as_row(item: &Value) -> RenderResult<&Map<String, Value>> {
	item.as_object().ok_or_else(|| {
		RenderError::Serialization("CSV renderer expects mappings as rows".to_string())
	})
}

impl Renderer for CSVRenderer {
	fn format(&self) -> &str {
		"csv"
	}

	fn media_type(&self) -> &str {
		"text/csv; charset=utf-8"
	}

	fn render(&self, data: &Value, options: &RenderOptions) -> RenderResult<Bytes> {
		let rows: Vec<&Value> = match data {
			Value::Array(items) => items.iter().collect(),
			other => vec![other],
		};

		let mut wtr = csv::WriterBuilder::new()
			.delimiter(self.effective_delimiter(options)?)
			.from_writer(vec![]);

		let mut columns: Option<Vec<String>> = None;
		for item in rows {
			let row = as_row(item)?;
			if columns.is_none() {
				let mut keys: Vec<String> = row.keys().cloned().collect();
				if options.sort_keys {
					keys.sort();
				}
				if self.headers {
					wtr.write_record(&keys)
						.map_err(|e| RenderError::Serialization(e.to_string()))?;
				}
				columns = Some(keys);
			}
			let columns = columns.as_deref().unwrap_or_default();
			if let Some(extra) = row.keys().find(|key| !columns.contains(key)) {
				return Err(RenderError::Serialization(format!(
					"CSV row has field '{extra}' not present in the header"
				)));
			}

			let values: Vec<String> = columns.iter().map(|c| cell(row.get(c))).collect();
			wtr.write_record(&values)
				.map_err(|e| RenderError::Serialization(e.to_string()))?;
		}

		let data = wtr
			.into_inner()
			.map_err(|e| RenderError::Serialization(e.to_string()))?;
		Ok(Bytes::from(data))
	}
}

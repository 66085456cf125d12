//! Error types for field resolution and encoding

use arbor_renderers::RenderError;

use crate::settings::SettingsError;

/// Result type for serialization operations
pub type SerializeResult<T> = Result<T, SerializerError>;

/// Errors that can occur while configuring or running a serializer
///
/// Depth exhaustion and cyclic references are not errors: both degrade to a
/// flat representation.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
	/// A named attribute or source path is missing on the object
	#[error("'{type_name}' object has no attribute '{path}'")]
	AttributeResolution { type_name: String, path: String },

	/// A field name is reserved, or two fields resolve to the same output key
	#[error("Field name conflict on '{name}': {reason}")]
	FieldNameConflict { name: String, reason: String },

	/// Rendering the primitive tree failed (including unknown format keys)
	#[error(transparent)]
	Render(#[from] RenderError),

	/// Loading serializer settings failed
	#[error(transparent)]
	Settings(#[from] SettingsError),
}

impl SerializerError {
	/// Create an attribute resolution error
	pub fn attribute(type_name: impl Into<String>, path: impl Into<String>) -> Self {
		SerializerError::AttributeResolution {
			type_name: type_name.into(),
			path: path.into(),
		}
	}

	/// Create a field name conflict error
	pub fn conflict(name: impl Into<String>, reason: impl Into<String>) -> Self {
		SerializerError::FieldNameConflict {
			name: name.into(),
			reason: reason.into(),
		}
	}

	/// Check if this is an attribute resolution error
	pub fn is_attribute_error(&self) -> bool {
		matches!(self, SerializerError::AttributeResolution { .. })
	}

	/// Check if this is a field name conflict
	pub fn is_conflict(&self) -> bool {
		matches!(self, SerializerError::FieldNameConflict { .. })
	}

	/// Check if this error comes from an unknown render format
	pub fn is_unsupported_format(&self) -> bool {
		matches!(
			self,
			SerializerError::Render(RenderError::UnsupportedFormat(_))
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_attribute_error_display() {
		let err = SerializerError::attribute("Person", "sister.age");
		assert_eq!(
			err.to_string(),
			"'Person' object has no attribute 'sister.age'"
		);
		assert!(err.is_attribute_error());
		assert!(!err.is_conflict());
	}

	#[rstest]
	fn test_conflict_display() {
		let err = SerializerError::conflict("*", "reserved field name");
		assert_eq!(err.to_string(), "Field name conflict on '*': reserved field name");
		assert!(err.is_conflict());
	}

	#[rstest]
	fn test_render_error_is_transparent() {
		let err: SerializerError = RenderError::UnsupportedFormat("toml".to_string()).into();
		assert_eq!(err.to_string(), "Unsupported format: toml");
		assert!(err.is_unsupported_format());
	}
}

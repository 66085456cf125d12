//! Serializer settings
//!
//! Project wide defaults loaded from TOML and overridable from environment
//! variables:
//!
//! ```toml
//! default_depth = 2
//! preserve_field_ordering = true
//! default_format = "json"
//!
//! [render]
//! indent = 2
//! sort_keys = false
//! ```

use arbor_renderers::RenderOptions;
use serde::Deserialize;
use std::path::Path;

use crate::recursive::Depth;
use crate::serializer::SerializerBuilder;

/// Default prefix of environment overrides
pub const ENV_PREFIX: &str = "ARBOR_";

/// Errors raised while loading settings
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// An environment override could not be parsed
	#[error("Invalid value for environment variable {key}: '{value}'")]
	Env { key: String, value: String },
}

/// Defaults applied to serializers and rendering
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SerializerSettings {
	/// Depth of top-level serializers; absent means unbounded
	pub default_depth: Option<usize>,
	pub preserve_field_ordering: bool,
	pub include_default_fields: bool,
	/// Format used when the caller does not ask for one; absent means the
	/// primitive tree itself
	pub default_format: Option<String>,
	pub render: RenderOptions,
}

impl SerializerSettings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse settings from TOML text
	///
	/// # Examples
	///
	/// ```
	/// use arbor_serializers::{Depth, SerializerSettings};
	///
	/// let settings = SerializerSettings::from_toml_str(
	///     "default_depth = 1\n[render]\nindent = 4\n",
	/// )
	/// .unwrap();
	/// assert_eq!(settings.depth(), Depth::Limited(1));
	/// assert_eq!(settings.render.indent, Some(4));
	/// ```
	pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(text)?)
	}

	/// Read settings from a TOML file
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let text = std::fs::read_to_string(path)?;
		Self::from_toml_str(&text)
	}

	/// Configured depth as a [`Depth`]
	pub fn depth(&self) -> Depth {
		Depth::from(self.default_depth)
	}

	/// Apply overrides from the process environment
	pub fn with_env_overrides(self, prefix: &str) -> Result<Self, SettingsError> {
		self.apply_env(prefix, std::env::vars())
	}

	/// Apply overrides from `vars`
	///
	/// Only variables starting with `prefix` are considered. The rest of the
	/// name, lowercased, selects the setting; unknown names are ignored.
	///
	/// # Examples
	///
	/// ```
	/// use arbor_serializers::SerializerSettings;
	///
	/// let vars = vec![
	///     ("ARBOR_DEFAULT_DEPTH".to_string(), "0".to_string()),
	///     ("ARBOR_RENDER_SORT_KEYS".to_string(), "yes".to_string()),
	///     ("HOME".to_string(), "/root".to_string()),
	/// ];
	/// let settings = SerializerSettings::new().apply_env("ARBOR_", vars).unwrap();
	/// assert_eq!(settings.default_depth, Some(0));
	/// assert!(settings.render.sort_keys);
	/// ```
	pub fn apply_env<I>(mut self, prefix: &str, vars: I) -> Result<Self, SettingsError>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		for (key, value) in vars {
			let Some(name) = key.strip_prefix(prefix) else {
				continue;
			};
			let invalid = || SettingsError::Env {
				key: key.clone(),
				value: value.clone(),
			};

			match name.to_lowercase().as_str() {
				"default_depth" => {
					self.default_depth = match value.trim().to_lowercase().as_str() {
						"" | "none" | "unbounded" => None,
						n => Some(n.parse::<usize>().map_err(|_| invalid())?),
					}
				}
				"preserve_field_ordering" => {
					self.preserve_field_ordering = parse_bool(&value).ok_or_else(invalid)?
				}
				"include_default_fields" => {
					self.include_default_fields = parse_bool(&value).ok_or_else(invalid)?
				}
				"default_format" => {
					let format = value.trim().to_lowercase();
					self.default_format = (!format.is_empty()).then_some(format);
				}
				"render_indent" => {
					self.render.indent = Some(value.trim().parse::<usize>().map_err(|_| invalid())?)
				}
				"render_sort_keys" => {
					self.render.sort_keys = parse_bool(&value).ok_or_else(invalid)?
				}
				"render_csv_delimiter" => {
					let mut chars = value.chars();
					self.render.csv_delimiter = match (chars.next(), chars.next()) {
						(Some(c), None) => Some(c),
						_ => return Err(invalid()),
					};
				}
				"render_xml_root" => self.render.xml_root = Some(value.trim().to_string()),
				_ => {
					tracing::trace!(key = %key, "ignoring unknown settings override");
				}
			}
		}
		Ok(self)
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.trim().to_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Some(true),
		"false" | "0" | "no" | "off" => Some(false),
		_ => None,
	}
}

impl SerializerBuilder {
	/// Builder seeded with the defaults from `settings`
	pub fn from_settings(settings: &SerializerSettings) -> Self {
		let builder = SerializerBuilder::new()
			.preserve_field_ordering(settings.preserve_field_ordering)
			.include_default_fields(settings.include_default_fields);
		match settings.default_depth {
			Some(depth) => builder.depth(depth),
			None => builder,
		}
	}
}

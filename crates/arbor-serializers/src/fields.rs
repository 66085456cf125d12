//! Field abstraction and leaf fields
//!
//! A [`Field`] knows how to pull one value out of a parent object and turn it
//! into a primitive. [`Serializer`](crate::Serializer) implements the same
//! trait, which is what lets a serializer be declared as a field of another.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::{SerializeResult, SerializerError};
use crate::object::{ObjectRef, read_attribute, read_path};
use crate::recursive::ResolutionContext;
use crate::value::RawValue;

/// Shared handle to a field declaration
pub type FieldRef = Arc<dyn Field>;

/// Where a field reads its raw value from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
	/// The parent object itself (`"*"`)
	Whole,
	/// An attribute name or dotted attribute path
	Path(String),
}

impl Source {
	/// Parse a source string; `"*"` selects the whole parent
	///
	/// # Examples
	///
	/// ```
	/// use arbor_serializers::Source;
	///
	/// assert_eq!(Source::parse("*"), Source::Whole);
	/// assert_eq!(Source::parse("author.name"), Source::Path("author.name".to_string()));
	/// ```
	pub fn parse(source: &str) -> Self {
		if source == "*" {
			Source::Whole
		} else {
			Source::Path(source.to_string())
		}
	}

	pub fn is_whole(&self) -> bool {
		matches!(self, Source::Whole)
	}
}

type TransformFn = dyn Fn(&RawValue) -> SerializeResult<Value> + Send + Sync;

/// User supplied value production, replacing the field's own conversion
#[derive(Clone)]
pub struct Transform(Arc<TransformFn>);

impl Transform {
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&RawValue) -> Value + Send + Sync + 'static,
	{
		Self(Arc::new(move |raw| Ok(f(raw))))
	}

	/// Transform that may fail, for example by reading further attributes
	pub fn fallible<F>(f: F) -> Self
	where
		F: Fn(&RawValue) -> SerializeResult<Value> + Send + Sync + 'static,
	{
		Self(Arc::new(f))
	}

	pub fn apply(&self, raw: &RawValue) -> SerializeResult<Value> {
		(self.0)(raw)
	}
}

impl fmt::Debug for Transform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Transform(..)")
	}
}

/// Options shared by every field
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
	/// Output key override
	pub label: Option<String>,
	/// Where the raw value comes from; unset means the field's own name
	pub source: Option<Source>,
	pub transform: Option<Transform>,
}

impl FieldOptions {
	pub fn is_whole_source(&self) -> bool {
		self.source.as_ref().is_some_and(Source::is_whole)
	}
}

/// A policy turning one attribute of a parent object into a primitive
pub trait Field: Send + Sync + fmt::Debug {
	fn options(&self) -> &FieldOptions;

	/// Convert a raw value into a primitive
	fn to_primitive(&self, raw: &RawValue, ctx: &mut ResolutionContext) -> SerializeResult<Value>;

	/// Output key for this field: the label when set, otherwise `name`
	fn resolve_key(&self, name: &str) -> String {
		self.options()
			.label
			.clone()
			.unwrap_or_else(|| name.to_string())
	}

	/// Read the raw value from `parent`
	fn read_value(&self, parent: &ObjectRef, name: &str) -> SerializeResult<RawValue> {
		match &self.options().source {
			Some(Source::Whole) => Ok(RawValue::Object(parent.clone())),
			Some(Source::Path(path)) => read_path(parent, path),
			None => read_attribute(parent, name),
		}
	}

	/// Produce the primitive for an already read value
	fn resolve_raw(&self, raw: &RawValue, ctx: &mut ResolutionContext) -> SerializeResult<Value> {
		match &self.options().transform {
			Some(transform) => transform.apply(raw),
			None => self.to_primitive(raw, ctx),
		}
	}

	/// Read and convert the value this field contributes for `parent`
	fn resolve_value(
		&self,
		parent: &ObjectRef,
		name: &str,
		ctx: &mut ResolutionContext,
	) -> SerializeResult<Value> {
		let raw = self.read_value(parent, name)?;
		self.resolve_raw(&raw, ctx)
	}
}

/// Generates the `label`, `source` and `transform` builder methods for a type
/// with an `options: FieldOptions` member
macro_rules! impl_field_options {
	() => {
		/// Override the output key
		pub fn label(mut self, label: impl Into<String>) -> Self {
			self.options.label = Some(label.into());
			self
		}

		/// Read from another attribute path, or `"*"` for the parent itself
		pub fn source(mut self, source: impl AsRef<str>) -> Self {
			self.options.source = Some($crate::fields::Source::parse(source.as_ref()));
			self
		}

		/// Replace value production with `f`
		pub fn transform<F>(mut self, f: F) -> Self
		where
			F: Fn(&$crate::RawValue) -> serde_json::Value + Send + Sync + 'static,
		{
			self.options.transform = Some($crate::fields::Transform::new(f));
			self
		}

		/// Replace value production with a fallible `f`
		pub fn try_transform<F>(mut self, f: F) -> Self
		where
			F: Fn(&$crate::RawValue) -> $crate::SerializeResult<serde_json::Value>
				+ Send
				+ Sync
				+ 'static,
		{
			self.options.transform = Some($crate::fields::Transform::fallible(f));
			self
		}
	};
}

pub(crate) use impl_field_options;

/// Plain leaf field
///
/// Scalars pass through, sequences are converted element by element and
/// objects are reduced to their flat string. This is the default flat and
/// recursive strategy of a serializer.
///
/// # Examples
///
/// ```
/// use arbor_serializers::{Field, Record, ResolutionContext, ValueField};
/// use serde_json::json;
///
/// let john = Record::new("Person").with("first_name", "john").into_ref();
/// let field = ValueField::new().label("name");
/// let mut ctx = ResolutionContext::default();
///
/// assert_eq!(field.resolve_key("first_name"), "name");
/// assert_eq!(field.resolve_value(&john, "first_name", &mut ctx).unwrap(), json!("john"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValueField {
	options: FieldOptions,
}

impl ValueField {
	pub fn new() -> Self {
		Self::default()
	}

	impl_field_options!();
}

impl Field for ValueField {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn to_primitive(&self, raw: &RawValue, _ctx: &mut ResolutionContext) -> SerializeResult<Value> {
		Ok(raw.to_flat_primitive())
	}
}

/// Emits the `"<app_label>.<model_name>"` label of the parent model
#[derive(Debug, Clone, Default)]
pub struct ModelNameField {
	options: FieldOptions,
}

impl ModelNameField {
	pub fn new() -> Self {
		Self::default()
	}

	/// Override the output key
	pub fn label(mut self, label: impl Into<String>) -> Self {
		self.options.label = Some(label.into());
		self
	}
}

impl Field for ModelNameField {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	// The model label comes from the parent's metadata, never an attribute.
	fn read_value(&self, parent: &ObjectRef, _name: &str) -> SerializeResult<RawValue> {
		parent
			.model_meta()
			.map(|meta| RawValue::String(meta.label()))
			.ok_or_else(|| SerializerError::attribute(parent.type_name(), "_meta"))
	}

	fn to_primitive(&self, raw: &RawValue, _ctx: &mut ResolutionContext) -> SerializeResult<Value> {
		Ok(raw.to_flat_primitive())
	}
}

fn primary_key_of(object: &ObjectRef) -> SerializeResult<Value> {
	object
		.primary_key()
		.map(|pk| pk.to_flat_primitive())
		.ok_or_else(|| SerializerError::attribute(object.type_name(), "pk"))
}

/// Related object(s) reduced to their primary key(s)
///
/// # Examples
///
/// ```
/// use arbor_serializers::{Field, ModelMeta, PrimaryKeyRelatedField, Record, ResolutionContext};
/// use serde_json::json;
///
/// let author = Record::new("Author")
///     .with("id", 3)
///     .model(ModelMeta::new("library", "Author").fields(["id"]))
///     .into_ref();
/// let book = Record::new("Book").with("author", author).into_ref();
///
/// let mut ctx = ResolutionContext::default();
/// let pk = PrimaryKeyRelatedField::new().resolve_value(&book, "author", &mut ctx).unwrap();
/// assert_eq!(pk, json!(3));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrimaryKeyRelatedField {
	options: FieldOptions,
}

impl PrimaryKeyRelatedField {
	pub fn new() -> Self {
		Self::default()
	}

	impl_field_options!();
}

impl Field for PrimaryKeyRelatedField {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn to_primitive(&self, raw: &RawValue, ctx: &mut ResolutionContext) -> SerializeResult<Value> {
		match raw {
			RawValue::Object(object) => primary_key_of(object),
			RawValue::Sequence(items) => items
				.iter()
				.map(|item| self.to_primitive(item, ctx))
				.collect::<SerializeResult<Vec<_>>>()
				.map(Value::Array),
			scalar => Ok(scalar.to_flat_primitive()),
		}
	}
}

/// Related object(s) reduced to their natural key, or primary key when the
/// object defines no natural key
#[derive(Debug, Clone, Default)]
pub struct NaturalKeyRelatedField {
	options: FieldOptions,
}

impl NaturalKeyRelatedField {
	pub fn new() -> Self {
		Self::default()
	}

	impl_field_options!();
}

impl Field for NaturalKeyRelatedField {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn to_primitive(&self, raw: &RawValue, ctx: &mut ResolutionContext) -> SerializeResult<Value> {
		match raw {
			RawValue::Object(object) => match object.natural_key() {
				Some(key) => Ok(Value::Array(
					key.iter().map(RawValue::to_flat_primitive).collect(),
				)),
				None => primary_key_of(object),
			},
			RawValue::Sequence(items) => items
				.iter()
				.map(|item| self.to_primitive(item, ctx))
				.collect::<SerializeResult<Vec<_>>>()
				.map(Value::Array),
			scalar => Ok(scalar.to_flat_primitive()),
		}
	}
}

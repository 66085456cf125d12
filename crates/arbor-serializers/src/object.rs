//! Object introspection surface
//!
//! The serializer never inspects Rust types directly. Anything that should be
//! serialized implements [`Object`], which reports its attribute names and
//! hands back attribute values as [`RawValue`]s. [`Record`] is a ready-made
//! dynamic implementation.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::{SerializeResult, SerializerError};
use crate::value::RawValue;

/// Shared handle to an object in the graph
pub type ObjectRef = Arc<dyn Object>;

/// Something whose attributes can be read by name
pub trait Object: Send + Sync {
	/// Name of the object's type, used in error messages and the default flat
	/// representation
	fn type_name(&self) -> &str;

	/// Read one attribute (instance attribute or computed property)
	fn get_attribute(&self, name: &str) -> Option<RawValue>;

	/// Names of the instance attributes, in a stable order
	fn attribute_names(&self) -> Vec<String>;

	/// Flat, human readable stand-in used when the object is not expanded
	fn to_flat_string(&self) -> String {
		format!("{} object", self.type_name())
	}

	/// Schema metadata for model-like objects
	fn model_meta(&self) -> Option<&ModelMeta> {
		None
	}

	/// Primary key of a model-like object
	fn primary_key(&self) -> Option<RawValue> {
		self.model_meta()
			.and_then(|meta| self.get_attribute(&meta.pk_name))
	}

	/// Natural key of a model-like object, if it defines one
	fn natural_key(&self) -> Option<Vec<RawValue>> {
		None
	}
}

/// Identity of an object: the address of its shared allocation
pub fn identity(object: &ObjectRef) -> usize {
	Arc::as_ptr(object) as *const () as usize
}

/// Read a single attribute, failing when it does not exist
pub fn read_attribute(object: &ObjectRef, name: &str) -> SerializeResult<RawValue> {
	object
		.get_attribute(name)
		.ok_or_else(|| SerializerError::attribute(object.type_name(), name))
}

/// Follow a dotted attribute path (`author.name`) starting at `object`
///
/// Every intermediate hop must be an object; the error names the type of the
/// starting object and the full path.
pub fn read_path(object: &ObjectRef, path: &str) -> SerializeResult<RawValue> {
	let mut current = object.clone();
	let mut segments = path.split('.').peekable();
	while let Some(segment) = segments.next() {
		let value = current
			.get_attribute(segment)
			.ok_or_else(|| SerializerError::attribute(object.type_name(), path))?;
		if segments.peek().is_none() {
			return Ok(value);
		}
		current = match value {
			RawValue::Object(next) => next,
			_ => return Err(SerializerError::attribute(object.type_name(), path)),
		};
	}
	Err(SerializerError::attribute(object.type_name(), path))
}

/// Schema description of a model-like object
///
/// # Examples
///
/// ```
/// use arbor_serializers::ModelMeta;
///
/// let meta = ModelMeta::new("auth", "User")
///     .fields(["id", "username"])
///     .many_to_many(["groups"]);
/// assert_eq!(meta.label(), "auth.user");
/// assert_eq!(meta.pk_name, "id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMeta {
	pub app_label: String,
	pub model_name: String,
	/// Name of the primary key attribute (default: "id")
	pub pk_name: String,
	/// Concrete fields, primary key included
	pub fields: Vec<String>,
	/// Many-to-many relations
	pub many_to_many: Vec<String>,
}

impl ModelMeta {
	pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
		Self {
			app_label: app_label.into(),
			model_name: model_name.into(),
			pk_name: "id".to_string(),
			fields: Vec::new(),
			many_to_many: Vec::new(),
		}
	}

	pub fn pk_name(mut self, pk_name: impl Into<String>) -> Self {
		self.pk_name = pk_name.into();
		self
	}

	pub fn fields<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.fields = fields.into_iter().map(Into::into).collect();
		self
	}

	pub fn many_to_many<I, S>(mut self, relations: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.many_to_many = relations.into_iter().map(Into::into).collect();
		self
	}

	/// `"<app_label>.<model_name>"`, lowercased
	pub fn label(&self) -> String {
		format!(
			"{}.{}",
			self.app_label.to_lowercase(),
			self.model_name.to_lowercase()
		)
	}
}

type Property = Arc<dyn Fn(&Record) -> RawValue + Send + Sync>;
type DisplayFn = Arc<dyn Fn(&Record) -> String + Send + Sync>;

/// A dynamic object: ordered attributes, computed properties and optional
/// model metadata
///
/// Attributes live behind a lock so that cyclic graphs can be wired after the
/// records are shared. Properties are readable by name but are not reported
/// by [`Object::attribute_names`], and names starting with `_` are treated as
/// private by default-field discovery.
///
/// # Examples
///
/// ```
/// use arbor_serializers::{Object, RawValue, Record};
///
/// let john = Record::new("Person")
///     .with("first_name", "john")
///     .with("last_name", "doe")
///     .property("full_name", |p| {
///         RawValue::from(format!("{} {}", p.get_str("first_name"), p.get_str("last_name")))
///     })
///     .into_arc();
///
/// assert_eq!(john.attribute_names(), vec!["first_name", "last_name"]);
/// assert_eq!(john.get_attribute("full_name"), Some(RawValue::from("john doe")));
/// ```
pub struct Record {
	type_name: String,
	attributes: RwLock<IndexMap<String, RawValue>>,
	properties: IndexMap<String, Property>,
	display: Option<DisplayFn>,
	meta: Option<ModelMeta>,
	natural_key: Vec<String>,
}

impl Record {
	pub fn new(type_name: impl Into<String>) -> Self {
		Self {
			type_name: type_name.into(),
			attributes: RwLock::new(IndexMap::new()),
			properties: IndexMap::new(),
			display: None,
			meta: None,
			natural_key: Vec::new(),
		}
	}

	/// Add an instance attribute
	pub fn with(self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
		self.attributes.write().insert(name.into(), value.into());
		self
	}

	/// Add a computed property
	pub fn property<F>(mut self, name: impl Into<String>, f: F) -> Self
	where
		F: Fn(&Record) -> RawValue + Send + Sync + 'static,
	{
		self.properties.insert(name.into(), Arc::new(f));
		self
	}

	/// Set the flat representation
	pub fn display<F>(mut self, f: F) -> Self
	where
		F: Fn(&Record) -> String + Send + Sync + 'static,
	{
		self.display = Some(Arc::new(f));
		self
	}

	/// Attach model metadata
	pub fn model(mut self, meta: ModelMeta) -> Self {
		self.meta = Some(meta);
		self
	}

	/// Attributes forming the natural key, in order
	pub fn natural_key_fields<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.natural_key = names.into_iter().map(Into::into).collect();
		self
	}

	/// Set or replace an attribute on a shared record
	pub fn set(&self, name: impl Into<String>, value: impl Into<RawValue>) {
		self.attributes.write().insert(name.into(), value.into());
	}

	/// Current value of an instance attribute
	pub fn get(&self, name: &str) -> Option<RawValue> {
		self.attributes.read().get(name).cloned()
	}

	/// String attribute, or an empty string when missing or not a string
	pub fn get_str(&self, name: &str) -> String {
		self.get(name)
			.and_then(|v| v.as_str().map(str::to_string))
			.unwrap_or_default()
	}

	pub fn into_arc(self) -> Arc<Record> {
		Arc::new(self)
	}

	pub fn into_ref(self) -> ObjectRef {
		Arc::new(self)
	}

	/// Build a record graph from any serializable value
	///
	/// JSON objects become records: the top-level one is named `type_name`,
	/// nested ones take the name of the attribute holding them.
	pub fn from_serialize<T: Serialize>(
		type_name: impl Into<String>,
		value: &T,
	) -> Result<Arc<Record>, serde_json::Error> {
		let json = serde_json::to_value(value)?;
		let mut record = Record::new(type_name);
		if let Value::Object(map) = json {
			record = map
				.into_iter()
				.fold(record, |r, (key, v)| {
					let raw = raw_from_json(&key, v);
					r.with(key, raw)
				});
		}
		Ok(record.into_arc())
	}
}

fn raw_from_json(name: &str, value: Value) -> RawValue {
	match value {
		Value::Null => RawValue::Null,
		Value::Bool(b) => RawValue::Bool(b),
		Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
			(Some(i), _, _) => RawValue::Int(i),
			(None, Some(u), _) => RawValue::from(u),
			(None, None, Some(f)) => RawValue::Float(f),
			_ => RawValue::Null,
		},
		Value::String(s) => RawValue::String(s),
		Value::Array(items) => RawValue::Sequence(
			items.into_iter().map(|v| raw_from_json(name, v)).collect(),
		),
		Value::Object(map) => {
			let record = map.into_iter().fold(Record::new(name), |r, (key, v)| {
				let raw = raw_from_json(&key, v);
				r.with(key, raw)
			});
			RawValue::Object(record.into_ref())
		}
	}
}

impl Object for Record {
	fn type_name(&self) -> &str {
		&self.type_name
	}

	fn get_attribute(&self, name: &str) -> Option<RawValue> {
		if let Some(value) = self.get(name) {
			return Some(value);
		}
		self.properties.get(name).map(|property| property(self))
	}

	fn attribute_names(&self) -> Vec<String> {
		self.attributes.read().keys().cloned().collect()
	}

	fn to_flat_string(&self) -> String {
		match &self.display {
			Some(display) => display(self),
			None => format!("{} object", self.type_name),
		}
	}

	fn model_meta(&self) -> Option<&ModelMeta> {
		self.meta.as_ref()
	}

	fn natural_key(&self) -> Option<Vec<RawValue>> {
		if self.natural_key.is_empty() {
			return None;
		}
		self.natural_key
			.iter()
			.map(|name| self.get_attribute(name))
			.collect()
	}
}

impl fmt::Debug for Record {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Record")
			.field("type_name", &self.type_name)
			.field("attributes", &self.attribute_names())
			.field("properties", &self.properties.keys().collect::<Vec<_>>())
			.field("meta", &self.meta)
			.finish()
	}
}

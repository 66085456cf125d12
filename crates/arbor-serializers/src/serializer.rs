//! Composite serializer
//!
//! A [`Serializer`] is a [`Field`] whose value production resolves a set of
//! named sub-fields against an object and assembles them into a mapping. Which
//! sub-fields exist is decided by `fields` / `include` / `exclude` together
//! with the declared fields and default-field discovery; how attributes that
//! hold other objects are rendered is decided by the remaining depth and by
//! whether the object is already being expanded.

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::discovery::{FieldDiscovery, InstanceAttributes, ModelFields};
use crate::error::{SerializeResult, SerializerError};
use crate::fields::{Field, FieldOptions, FieldRef, ValueField, impl_field_options};
use crate::object::{ObjectRef, read_attribute};
use crate::recursive::{Depth, ResolutionContext};
use crate::value::RawValue;

/// Builds the field used for one default-resolved attribute
pub type FieldFactory = Arc<dyn Fn(&Serializer) -> FieldRef + Send + Sync>;

/// How the field for an undeclared attribute is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStrategy {
	/// Depth is exhausted
	Flat,
	/// Depth remains; objects are expanded by a nested serializer
	Nested,
	/// The object is already being expanded higher up
	Recursive,
}

/// Names that can never be used as field names
fn is_reserved(name: &str) -> bool {
	name.is_empty() || name == "*" || name.starts_with("__")
}

fn contains_object(raw: &RawValue) -> bool {
	match raw {
		RawValue::Object(_) => true,
		RawValue::Sequence(items) => items.iter().any(contains_object),
		_ => false,
	}
}

/// Declarative serializer for object graphs
///
/// Instances are immutable; configure them through [`SerializerBuilder`].
///
/// # Examples
///
/// ```
/// use arbor_serializers::{Record, Serializer};
/// use serde_json::json;
///
/// let john = Record::new("Person")
///     .with("first_name", "john")
///     .with("last_name", "doe")
///     .with("age", 42)
///     .into_ref();
///
/// let data = Serializer::new().serialize(john.clone()).unwrap();
/// assert_eq!(data, json!({"first_name": "john", "last_name": "doe", "age": 42}));
///
/// let serializer = Serializer::builder()
///     .fields(["first_name", "age"])
///     .build()
///     .unwrap();
/// assert_eq!(serializer.serialize(john).unwrap(), json!({"first_name": "john", "age": 42}));
/// ```
#[derive(Clone)]
pub struct Serializer {
	options: FieldOptions,
	declared_fields: IndexMap<String, FieldRef>,
	fields: Option<Vec<String>>,
	include: Vec<String>,
	exclude: Vec<String>,
	depth: Option<Depth>,
	include_default_fields: bool,
	preserve_field_ordering: bool,
	discovery: Arc<dyn FieldDiscovery>,
	flat_field_factory: Option<FieldFactory>,
	nested_field_factory: Option<FieldFactory>,
	recursive_field_factory: Option<FieldFactory>,
}

impl Serializer {
	/// Serializer with default settings: every non-private attribute, unbounded
	/// depth, sorted keys
	pub fn new() -> Self {
		Self {
			options: FieldOptions::default(),
			declared_fields: IndexMap::new(),
			fields: None,
			include: Vec::new(),
			exclude: Vec::new(),
			depth: None,
			include_default_fields: false,
			preserve_field_ordering: false,
			discovery: Arc::new(InstanceAttributes),
			flat_field_factory: None,
			nested_field_factory: None,
			recursive_field_factory: None,
		}
	}

	/// Serializer discovering model schema fields instead of instance
	/// attributes
	pub fn model() -> Self {
		Self {
			discovery: Arc::new(ModelFields::new()),
			..Self::new()
		}
	}

	pub fn builder() -> SerializerBuilder {
		SerializerBuilder::new()
	}

	/// Builder preconfigured with model schema discovery
	pub fn model_builder() -> SerializerBuilder {
		SerializerBuilder::new().discovery(ModelFields::new())
	}

	pub fn declared_fields(&self) -> &IndexMap<String, FieldRef> {
		&self.declared_fields
	}

	/// Depth configured on this serializer; `None` inherits the caller's budget
	pub fn depth(&self) -> Option<Depth> {
		self.depth
	}

	pub fn preserves_field_ordering(&self) -> bool {
		self.preserve_field_ordering
	}

	/// Serialize a value with a fresh resolution context
	///
	/// Objects become mappings, sequences become lists and scalars pass
	/// through.
	pub fn serialize(&self, value: impl Into<RawValue>) -> SerializeResult<Value> {
		let mut ctx = ResolutionContext::new(Depth::Unbounded);
		self.to_primitive(&value.into(), &mut ctx)
	}

	/// Ordered names of the sub-fields used for `object`
	///
	/// # Examples
	///
	/// ```
	/// use arbor_serializers::{Record, Serializer};
	///
	/// let john = Record::new("Person")
	///     .with("first_name", "john")
	///     .with("last_name", "doe")
	///     .with("age", 42)
	///     .into_ref();
	///
	/// let serializer = Serializer::builder()
	///     .exclude(["first_name", "last_name"])
	///     .include(["full_name"])
	///     .build()
	///     .unwrap();
	/// assert_eq!(serializer.get_field_names(&john), vec!["age", "full_name"]);
	/// ```
	pub fn get_field_names(&self, object: &ObjectRef) -> Vec<String> {
		if let Some(fields) = &self.fields {
			return fields.clone();
		}

		let mut names: Vec<String> = self.declared_fields.keys().cloned().collect();
		if self.declared_fields.is_empty() || self.include_default_fields {
			names.extend(self.discovery.default_field_names(object.as_ref()));
		}
		names.extend(self.include.iter().cloned());

		let mut seen = HashSet::new();
		names
			.into_iter()
			.filter(|name| !self.exclude.contains(name))
			.filter(|name| seen.insert(name.clone()))
			.collect()
	}

	/// Strategy for an attribute that has no declared field
	pub fn default_strategy(&self, raw: &RawValue, ctx: &ResolutionContext) -> FieldStrategy {
		match raw {
			RawValue::Object(object) if ctx.is_active(object) => FieldStrategy::Recursive,
			_ if !ctx.can_go_deeper() => FieldStrategy::Flat,
			_ => FieldStrategy::Nested,
		}
	}

	/// Field used for an attribute that has no declared field
	///
	/// Without a recursive factory, cycle points use the flat one.
	pub fn get_default_field_serializer(&self, strategy: FieldStrategy) -> FieldRef {
		let factory = match strategy {
			FieldStrategy::Nested => self.nested_field_factory.as_ref(),
			FieldStrategy::Flat => self.flat_field_factory.as_ref(),
			FieldStrategy::Recursive => self
				.recursive_field_factory
				.as_ref()
				.or(self.flat_field_factory.as_ref()),
		};
		match (factory, strategy) {
			(Some(factory), _) => factory(self),
			(None, FieldStrategy::Nested) => Arc::new(self.nested_serializer()),
			(None, _) => Arc::new(ValueField::new()),
		}
	}

	/// The default nested serializer: this configuration without its own
	/// field options or depth
	fn nested_serializer(&self) -> Serializer {
		Serializer {
			options: FieldOptions::default(),
			depth: None,
			..self.clone()
		}
	}

	/// Resolve one sub-field of `object` into its output key and value
	fn resolve_field(
		&self,
		object: &ObjectRef,
		name: &str,
		ctx: &mut ResolutionContext,
	) -> SerializeResult<(String, Value)> {
		if let Some(field) = self.declared_fields.get(name) {
			let value = if field.options().is_whole_source() {
				field.resolve_value(object, name, ctx)?
			} else {
				ctx.descend_with(|ctx| field.resolve_value(object, name, ctx))?
			};
			tracing::trace!(field = name, strategy = "declared", "resolved field");
			return Ok((field.resolve_key(name), value));
		}

		let raw = read_attribute(object, name)?;
		let strategy = self.default_strategy(&raw, ctx);
		match strategy {
			FieldStrategy::Recursive => tracing::debug!(
				field = name,
				type_name = object.type_name(),
				"cyclic reference, using recursive representation"
			),
			FieldStrategy::Flat if contains_object(&raw) => tracing::debug!(
				field = name,
				type_name = object.type_name(),
				"depth exhausted, using flat representation"
			),
			_ => {}
		}

		let field = self.get_default_field_serializer(strategy);
		let resolve = |ctx: &mut ResolutionContext| match field.options().source {
			Some(_) => field.resolve_value(object, name, ctx),
			None => field.resolve_raw(&raw, ctx),
		};
		let value = match strategy {
			FieldStrategy::Nested => ctx.descend_with(resolve)?,
			_ => resolve(ctx)?,
		};
		tracing::trace!(field = name, strategy = ?strategy, "resolved field");
		Ok((field.resolve_key(name), value))
	}

	/// Expand `object` into a mapping, keeping it on the active path
	fn serialize_object(
		&self,
		object: &ObjectRef,
		ctx: &mut ResolutionContext,
	) -> SerializeResult<Value> {
		ctx.visit_with(object, |ctx| {
			let mut entries: Vec<(String, Value)> = Vec::new();
			for name in self.get_field_names(object) {
				let (key, value) = self.resolve_field(object, &name, ctx)?;
				if entries.iter().any(|(existing, _)| *existing == key) {
					return Err(SerializerError::conflict(
						key,
						format!("field '{name}' resolves to an output key already in use"),
					));
				}
				entries.push((key, value));
			}

			if !self.preserve_field_ordering {
				entries.sort_by(|(a, _), (b, _)| a.cmp(b));
			}
			Ok(Value::Object(entries.into_iter().collect::<Map<_, _>>()))
		})
	}

	/// Expand `object` under this serializer's own depth, if it has one
	fn expand(&self, object: &ObjectRef, ctx: &mut ResolutionContext) -> SerializeResult<Value> {
		match self.depth {
			Some(depth) => ctx.with_depth(depth, |ctx| self.serialize_object(object, ctx)),
			None => self.serialize_object(object, ctx),
		}
	}
}

impl Default for Serializer {
	fn default() -> Self {
		Self::new()
	}
}

impl Field for Serializer {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn to_primitive(&self, raw: &RawValue, ctx: &mut ResolutionContext) -> SerializeResult<Value> {
		match raw {
			RawValue::Sequence(items) => items
				.iter()
				.map(|item| self.to_primitive(item, ctx))
				.collect::<SerializeResult<Vec<_>>>()
				.map(Value::Array),
			RawValue::Object(object) if ctx.is_active(object) => {
				tracing::debug!(
					type_name = object.type_name(),
					"cyclic reference, using recursive representation"
				);
				self.get_default_field_serializer(FieldStrategy::Recursive)
					.resolve_raw(raw, ctx)
			}
			RawValue::Object(object) => self.expand(object, ctx),
			scalar => Ok(scalar.to_flat_primitive()),
		}
	}

	// A whole-object source re-projects the parent, which is on the active
	// path by construction; it is expanded directly rather than cut as a cycle.
	fn resolve_value(
		&self,
		parent: &ObjectRef,
		name: &str,
		ctx: &mut ResolutionContext,
	) -> SerializeResult<Value> {
		if !self.options.is_whole_source() {
			let raw = self.read_value(parent, name)?;
			return self.resolve_raw(&raw, ctx);
		}
		match &self.options.transform {
			Some(transform) => transform.apply(&RawValue::Object(parent.clone())),
			None => self.expand(parent, ctx),
		}
	}
}

impl fmt::Debug for Serializer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Serializer")
			.field("options", &self.options)
			.field("declared_fields", &self.declared_fields)
			.field("fields", &self.fields)
			.field("include", &self.include)
			.field("exclude", &self.exclude)
			.field("depth", &self.depth)
			.field("include_default_fields", &self.include_default_fields)
			.field("preserve_field_ordering", &self.preserve_field_ordering)
			.field("discovery", &self.discovery)
			.finish_non_exhaustive()
	}
}

/// Builder for [`Serializer`]
///
/// `build()` checks the configuration once: reserved names in `fields` or
/// `include`, and declared fields resolving to the same output key, are
/// rejected before any object is touched.
///
/// # Examples
///
/// ```
/// use arbor_serializers::{Serializer, ValueField};
///
/// let err = Serializer::builder()
///     .field("first_name", ValueField::new().label("name"))
///     .field("last_name", ValueField::new().label("name"))
///     .build()
///     .unwrap_err();
/// assert!(err.is_conflict());
/// ```
#[derive(Clone, Default)]
pub struct SerializerBuilder {
	options: FieldOptions,
	declared_fields: IndexMap<String, FieldRef>,
	fields: Option<Vec<String>>,
	include: Vec<String>,
	exclude: Vec<String>,
	depth: Option<Depth>,
	include_default_fields: bool,
	preserve_field_ordering: bool,
	discovery: Option<Arc<dyn FieldDiscovery>>,
	flat_field_factory: Option<FieldFactory>,
	nested_field_factory: Option<FieldFactory>,
	recursive_field_factory: Option<FieldFactory>,
}

fn to_strings<I, S>(names: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	names.into_iter().map(Into::into).collect()
}

impl SerializerBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declare a field; declaration order is kept
	pub fn field<F>(self, name: impl Into<String>, field: F) -> Self
	where
		F: Field + 'static,
	{
		self.field_ref(name, Arc::new(field))
	}

	/// Declare an already shared field
	pub fn field_ref(mut self, name: impl Into<String>, field: FieldRef) -> Self {
		self.declared_fields.insert(name.into(), field);
		self
	}

	/// Use exactly these field names, overriding everything else
	///
	/// Repeated names keep their first position.
	pub fn fields<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let names: IndexSet<String> = to_strings(names).into_iter().collect();
		self.fields = Some(names.into_iter().collect());
		self
	}

	pub fn include<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.include = to_strings(names);
		self
	}

	pub fn exclude<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.exclude = to_strings(names);
		self
	}

	pub fn depth(mut self, depth: impl Into<Depth>) -> Self {
		self.depth = Some(depth.into());
		self
	}

	pub fn include_default_fields(mut self, include: bool) -> Self {
		self.include_default_fields = include;
		self
	}

	pub fn preserve_field_ordering(mut self, preserve: bool) -> Self {
		self.preserve_field_ordering = preserve;
		self
	}

	pub fn discovery<D>(mut self, discovery: D) -> Self
	where
		D: FieldDiscovery + 'static,
	{
		self.discovery = Some(Arc::new(discovery));
		self
	}

	pub fn flat_field_factory<F>(mut self, factory: F) -> Self
	where
		F: Fn(&Serializer) -> FieldRef + Send + Sync + 'static,
	{
		self.flat_field_factory = Some(Arc::new(factory));
		self
	}

	pub fn nested_field_factory<F>(mut self, factory: F) -> Self
	where
		F: Fn(&Serializer) -> FieldRef + Send + Sync + 'static,
	{
		self.nested_field_factory = Some(Arc::new(factory));
		self
	}

	pub fn recursive_field_factory<F>(mut self, factory: F) -> Self
	where
		F: Fn(&Serializer) -> FieldRef + Send + Sync + 'static,
	{
		self.recursive_field_factory = Some(Arc::new(factory));
		self
	}

	impl_field_options!();

	/// Validate the configuration and produce the serializer
	pub fn build(self) -> SerializeResult<Serializer> {
		self.validate()?;
		Ok(Serializer {
			options: self.options,
			declared_fields: self.declared_fields,
			fields: self.fields,
			include: self.include,
			exclude: self.exclude,
			depth: self.depth,
			include_default_fields: self.include_default_fields,
			preserve_field_ordering: self.preserve_field_ordering,
			discovery: self
				.discovery
				.unwrap_or_else(|| Arc::new(InstanceAttributes)),
			flat_field_factory: self.flat_field_factory,
			nested_field_factory: self.nested_field_factory,
			recursive_field_factory: self.recursive_field_factory,
		})
	}

	fn validate(&self) -> SerializeResult<()> {
		let mut requested = self.fields.iter().flatten().chain(self.include.iter());
		if let Some(name) = requested.find(|name| is_reserved(name)) {
			return Err(SerializerError::conflict(name.as_str(), "reserved field name"));
		}
		if let Some(name) = self.declared_fields.keys().find(|name| is_reserved(name)) {
			return Err(SerializerError::conflict(name.as_str(), "reserved field name"));
		}

		// Names known before any object is seen; discovered names are checked
		// again when the mapping is assembled.
		let names: Vec<&String> = match &self.fields {
			Some(fields) => fields.iter().collect(),
			None => self
				.declared_fields
				.keys()
				.chain(self.include.iter())
				.filter(|name| !self.exclude.contains(name))
				.collect(),
		};

		let mut keys: IndexMap<String, &String> = IndexMap::new();
		for name in names {
			let key = match self.declared_fields.get(name) {
				Some(field) => field.resolve_key(name),
				None => name.clone(),
			};
			if let Some(previous) = keys.get(&key) {
				if *previous == name {
					continue;
				}
				return Err(SerializerError::conflict(
					key.as_str(),
					format!("fields '{previous}' and '{name}' resolve to the same output key"),
				));
			}
			keys.insert(key, name);
		}
		Ok(())
	}
}

//! Default-field discovery
//!
//! Decides which attribute names a serializer uses for an object when no
//! explicit field list is configured.

use std::fmt;

use crate::object::Object;

/// Strategy producing the default field names of an object
///
/// Implementations must be deterministic for a given object type, and every
/// returned name must be readable through [`Object::get_attribute`].
pub trait FieldDiscovery: Send + Sync + fmt::Debug {
	fn default_field_names(&self, object: &dyn Object) -> Vec<String>;
}

/// Non-private instance attributes (names not starting with `_`)
///
/// # Examples
///
/// ```
/// use arbor_serializers::{FieldDiscovery, InstanceAttributes, Record};
///
/// let obj = Record::new("Example").with("a", 1).with("_hidden", "other");
/// assert_eq!(InstanceAttributes.default_field_names(&obj), vec!["a"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceAttributes;

impl FieldDiscovery for InstanceAttributes {
	fn default_field_names(&self, object: &dyn Object) -> Vec<String> {
		object
			.attribute_names()
			.into_iter()
			.filter(|name| !name.starts_with('_'))
			.collect()
	}
}

/// Schema fields followed by many-to-many relations of a model-like object
///
/// Objects without model metadata fall back to [`InstanceAttributes`].
#[derive(Debug, Clone, Copy)]
pub struct ModelFields {
	include_primary_key: bool,
}

impl ModelFields {
	pub fn new() -> Self {
		Self {
			include_primary_key: true,
		}
	}

	/// Leave the primary key out of the discovered names
	pub fn without_primary_key() -> Self {
		Self {
			include_primary_key: false,
		}
	}
}

impl Default for ModelFields {
	fn default() -> Self {
		Self::new()
	}
}

impl FieldDiscovery for ModelFields {
	fn default_field_names(&self, object: &dyn Object) -> Vec<String> {
		let Some(meta) = object.model_meta() else {
			return InstanceAttributes.default_field_names(object);
		};

		meta.fields
			.iter()
			.filter(|name| self.include_primary_key || **name != meta.pk_name)
			.chain(meta.many_to_many.iter())
			.cloned()
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::object::{ModelMeta, Record};
	use rstest::rstest;

	fn user() -> Record {
		Record::new("User")
			.with("id", 1)
			.with("username", "john")
			.with("_state", "saved")
			.with("groups", Vec::<i64>::new())
			.model(
				ModelMeta::new("auth", "User")
					.fields(["id", "username"])
					.many_to_many(["groups"]),
			)
	}

	#[rstest]
	fn test_instance_attributes_skip_private() {
		assert_eq!(
			InstanceAttributes.default_field_names(&user()),
			vec!["id", "username", "groups"]
		);
	}

	#[rstest]
	fn test_model_fields_follow_schema() {
		assert_eq!(
			ModelFields::new().default_field_names(&user()),
			vec!["id", "username", "groups"]
		);
	}

	#[rstest]
	fn test_model_fields_without_primary_key() {
		assert_eq!(
			ModelFields::without_primary_key().default_field_names(&user()),
			vec!["username", "groups"]
		);
	}

	#[rstest]
	fn test_model_fields_fall_back_for_plain_objects() {
		let plain = Record::new("Example").with("a", 1).with("_b", 2);
		assert_eq!(ModelFields::new().default_field_names(&plain), vec!["a"]);
	}
}

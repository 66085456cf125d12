//! Ready-made serializer configurations
//!
//! These are assembled only from public serializer features; nothing in the
//! resolution engine knows about them.

use std::sync::Arc;

use crate::discovery::ModelFields;
use crate::error::SerializeResult;
use crate::fields::{FieldRef, ModelNameField, NaturalKeyRelatedField, PrimaryKeyRelatedField};
use crate::serializer::Serializer;

/// Model dump format: `{"model": "app.model", "pk": ..., "fields": {...}}`
///
/// `fields` re-projects the whole object through a model serializer that
/// leaves out the primary key, never expands related objects and reduces them
/// to their primary keys.
///
/// # Examples
///
/// ```
/// use arbor_serializers::{ModelMeta, Record, profiles};
/// use serde_json::json;
///
/// let user = Record::new("User")
///     .with("id", 1)
///     .with("username", "john")
///     .model(ModelMeta::new("auth", "User").fields(["id", "username"]))
///     .into_ref();
///
/// let data = profiles::dumpdata().unwrap().serialize(user).unwrap();
/// assert_eq!(
///     data,
///     json!({"model": "auth.user", "pk": 1, "fields": {"username": "john"}})
/// );
/// ```
pub fn dumpdata() -> SerializeResult<Serializer> {
	dump_profile(primary_key_relation)
}

/// Same as [`dumpdata`], with related objects written as natural keys where
/// they define one
pub fn dumpdata_natural() -> SerializeResult<Serializer> {
	dump_profile(natural_key_relation)
}

fn primary_key_relation() -> FieldRef {
	Arc::new(PrimaryKeyRelatedField::new())
}

fn natural_key_relation() -> FieldRef {
	Arc::new(NaturalKeyRelatedField::new())
}

fn dump_profile(relation: fn() -> FieldRef) -> SerializeResult<Serializer> {
	let fields = Serializer::builder()
		.source("*")
		.discovery(ModelFields::without_primary_key())
		.depth(0)
		.flat_field_factory(move |_| relation())
		.preserve_field_ordering(true)
		.build()?;

	Serializer::builder()
		.field("model", ModelNameField::new())
		.field("pk", PrimaryKeyRelatedField::new().source("*"))
		.field("fields", fields)
		.preserve_field_ordering(true)
		.build()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::object::{ModelMeta, ObjectRef, Record};
	use chrono::NaiveDate;
	use rstest::{fixture, rstest};
	use serde_json::json;

	fn group(id: i64, name: &str) -> ObjectRef {
		Record::new("Group")
			.with("id", id)
			.with("name", name)
			.model(ModelMeta::new("auth", "Group").fields(["id", "name"]))
			.natural_key_fields(["name"])
			.into_ref()
	}

	#[fixture]
	fn user() -> ObjectRef {
		Record::new("User")
			.with("id", 7)
			.with("username", "john")
			.with("date_joined", NaiveDate::from_ymd_opt(2012, 3, 4).unwrap())
			.with("groups", vec![group(1, "staff"), group(2, "admins")])
			.with("_state", "loaded")
			.model(
				ModelMeta::new("auth", "User")
					.fields(["id", "username", "date_joined"])
					.many_to_many(["groups"]),
			)
			.into_ref()
	}

	#[rstest]
	fn test_dumpdata_shape_and_order(user: ObjectRef) {
		let data = dumpdata().unwrap().serialize(user).unwrap();
		assert_eq!(
			data,
			json!({
				"model": "auth.user",
				"pk": 7,
				"fields": {
					"username": "john",
					"date_joined": "2012-03-04",
					"groups": [1, 2]
				}
			})
		);

		let keys: Vec<_> = data.as_object().unwrap().keys().cloned().collect();
		assert_eq!(keys, vec!["model", "pk", "fields"]);
		let field_keys: Vec<_> = data["fields"].as_object().unwrap().keys().cloned().collect();
		assert_eq!(field_keys, vec!["username", "date_joined", "groups"]);
	}

	#[rstest]
	fn test_dumpdata_natural_keys(user: ObjectRef) {
		let data = dumpdata_natural().unwrap().serialize(user).unwrap();
		assert_eq!(data["fields"]["groups"], json!([["staff"], ["admins"]]));
	}

	#[rstest]
	fn test_dumpdata_many_objects(user: ObjectRef) {
		let data = dumpdata()
			.unwrap()
			.serialize(vec![user, group(3, "guests")])
			.unwrap();
		assert_eq!(
			data[1],
			json!({"model": "auth.group", "pk": 3, "fields": {"name": "guests"}})
		);
	}

	#[rstest]
	fn test_dumpdata_self_reference_uses_primary_key() {
		let employee = Record::new("Employee")
			.with("id", 4)
			.model(ModelMeta::new("hr", "Employee").fields(["id", "manager"]))
			.into_arc();
		employee.set("manager", employee.clone());

		let data = dumpdata().unwrap().serialize(employee.clone()).unwrap();
		assert_eq!(data["fields"], json!({"manager": 4}));

		employee.set("manager", None::<i64>);
	}

	#[rstest]
	fn test_dumpdata_requires_model_metadata() {
		let plain = Record::new("Note").with("text", "hi").into_ref();
		let err = dumpdata().unwrap().serialize(plain).unwrap_err();
		assert!(err.is_attribute_error());
	}
}

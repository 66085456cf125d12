//! Integration tests for the encode entry point and legacy dump profile

use arbor_renderers::RenderOptions;
use arbor_serializers::{
	Encoded, ModelMeta, ObjectRef, Record, Serializer, SerializerBuilder, SerializerSettings,
	profiles,
};
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn john() -> ObjectRef {
	Record::new("Person")
		.with("first_name", "john")
		.with("last_name", "doe")
		.with("age", 42)
		.into_ref()
}

fn encode_text(serializer: &Serializer, value: ObjectRef, format: &str) -> String {
	let bytes = serializer
		.encode(value, Some(format), &RenderOptions::new())
		.unwrap()
		.into_bytes()
		.unwrap();
	String::from_utf8(bytes.to_vec()).unwrap()
}

#[rstest]
fn test_encode_tree(john: ObjectRef) {
	let encoded = Serializer::new()
		.encode(john, None, &RenderOptions::new())
		.unwrap();
	assert_eq!(
		encoded,
		Encoded::Tree(json!({"first_name": "john", "last_name": "doe", "age": 42}))
	);
}

#[rstest]
#[case("json", r#"{"age":42,"first_name":"john","last_name":"doe"}"#)]
#[case("yaml", "age: 42\nfirst_name: john\nlast_name: doe\n")]
#[case(
	"xml",
	r#"<?xml version="1.0" encoding="utf-8"?><root><age>42</age><first_name>john</first_name><last_name>doe</last_name></root>"#
)]
#[case("csv", "age,first_name,last_name\n42,john,doe\n")]
fn test_encode_formats(john: ObjectRef, #[case] format: &str, #[case] expected: &str) {
	assert_eq!(encode_text(&Serializer::new(), john, format), expected);
}

#[rstest]
fn test_encode_preserves_declared_order(john: ObjectRef) {
	let serializer = Serializer::builder()
		.fields(["last_name", "first_name"])
		.preserve_field_ordering(true)
		.build()
		.unwrap();
	assert_eq!(
		encode_text(&serializer, john, "json"),
		r#"{"last_name":"doe","first_name":"john"}"#
	);
}

#[rstest]
fn test_encode_unsupported_format(john: ObjectRef) {
	let err = Serializer::new()
		.encode(john, Some("msgpack"), &RenderOptions::new())
		.unwrap_err();
	assert!(err.is_unsupported_format());
	assert_eq!(err.to_string(), "Unsupported format: msgpack");
}

#[rstest]
fn test_encode_many_as_csv() {
	let people: Vec<ObjectRef> = [("john", 42), ("jane", 44)]
		.into_iter()
		.map(|(name, age)| {
			Record::new("Person")
				.with("name", name)
				.with("age", age)
				.into_ref()
		})
		.collect();

	let bytes = Serializer::new()
		.encode(people, Some("csv"), &RenderOptions::new().csv_delimiter(';'))
		.unwrap()
		.into_bytes()
		.unwrap();
	assert_eq!(&bytes[..], b"age;name\n42;john\n44;jane\n");
}

#[rstest]
fn test_settings_drive_serializer_and_rendering() {
	let settings = SerializerSettings::from_toml_str(
		r#"
default_depth = 0
preserve_field_ordering = true
default_format = "json"

[render]
indent = 2
"#,
	)
	.unwrap();

	let jane = Record::new("Person")
		.with("name", "jane")
		.display(|p| p.get_str("name"))
		.into_ref();
	let john = Record::new("Person")
		.with("name", "john")
		.with("sister", jane)
		.into_ref();

	let serializer = SerializerBuilder::from_settings(&settings).build().unwrap();
	let bytes = serializer
		.encode(john, settings.default_format.as_deref(), &settings.render)
		.unwrap()
		.into_bytes()
		.unwrap();
	assert_eq!(
		String::from_utf8(bytes.to_vec()).unwrap(),
		"{\n  \"name\": \"john\",\n  \"sister\": \"jane\"\n}"
	);
}

#[rstest]
fn test_dumpdata_rendered_as_json() {
	let group = Record::new("Group")
		.with("id", 2)
		.with("name", "staff")
		.model(ModelMeta::new("auth", "Group").fields(["id", "name"]))
		.into_ref();
	let user = Record::new("User")
		.with("id", 1)
		.with("username", "john")
		.with("groups", vec![group])
		.model(
			ModelMeta::new("auth", "User")
				.fields(["id", "username"])
				.many_to_many(["groups"]),
		)
		.into_ref();

	let text = encode_text(&profiles::dumpdata().unwrap(), user, "json");
	assert_eq!(
		text,
		r#"{"model":"auth.user","pk":1,"fields":{"username":"john","groups":[2]}}"#
	);
}

#[rstest]
fn test_model_serializer_uses_schema_fields() {
	let user = Record::new("User")
		.with("id", 1)
		.with("username", "john")
		.with("password_hash", "x")
		.with("_state", "loaded")
		.model(ModelMeta::new("auth", "User").fields(["id", "username"]))
		.into_ref();

	assert_eq!(
		Serializer::model().serialize(user.clone()).unwrap(),
		json!({"id": 1, "username": "john"})
	);
	assert_eq!(
		Serializer::new().serialize(user).unwrap(),
		json!({"id": 1, "username": "john", "password_hash": "x"})
	);
}

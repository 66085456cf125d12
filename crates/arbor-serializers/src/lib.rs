//! # arbor-serializers
//!
//! Declarative serialization of object graphs into primitive trees.
//!
//! A [`Serializer`] decides which attributes of an object become output fields
//! and how each attribute value is itself serialized:
//!
//! - `fields` selects exactly the listed names; otherwise the declared fields,
//!   the discovered default fields and `include` are combined and `exclude`
//!   removes names
//! - attributes without a declared field holding other objects are expanded
//!   by a nested serializer until the depth budget runs out, then written flat
//! - an object already being expanded higher up is never expanded again
//!
//! Serializers are fields themselves, so they nest. The resulting
//! `serde_json::Value` can be rendered to JSON, YAML, XML or CSV through
//! [`Serializer::encode`].
//!
//! ## Examples
//!
//! ```rust
//! use arbor_serializers::{Record, Serializer};
//! use serde_json::json;
//!
//! let jane = Record::new("Person")
//!     .with("first_name", "jane")
//!     .display(|p| p.get_str("first_name"))
//!     .into_ref();
//! let john = Record::new("Person")
//!     .with("first_name", "john")
//!     .with("siblings", vec![jane])
//!     .into_ref();
//!
//! let serializer = Serializer::builder().depth(0).build().unwrap();
//! assert_eq!(
//!     serializer.serialize(john).unwrap(),
//!     json!({"first_name": "john", "siblings": ["jane"]})
//! );
//! ```

pub mod discovery;
pub mod encode;
pub mod error;
pub mod fields;
pub mod object;
pub mod profiles;
pub mod recursive;
pub mod serializer;
pub mod settings;
pub mod value;

pub use discovery::{FieldDiscovery, InstanceAttributes, ModelFields};
pub use encode::Encoded;
pub use error::{SerializeResult, SerializerError};
pub use fields::{
	Field, FieldOptions, FieldRef, ModelNameField, NaturalKeyRelatedField,
	PrimaryKeyRelatedField, Source, Transform, ValueField,
};
pub use object::{ModelMeta, Object, ObjectRef, Record, identity, read_attribute, read_path};
pub use recursive::{Depth, ResolutionContext};
pub use serializer::{FieldFactory, FieldStrategy, Serializer, SerializerBuilder};
pub use settings::{ENV_PREFIX, SerializerSettings, SettingsError};
pub use value::RawValue;

//! # Arbor
//!
//! Declarative, format-independent serialization of object graphs.
//!
//! Arbor separates two concerns:
//!
//! - deciding how an object graph becomes a tree of primitive values: which
//!   attributes become fields, how deep nested objects are expanded and what
//!   happens when the same object is reached again
//! - rendering that tree as JSON, YAML, XML or CSV
//!
//! The first lives in [`serializers`], the second in [`renderers`].
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor::prelude::*;
//! use serde_json::json;
//!
//! let john = Record::new("Person")
//!     .with("first_name", "john")
//!     .with("last_name", "doe")
//!     .with("age", 42)
//!     .into_ref();
//!
//! let serializer = Serializer::builder()
//!     .fields(["first_name", "age"])
//!     .build()
//!     .unwrap();
//! assert_eq!(serializer.serialize(john.clone()).unwrap(), json!({"first_name": "john", "age": 42}));
//!
//! let yaml = serializer
//!     .encode(john, Some("yaml"), &RenderOptions::new())
//!     .unwrap()
//!     .into_bytes()
//!     .unwrap();
//! assert_eq!(&yaml[..], b"age: 42\nfirst_name: john\n");
//! ```

pub use arbor_renderers as renderers;
pub use arbor_serializers as serializers;

pub use arbor_renderers::{
	CSVRenderer, JSONRenderer, RenderError, RenderOptions, RenderResult, Renderer,
	RendererRegistry, XMLRenderer, YAMLRenderer,
};
pub use arbor_serializers::{
	Depth, Encoded, Field, FieldRef, FieldStrategy, ModelMeta, ModelNameField,
	NaturalKeyRelatedField, Object, ObjectRef, PrimaryKeyRelatedField, RawValue, Record,
	SerializeResult, Serializer, SerializerBuilder, SerializerError, SerializerSettings,
	SettingsError, ValueField, profiles,
};

/// Commonly used types
pub mod prelude {
	pub use crate::{
		Encoded, Field, ModelMeta, ModelNameField, NaturalKeyRelatedField, Object, ObjectRef,
		PrimaryKeyRelatedField, RawValue, Record, RenderOptions, RendererRegistry, Serializer,
		SerializerError, SerializerSettings, ValueField,
	};
}

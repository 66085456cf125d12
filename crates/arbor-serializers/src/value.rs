//! Raw attribute values and their conversion to primitives
//!
//! A [`RawValue`] is what an object hands back when one of its attributes is
//! read. The primitive tree produced by serialization is a
//! `serde_json::Value`: scalars, sequences and string-keyed mappings only.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Timelike, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::object::{Object, ObjectRef, identity};

/// A value read from an object attribute, before serialization
#[derive(Clone, Default)]
pub enum RawValue {
	#[default]
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Decimal(Decimal),
	String(String),
	Date(NaiveDate),
	Time(NaiveTime),
	DateTime(DateTime<Utc>),
	Sequence(Vec<RawValue>),
	Object(ObjectRef),
}

impl RawValue {
	/// Returns the object if this value is one
	pub fn as_object(&self) -> Option<&ObjectRef> {
		match self {
			RawValue::Object(obj) => Some(obj),
			_ => None,
		}
	}

	/// Returns the string slice if this value is a string
	pub fn as_str(&self) -> Option<&str> {
		match self {
			RawValue::String(s) => Some(s.as_str()),
			_ => None,
		}
	}

	/// Converts a scalar into its primitive form
	///
	/// Returns `None` for sequences and objects, which need a field policy.
	///
	/// # Examples
	///
	/// ```
	/// use arbor_serializers::RawValue;
	/// use chrono::NaiveDate;
	/// use serde_json::json;
	///
	/// assert_eq!(RawValue::from(42).scalar_primitive(), Some(json!(42)));
	/// let date = NaiveDate::from_ymd_opt(2012, 3, 4).unwrap();
	/// assert_eq!(RawValue::from(date).scalar_primitive(), Some(json!("2012-03-04")));
	/// assert_eq!(RawValue::Sequence(vec![]).scalar_primitive(), None);
	/// ```
	pub fn scalar_primitive(&self) -> Option<Value> {
		let value = match self {
			RawValue::Null => Value::Null,
			RawValue::Bool(b) => Value::Bool(*b),
			RawValue::Int(i) => Value::from(*i),
			RawValue::Float(f) => Value::from(*f),
			RawValue::Decimal(d) => Value::String(d.to_string()),
			RawValue::String(s) => Value::String(s.clone()),
			RawValue::Date(d) => Value::String(canonical_date(d)),
			RawValue::Time(t) => Value::String(canonical_time(t)),
			RawValue::DateTime(dt) => Value::String(canonical_datetime(dt)),
			RawValue::Sequence(_) | RawValue::Object(_) => return None,
		};
		Some(value)
	}

	/// Flat representation: scalars pass through, sequences are converted
	/// element by element and objects become their flat string
	pub fn to_flat_primitive(&self) -> Value {
		match self {
			RawValue::Sequence(items) => {
				Value::Array(items.iter().map(RawValue::to_flat_primitive).collect())
			}
			RawValue::Object(obj) => Value::String(obj.to_flat_string()),
			scalar => scalar.scalar_primitive().unwrap_or(Value::Null),
		}
	}
}

/// `YYYY-MM-DD`
pub fn canonical_date(date: &NaiveDate) -> String {
	date.format("%Y-%m-%d").to_string()
}

/// `HH:MM:SS`, with milliseconds when the time has a fractional part
pub fn canonical_time(time: &NaiveTime) -> String {
	if time.nanosecond() == 0 {
		time.format("%H:%M:%S").to_string()
	} else {
		time.format("%H:%M:%S%.3f").to_string()
	}
}

/// RFC 3339 in UTC with a `Z` suffix, with milliseconds when the timestamp
/// has a fractional part
pub fn canonical_datetime(datetime: &DateTime<Utc>) -> String {
	let format = if datetime.timestamp_subsec_nanos() == 0 {
		SecondsFormat::Secs
	} else {
		SecondsFormat::Millis
	};
	datetime.to_rfc3339_opts(format, true)
}

impl fmt::Debug for RawValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RawValue::Null => f.write_str("Null"),
			RawValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
			RawValue::Int(i) => f.debug_tuple("Int").field(i).finish(),
			RawValue::Float(x) => f.debug_tuple("Float").field(x).finish(),
			RawValue::Decimal(d) => f.debug_tuple("Decimal").field(d).finish(),
			RawValue::String(s) => f.debug_tuple("String").field(s).finish(),
			RawValue::Date(d) => f.debug_tuple("Date").field(d).finish(),
			RawValue::Time(t) => f.debug_tuple("Time").field(t).finish(),
			RawValue::DateTime(dt) => f.debug_tuple("DateTime").field(dt).finish(),
			RawValue::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
			RawValue::Object(obj) => f
				.debug_struct("Object")
				.field("type_name", &obj.type_name())
				.field("id", &format_args!("0x{:x}", identity(obj)))
				.finish(),
		}
	}
}

/// Objects compare by identity, everything else by value
impl PartialEq for RawValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(RawValue::Null, RawValue::Null) => true,
			(RawValue::Bool(a), RawValue::Bool(b)) => a == b,
			(RawValue::Int(a), RawValue::Int(b)) => a == b,
			(RawValue::Float(a), RawValue::Float(b)) => a == b,
			(RawValue::Decimal(a), RawValue::Decimal(b)) => a == b,
			(RawValue::String(a), RawValue::String(b)) => a == b,
			(RawValue::Date(a), RawValue::Date(b)) => a == b,
			(RawValue::Time(a), RawValue::Time(b)) => a == b,
			(RawValue::DateTime(a), RawValue::DateTime(b)) => a == b,
			(RawValue::Sequence(a), RawValue::Sequence(b)) => a == b,
			(RawValue::Object(a), RawValue::Object(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

macro_rules! raw_value_from {
	( $( $t:ty => |$v:ident| $expr:expr, )* ) => {
		$(
			impl From<$t> for RawValue {
				fn from($v: $t) -> Self {
					$expr
				}
			}
		)*
	};
}

raw_value_from! {
	bool => |v| RawValue::Bool(v),
	i8 => |v| RawValue::Int(v.into()),
	i16 => |v| RawValue::Int(v.into()),
	i32 => |v| RawValue::Int(v.into()),
	i64 => |v| RawValue::Int(v),
	u8 => |v| RawValue::Int(v.into()),
	u16 => |v| RawValue::Int(v.into()),
	u32 => |v| RawValue::Int(v.into()),
	u64 => |v| i64::try_from(v).map(RawValue::Int).unwrap_or_else(|_| RawValue::Decimal(v.into())),
	usize => |v| i64::try_from(v).map(RawValue::Int).unwrap_or_else(|_| RawValue::Decimal(v.into())),
	f32 => |v| RawValue::Float(v.into()),
	f64 => |v| RawValue::Float(v),
	Decimal => |v| RawValue::Decimal(v),
	String => |v| RawValue::String(v),
	&str => |v| RawValue::String(v.to_string()),
	NaiveDate => |v| RawValue::Date(v),
	NaiveTime => |v| RawValue::Time(v),
	NaiveDateTime => |v| RawValue::DateTime(v.and_utc()),
	DateTime<Utc> => |v| RawValue::DateTime(v),
	ObjectRef => |v| RawValue::Object(v),
}

impl<T: Object + 'static> From<Arc<T>> for RawValue {
	fn from(object: Arc<T>) -> Self {
		RawValue::Object(object)
	}
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(RawValue::Null)
	}
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
	fn from(items: Vec<T>) -> Self {
		RawValue::Sequence(items.into_iter().map(Into::into).collect())
	}
}

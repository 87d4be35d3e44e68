//! Reply envelope and structural discrimination of reply payloads.
//!
//! A handler adapter answers with `{ "ok": true, "value": V }` or
//! `{ "ok": false, "error": "..." }`. Hand-written workers may instead post
//! the bare result. A payload is read as an envelope iff it is an object with a
//! boolean `ok` field, so a plain result object that happens to carry a boolean
//! `ok` is misread as an envelope.

use serde::Serialize;
use serde::ser::SerializeStruct;
use serde_json::{Map, Value};

const OK_FIELD: &str = "ok";
const VALUE_FIELD: &str = "value";
const ERROR_FIELD: &str = "error";

/// Outbound message body produced by a handler adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<T> {
	/// The handler completed with `value`.
	Success {
		/// Handler result.
		value: T,
	},
	/// The handler failed; `error` is its textual description.
	Failure {
		/// Failure description, surfaced verbatim to the caller.
		error: String,
	},
}

impl<T> Envelope<T> {
	/// Builds a failure envelope from anything displayable.
	pub fn failure(error: impl std::fmt::Display) -> Self {
		Self::Failure { error: error.to_string() }
	}

	/// Returns `true` for [`Envelope::Success`].
	pub const fn is_ok(&self) -> bool {
		matches!(self, Self::Success { .. })
	}
}

impl<T: Serialize> Envelope<T> {
	/// Serializes the envelope into its JSON wire shape.
	pub fn to_value(&self) -> serde_json::Result<Value> {
		serde_json::to_value(self)
	}
}

impl<T: Serialize> Serialize for Envelope<T> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		let mut state = serializer.serialize_struct("Envelope", 2)?;
		match self {
			Self::Success { value } => {
				state.serialize_field(OK_FIELD, &true)?;
				state.serialize_field(VALUE_FIELD, value)?;
			}
			Self::Failure { error } => {
				state.serialize_field(OK_FIELD, &false)?;
				state.serialize_field(ERROR_FIELD, error)?;
			}
		}
		state.end()
	}
}

/// Classified reply payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
	/// The payload carried an `ok` discriminant.
	Envelope(Envelope<Value>),
	/// The payload is the result itself.
	Plain(Value),
}

impl Reply {
	/// Classifies a raw reply payload.
	///
	/// A success envelope without `value` carries `null`. A failure envelope
	/// with a non-string `error` carries that field's JSON text, or an empty
	/// description when the field is absent.
	pub fn classify(payload: Value) -> Self {
		let mut fields = match payload {
			Value::Object(fields) if fields.get(OK_FIELD).is_some_and(Value::is_boolean) => fields,
			other => return Self::Plain(other),
		};
		if fields.get(OK_FIELD) == Some(&Value::Bool(true)) {
			let value = fields.remove(VALUE_FIELD).unwrap_or(Value::Null);
			return Self::Envelope(Envelope::Success { value });
		}
		let error = match fields.remove(ERROR_FIELD) {
			Some(Value::String(s)) => s,
			Some(other) => other.to_string(),
			None => String::new(),
		};
		Self::Envelope(Envelope::Failure { error })
	}

	/// Collapses the reply into the carried result or the failure description.
	pub fn into_result(self) -> Result<Value, String> {
		match self {
			Self::Plain(value) | Self::Envelope(Envelope::Success { value }) => Ok(value),
			Self::Envelope(Envelope::Failure { error }) => Err(error),
		}
	}
}

/// Wire value of a failure envelope. Unlike [`Envelope::to_value`] this cannot fail.
pub fn failure_value(error: impl std::fmt::Display) -> Value {
	let mut fields = Map::new();
	fields.insert(OK_FIELD.to_string(), Value::Bool(false));
	fields.insert(ERROR_FIELD.to_string(), Value::String(error.to_string()));
	Value::Object(fields)
}

/// Returns `true` when `payload` is an object with a boolean `ok` field.
pub fn is_envelope(payload: &Value) -> bool {
	payload.as_object().and_then(|fields| fields.get(OK_FIELD)).is_some_and(Value::is_boolean)
}

//! Dotted-path access into entities, as in `"Device.Type.Text"`.
//!
//! Absence is a normal result here. Nothing in this module fails loudly.

use serde_json::{map::Entry, Map, Value};
use tracing::warn;

/// Looks up `path` in `entity`.
///
/// Sequences met along the way broadcast the remaining path over their items:
/// the result is a new sequence of each truthy item's lookup, with [`Value::Null`]
/// standing in for items whose lookup is absent.
#[must_use]
pub fn get(entity: &Value, path: &str) -> Option<Value> {
	let segments: Vec<&str> = path.split('.').collect();
	get_segments(entity, &segments)
}

fn get_segments(value: &Value, segments: &[&str]) -> Option<Value> {
	let (first, rest) = match segments.split_first() {
		Some(split) => split,
		None => return Some(value.clone()),
	};
	match value {
		Value::Array(items) => Some(Value::Array(
			items.iter().filter(|item| is_truthy(item)).map(|item| get_segments(item, segments).unwrap_or(Value::Null)).collect(),
		)),
		Value::Object(map) => get_segments(map.get(*first)?, rest),
		_ => None,
	}
}

/// Writes `value` at `path`, creating missing intermediate mappings.
///
/// A field that already holds a value is promoted to `[old, value]`, or appended to if it already is a sequence.
/// This is how repeated `name`s in one subtree (checked checkboxes, for example) collapse into a single field.
pub fn set(entity: &mut Value, path: &str, value: Value) {
	let mut segments = path.split('.');
	let last = match segments.next_back() {
		Some(last) => last,
		None => return,
	};

	let mut current = entity;
	for segment in segments {
		let map = match object_mut(current) {
			Some(map) => map,
			None => return warn!("Cannot write through a non-object value at {:?} of path {:?}.", segment, path),
		};
		current = map.entry(segment).or_insert_with(|| Value::Object(Map::new()));
	}

	let map = match object_mut(current) {
		Some(map) => map,
		None => return warn!("Cannot write {:?} into a non-object value.", path),
	};
	match map.entry(last) {
		Entry::Vacant(vacant) => {
			vacant.insert(value);
		}
		Entry::Occupied(occupied) => match occupied.into_mut() {
			slot @ Value::Null => *slot = value,
			Value::Array(items) => items.push(value),
			existing => {
				let old = existing.take();
				*existing = Value::Array(vec![old, value]);
			}
		},
	}
}

/// `null` is treated like a missing mapping so that it can be written through.
fn object_mut(value: &mut Value) -> Option<&mut Map<String, Value>> {
	if value.is_null() {
		*value = Value::Object(Map::new());
	}
	value.as_object_mut()
}

/// Renders a field for display: sequences comma-joined, `null` and absent as empty.
#[must_use]
pub fn to_text(value: Option<&Value>) -> String {
	match value {
		None | Some(Value::Null) => String::new(),
		Some(Value::String(string)) => string.clone(),
		Some(Value::Array(items)) => items.iter().map(|item| to_text(Some(item))).collect::<Vec<_>>().join(","),
		Some(other) => other.to_string(),
	}
}

fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(bool) => *bool,
		Value::Number(number) => number.as_f64().map_or(true, |number| number != 0.0 && !number.is_nan()),
		Value::String(string) => !string.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

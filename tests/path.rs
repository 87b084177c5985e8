use eno_dom::path::{get, set, to_text};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[test]
fn set_then_get_nested() {
	let mut entity = json!({});
	set(&mut entity, "a.b.c", json!(5));
	assert_eq!(entity, json!({ "a": { "b": { "c": 5 } } }));
	assert_eq!(get(&entity, "a.b.c"), Some(json!(5)));
}

#[test]
fn missing_paths_are_absent() {
	assert_eq!(get(&json!({}), "x.y"), None);
	assert_eq!(get(&json!({ "x": 1 }), "x.y"), None);
	assert_eq!(get(&json!("scalar"), "x"), None);
}

#[test]
fn repeated_writes_collect_into_a_sequence() {
	let mut entity = json!({ "n": 1 });
	set(&mut entity, "n", json!(2));
	assert_eq!(entity, json!({ "n": [1, 2] }));

	set(&mut entity, "n", json!(3));
	assert_eq!(entity, json!({ "n": [1, 2, 3] }));
}

#[test]
fn null_is_overwritten_and_written_through() {
	let mut entity = json!({ "a": null, "b": null });
	set(&mut entity, "a.x", json!(1));
	set(&mut entity, "b", json!("b"));
	assert_eq!(entity, json!({ "a": { "x": 1 }, "b": "b" }));

	let mut entity = Value::Null;
	set(&mut entity, "x", json!("y"));
	assert_eq!(entity, json!({ "x": "y" }));
}

#[test]
fn scalar_intermediates_are_left_alone() {
	let mut entity = json!({ "a": 1 });
	set(&mut entity, "a.b", json!(2));
	assert_eq!(entity, json!({ "a": 1 }));
}

#[test]
fn sequences_broadcast_the_rest_of_the_path() {
	let entity = json!({
		"Devices": [
			{ "Type": { "Text": "phone" } },
			null,
			{ "Type": { "Text": "tablet" } },
			{ "Other": 1 },
			0,
		]
	});
	assert_eq!(get(&entity, "Devices.Type.Text"), Some(json!(["phone", "tablet", null])));
}

#[test]
fn broadcast_keeps_positions_of_items_without_the_field() {
	let entity = json!({ "a": [{ "b": 1 }, { "c": 2 }, { "b": 3 }] });
	let found = get(&entity, "a.b");
	assert_eq!(found, Some(json!([1, null, 3])));
	assert_eq!(to_text(found.as_ref()), "1,,3");
}

#[test]
fn text_rendering() {
	assert_eq!(to_text(None), "");
	assert_eq!(to_text(Some(&Value::Null)), "");
	assert_eq!(to_text(Some(&json!("plain"))), "plain");
	assert_eq!(to_text(Some(&json!(42))), "42");
	assert_eq!(to_text(Some(&json!(1.5))), "1.5");
	assert_eq!(to_text(Some(&json!(true))), "true");
	assert_eq!(to_text(Some(&json!(["a", 1, null]))), "a,1,");
}

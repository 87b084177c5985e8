use eno_dom::{
	mem::{MemDom, NodeId},
	Binder, Conversion, Dom,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn bind(markup: &str) -> (Binder<MemDom>, NodeId) {
	let mut dom = MemDom::new();
	let root = dom.parse(markup)[0];
	(Binder::new(dom), root)
}

fn find(binder: &Binder<MemDom>, root: NodeId, selector: &str) -> NodeId {
	binder.dom().select(root, selector).unwrap_or_else(|| panic!("no match for {:?}", selector))
}

#[test]
fn write_then_read_round_trip() {
	let (mut binder, form) = bind(
		r#"<form>
			<input name="Name">
			<span name="Device.Type"></span>
			<img name="Photo">
			<textarea name="Note"></textarea>
			<select name="Size"><option>S</option><option>M</option></select>
		</form>"#,
	);

	let entity = json!({
		"Name": "Ann",
		"Device": { "Type": "phone" },
		"Photo": "ann.png",
		"Note": "hi",
		"Size": "M",
	});
	assert_eq!(binder.write(&form, Some(&entity)), form);
	assert_eq!(binder.read(&form), entity);
}

#[test]
fn numeric_inputs_read_as_numbers() {
	let (mut binder, root) = bind(
		r#"<div>
			<input type="number" name="Age" value="42">
			<input type="range" name="Height" value="1.5">
			<input type="number" name="Bad" value="abc">
		</div>"#,
	);
	assert_eq!(binder.read(&root), json!({ "Age": 42, "Height": 1.5, "Bad": "abc" }));
}

#[test]
fn checkboxes_and_radios() {
	let (mut binder, root) = bind(
		r#"<div>
			<input type="checkbox" name="Tags" value="a">
			<input type="checkbox" name="Tags" value="b">
			<input type="checkbox" name="Tags" value="c">
			<input type="radio" name="Size" value="S" checked>
			<input type="radio" name="Size" value="M">
		</div>"#,
	);
	assert_eq!(binder.read(&root), json!({ "Size": "S" }));

	let entity = json!({ "Tags": ["a", "c"], "Size": "M" });
	binder.write(&root, Some(&entity));
	assert_eq!(binder.read(&root), entity);

	binder.write(&root, Some(&json!({ "Tags": true })));
	assert_eq!(binder.read(&root), json!({ "Tags": ["a", "b", "c"] }));
}

#[test]
fn disabled_controls_are_not_read() {
	let (mut binder, root) = bind(
		r#"<div>
			<input name="A" value="1">
			<fieldset disabled name="B"><input name="C" value="3"></fieldset>
			<input name="D" value="4" disabled>
		</div>"#,
	);
	assert_eq!(binder.read(&root), json!({ "A": "1" }));

	binder.write(&root, Some(&json!({ "C": "written" })));
	let c = find(&binder, root, "[name=C]");
	assert_eq!(binder.dom().value(&c), "written");
}

#[test]
fn disabled_only_applies_to_controls_and_fieldsets() {
	let (mut binder, root) = bind(
		r#"<div>
			<section disabled><b name="Title">kept</b><input name="Count" value="2"></section>
			<span name="Note" disabled>also kept</span>
			<button name="Action" value="go" disabled></button>
			<fieldset disabled><div><b name="Hidden">dropped</b></div></fieldset>
		</div>"#,
	);
	assert_eq!(binder.read(&root), json!({ "Title": "kept", "Count": "2", "Note": "also kept" }));
}

#[test]
fn read_converter() {
	let (mut binder, root) = bind(
		r#"<div>
			<span case="Total">ignored</span>
			<p case="Secret"><b name="Inner">x</b></p>
			<i case="Pass" name="Plain">text</i>
		</div>"#,
	);

	let entity = binder.read_with(&root, |_, _, _, case| match case {
		"Total" => Conversion::Value(json!(10)),
		"Secret" => Conversion::Veto,
		_ => Conversion::Default,
	});
	assert_eq!(entity, json!({ "Total": 10, "Plain": "text" }));
}

#[test]
fn write_converter() {
	let (mut binder, root) = bind(
		r#"<div>
			<span case="Full" name="First"></span>
			<em case="Hidden" name="First">keep</em>
			<b case="Pass" name="First"></b>
		</div>"#,
	);

	binder.write_with(&root, Some(&json!({ "First": "Ann", "Last": "Lee" })), |dom, element, entity, case| match case {
		"Full" => entity.map_or(Conversion::Default, |entity| {
			Conversion::Value(json!(format!("{} {}", entity["First"].as_str().unwrap_or_default(), entity["Last"].as_str().unwrap_or_default())))
		}),
		"Hidden" => {
			dom.set_attribute(element, "class", "vetoed");
			Conversion::Veto
		}
		_ => Conversion::Default,
	});

	let span = find(&binder, root, "span");
	let em = find(&binder, root, "em");
	let b = find(&binder, root, "b");
	assert_eq!(binder.dom().text(&span), "Ann Lee");
	assert_eq!(binder.dom().text(&em), "keep");
	assert_eq!(binder.dom().attribute(&em, "class").as_deref(), Some("vetoed"));
	assert_eq!(binder.dom().text(&b), "Ann");
}

#[test]
fn empty_values_fall_back_to_the_original() {
	let (mut binder, root) = bind(
		r#"<div>
			<span name="Name">Unknown</span>
			<span name="Label" title="fixed">-</span>
			<img name="Photo" src="blank.png">
		</div>"#,
	);
	let name = find(&binder, root, "[name=Name]");
	let label = find(&binder, root, "[name=Label]");
	let photo = find(&binder, root, "img");

	binder.write(&root, Some(&json!({ "Name": "Ann", "Label": "L", "Photo": "ann.png" })));
	assert_eq!(binder.dom().text(&name), "Ann");
	assert_eq!(binder.dom().attribute(&name, "title").as_deref(), Some("Ann"));
	assert_eq!(binder.dom().text(&label), "L");
	assert_eq!(binder.dom().attribute(&label, "title").as_deref(), Some("fixed"));
	assert_eq!(binder.dom().attribute(&photo, "src").as_deref(), Some("ann.png"));

	binder.write(&root, Some(&json!({})));
	assert_eq!(binder.dom().text(&name), "Unknown");
	assert_eq!(binder.dom().attribute(&name, "title").as_deref(), Some("Unknown"));
	assert_eq!(binder.dom().text(&label), "-");
	assert_eq!(binder.dom().attribute(&photo, "src").as_deref(), Some("blank.png"));
}

#[test]
fn writing_tags_the_root() {
	let (mut binder, root) = bind(r#"<div><p><span name="Name"></span></p></div>"#);
	let span = find(&binder, root, "span");
	let entity = json!({ "Name": "Ann" });

	binder.write(&root, Some(&entity));
	assert_eq!(binder.entity(&span), Some(&entity));
	assert_eq!(binder.element(&span), Some(root));

	binder.write(&root, None);
	assert_eq!(binder.entity(&span), None);
	assert_eq!(binder.element(&span), None);
	assert_eq!(binder.dom().text(&span), "");
}

#[test]
fn read_all_keeps_non_empty_entities() {
	let mut dom = MemDom::new();
	let roots = dom
		.parse(r#"<div><b name="X">1</b></div><div><b name="X">2</b></div><div><b>no name</b></div>"#);
	let mut binder = Binder::new(dom);

	assert_eq!(roots.len(), 3);
	assert_eq!(binder.read_all(&roots), vec![json!({ "X": "1" }), json!({ "X": "2" })]);
}

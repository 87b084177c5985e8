use eno_dom::{mem::MemDom, Dom};
use pretty_assertions::assert_eq;

#[test]
fn markup_round_trip() {
	let markup = r#"<ul class="a b"><li id="x">1 &amp; 2</li><br><input disabled=""></ul>"#;
	let mut dom = MemDom::new();
	let ul = dom.parse(markup)[0];
	assert_eq!(dom.markup(ul), markup);
	assert_eq!(dom.tag_name(&ul), "UL");
	assert_eq!(dom.children(&ul).len(), 3);
}

#[test]
fn template_content_is_inert() {
	let mut dom = MemDom::new();
	let template = dom.parse("<template><b>x</b><i>y</i></template>")[0];
	assert!(dom.children(&template).is_empty());

	let content = dom.template_content(&template).unwrap();
	assert_eq!(dom.fragment_element_count(&content), 2);
	assert_eq!(dom.markup(template), "<template><b>x</b><i>y</i></template>");

	let clones = dom.instantiate(&content);
	assert_eq!(clones.len(), 2);
	assert_eq!(dom.parent(&clones[0]), None);
	assert_eq!(dom.fragment_element_count(&content), 2);
}

#[test]
fn top_level_text_is_dropped() {
	let mut dom = MemDom::new();
	let elements = dom.parse("hello <b>x</b> <!-- note --> <i>y</i> bye");
	assert_eq!(elements.len(), 2);
}

#[test]
fn table_parts_parse_at_the_top_level() {
	let mut dom = MemDom::new();
	let rows = dom.parse("<tr><td>1</td></tr><tr><td>2</td></tr>");
	assert_eq!(rows.iter().map(|row| dom.tag_name(row)).collect::<Vec<_>>(), ["TR", "TR"]);
	assert_eq!(dom.text(&rows[1]), "2");
}

#[test]
fn malformed_markup_is_recovered_like_a_browser() {
	let mut dom = MemDom::new();

	let ul = dom.parse("<ul><li>a<li>b</ul>")[0];
	assert_eq!(dom.markup(ul), "<ul><li>a</li><li>b</li></ul>");

	let div = dom.parse("<div><p>a<p>b</div>")[0];
	assert_eq!(dom.children(&div).len(), 2);
	assert_eq!(dom.markup(div), "<div><p>a</p><p>b</p></div>");

	let div = dom.parse("<div><span>open</div>")[0];
	assert_eq!(dom.markup(div), "<div><span>open</span></div>");

	assert!(dom.parse("</p>").iter().all(|element| dom.tag_name(element) == "P"));
	assert_eq!(dom.parse("<div").len(), 0);
}

#[test]
fn character_references_are_decoded() {
	let mut dom = MemDom::new();
	let p = dom.parse("<p title=\"&lt;&quot;&gt;\">&#65;&#x42;&copy;&nbsp;&amp;</p>")[0];
	assert_eq!(dom.text(&p), "AB\u{a9}\u{a0}&");
	assert_eq!(dom.attribute(&p, "title").as_deref(), Some("<\">"));
	assert_eq!(dom.markup(p), "<p title=\"<&quot;>\">AB\u{a9}&nbsp;&amp;</p>");
}

#[test]
fn selectors() {
	let mut dom = MemDom::new();
	let root = dom.parse(
		r#"<div id="root">
			<ul class="list"><li name="A">1</li><li class="row odd" name="B">2</li></ul>
			<p><b name="A">3</b></p>
		</div>"#,
	)[0];

	let texts = |dom: &MemDom, selector: &str| dom.selects(root, selector).iter().map(|element| dom.text(element)).collect::<Vec<_>>();
	assert_eq!(texts(&dom, "[name=A]"), ["1", "3"]);
	assert_eq!(texts(&dom, "ul .row"), ["2"]);
	assert_eq!(texts(&dom, "li.row.odd[name='B']"), ["2"]);
	assert_eq!(texts(&dom, "p b"), ["3"]);
	assert_eq!(texts(&dom, "ul b"), Vec::<String>::new());
	assert_eq!(texts(&dom, "ul > li:last-child, p > b"), ["2", "3"]);
	assert_eq!(texts(&dom, "li:not([class~=odd])"), ["1"]);
	assert_eq!(texts(&dom, "[name^=B]"), ["2"]);
	assert_eq!(dom.select(root, "#root"), None);
	assert_eq!(dom.select(root, "li").map(|li| dom.text(&li)).as_deref(), Some("1"));
}

#[test]
fn unparseable_selectors_match_nothing() {
	let mut dom = MemDom::new();
	let root = dom.parse(r#"<div><b name="A">x</b></div>"#)[0];

	assert_eq!(dom.selects(root, "[name]\u{e9}"), Vec::new());
	assert_eq!(dom.selects(root, ""), Vec::new());
	assert_eq!(dom.select(root, "b:unknown"), None);
	assert_eq!(dom.selects(root, "[name]").len(), 1);
}

#[test]
fn control_values() {
	let mut dom = MemDom::new();
	let root = dom.parse(
		r#"<form>
			<select><option value="1">One</option><option selected>Two</option></select>
			<textarea>note</textarea>
			<input type="checkbox">
			<input value="typed">
		</form>"#,
	)[0];
	let controls = dom.children(&root);

	assert_eq!(dom.value(&controls[0]), "Two");
	assert_eq!(dom.value(&controls[1]), "note");
	assert_eq!(dom.value(&controls[2]), "on");
	assert!(!dom.checked(&controls[2]));
	assert_eq!(dom.value(&controls[3]), "typed");

	dom.set_value(&controls[3], "changed");
	dom.set_checked(&controls[2], true);
	assert_eq!(dom.value(&controls[3]), "changed");
	assert!(dom.checked(&controls[2]));
}

#[test]
fn insertion_and_removal() {
	let mut dom = MemDom::new();
	let ul = dom.parse("<ul><li>a</li><li>c</li></ul>")[0];
	let b = dom.parse("<li>b</li>")[0];
	let children = dom.children(&ul);

	dom.insert_before(&ul, &b, Some(&children[1]));
	assert_eq!(dom.markup(ul), "<ul><li>a</li><li>b</li><li>c</li></ul>");

	dom.insert_before(&b, &ul, None);
	assert_eq!(dom.parent(&ul), None);

	dom.remove(&children[0]);
	assert_eq!(dom.markup(ul), "<ul><li>b</li><li>c</li></ul>");

	let fragment = dom.detach_children(&ul);
	assert_eq!(dom.fragment_element_count(&fragment), 2);
	assert_eq!(dom.markup(ul), "<ul></ul>");
}

#[test]
fn removed_nodes_are_freed_and_read_as_detached() {
	let mut dom = MemDom::new();
	let ul = dom.parse("<ul><li>a</li><li><b>b</b></li></ul>")[0];
	let before = dom.node_count();
	let second = dom.children(&ul)[1];
	let b = dom.children(&second)[0];

	dom.remove(&second);
	assert_eq!(dom.node_count(), before - 3);
	assert_eq!(dom.parent(&b), None);
	assert_eq!(dom.tag_name(&b), "");
	assert_eq!(dom.text(&b), "");

	let fresh = dom.create_element("li");
	assert_ne!(fresh, second);
	dom.insert_before(&ul, &second, None);
	assert_eq!(dom.markup(ul), "<ul><li>a</li></ul>");
}

#[test]
fn set_text_reuses_a_sole_text_node() {
	let mut dom = MemDom::new();
	let p = dom.parse("<p>old</p>")[0];
	let count = dom.node_count();

	dom.set_text(&p, "new");
	assert_eq!(dom.node_count(), count);
	assert_eq!(dom.markup(p), "<p>new</p>");

	dom.set_text(&p, "");
	assert_eq!(dom.node_count(), count - 1);

	let div = dom.parse("<div><b>x</b>y</div>")[0];
	let count = dom.node_count();
	dom.set_text(&div, "z");
	assert_eq!(dom.node_count(), count - 2);
	assert_eq!(dom.markup(div), "<div>z</div>");
}

use super::{MemDom, Node, NodeData, NodeId};
use html5ever::{
	namespace_url, ns,
	tendril::StrTendril,
	tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink},
	Attribute, ExpandedName, LocalName, QualName,
};
use std::borrow::Cow;
use tracing::debug;

/// Builds [`html5ever`]'s parse result directly into a [`MemDom`].
pub(super) struct Sink<'a> {
	dom: &'a mut MemDom,
	document: NodeId,
	/// Named for handles that aren't elements. The tree builder doesn't ask about those.
	unnamed: QualName,
}
impl<'a> Sink<'a> {
	pub(super) fn new(dom: &'a mut MemDom) -> Self {
		let document = dom.push(NodeData::Document);
		Self {
			dom,
			document,
			unnamed: QualName::new(None, ns!(), LocalName::from("")),
		}
	}

	/// Inserts `child` into `parent` before `reference`, merging text into a preceding text node.
	fn insert(&mut self, parent: NodeId, child: NodeOrText<NodeId>, reference: Option<NodeId>) {
		match child {
			NodeOrText::AppendNode(node) => self.dom.insert_node(parent, node, reference),
			NodeOrText::AppendText(text) => {
				let siblings = self.dom.children_of(parent);
				let index = reference.and_then(|reference| siblings.iter().position(|&sibling| sibling == reference)).unwrap_or(siblings.len());
				let previous = index.checked_sub(1).and_then(|index| siblings.get(index)).copied();

				if let Some(Node { data: NodeData::Text(existing), .. }) = previous.and_then(|previous| self.dom.nodes.get_mut(previous)) {
					existing.push_str(&text);
				} else {
					let node = self.dom.create_text(&text);
					self.dom.insert_node(parent, node, reference);
				}
			}
		}
	}
}

fn attributes(attrs: Vec<Attribute>) -> impl Iterator<Item = (QualName, String)> {
	attrs.into_iter().map(|attribute| (attribute.name, String::from(&*attribute.value)))
}

impl TreeSink for Sink<'_> {
	type Handle = NodeId;
	type Output = NodeId;

	fn finish(self) -> NodeId {
		self.document
	}

	fn parse_error(&mut self, msg: Cow<'static, str>) {
		debug!("Recovering from malformed markup: {}", msg);
	}

	fn get_document(&mut self) -> NodeId {
		self.document
	}

	fn elem_name<'a>(&'a self, target: &'a NodeId) -> ExpandedName<'a> {
		self.dom.element_data(*target).map_or(&self.unnamed, |data| &data.name).expanded()
	}

	fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>, flags: ElementFlags) -> NodeId {
		self.dom.push_element(name, attributes(attrs).collect(), flags.template)
	}

	fn create_comment(&mut self, text: StrTendril) -> NodeId {
		self.dom.push(NodeData::Comment(String::from(&*text)))
	}

	fn create_pi(&mut self, _target: StrTendril, data: StrTendril) -> NodeId {
		self.dom.push(NodeData::Comment(String::from(&*data)))
	}

	fn append(&mut self, parent: &NodeId, child: NodeOrText<NodeId>) {
		self.insert(*parent, child, None);
	}

	fn append_based_on_parent_node(&mut self, element: &NodeId, prev_element: &NodeId, child: NodeOrText<NodeId>) {
		if self.dom.parent_node(*element).is_some() {
			self.append_before_sibling(element, child);
		} else {
			self.append(prev_element, child);
		}
	}

	fn append_doctype_to_document(&mut self, _name: StrTendril, _public_id: StrTendril, _system_id: StrTendril) {}

	fn get_template_contents(&mut self, target: &NodeId) -> NodeId {
		self.dom.element_data(*target).and_then(|data| data.content).unwrap_or(*target)
	}

	fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
		x == y
	}

	fn set_quirks_mode(&mut self, _mode: QuirksMode) {}

	fn append_before_sibling(&mut self, sibling: &NodeId, new_node: NodeOrText<NodeId>) {
		if let Some(parent) = self.dom.parent_node(*sibling) {
			self.insert(parent, new_node, Some(*sibling));
		}
	}

	fn add_attrs_if_missing(&mut self, target: &NodeId, attrs: Vec<Attribute>) {
		if let Some(data) = self.dom.element_data_mut(*target) {
			for (name, value) in attributes(attrs) {
				if !data.attributes.iter().any(|(existing, _)| *existing == name) {
					data.attributes.push((name, value));
				}
			}
		}
	}

	fn remove_from_parent(&mut self, target: &NodeId) {
		self.dom.detach(*target);
	}

	fn reparent_children(&mut self, node: &NodeId, new_parent: &NodeId) {
		for child in self.dom.children_of(*node).to_vec() {
			self.dom.insert_node(*new_parent, child, None);
		}
	}
}

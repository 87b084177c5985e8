//! A retained, in-memory element tree.
//!
//! [`MemDom`] implements [`Dom`] without a browser, for native use of the binder and for tests.
//! Markup is read by [`html5ever`] with a browser's error recovery, and [`MemDom::select`]/[`MemDom::selects`]
//! understand the CSS selectors of the [`selectors`] crate.
//!
//! Nodes live in a [`SlotMap`]. [`Dom::remove`] frees the removed subtree, as does [`Dom::set_text`] for replaced content,
//! so ids of freed nodes go stale: they read as detached and empty, and are never reused for other nodes.

use crate::dom::Dom;
use html5ever::{
	driver::parse_fragment_for_element,
	local_name, namespace_url, ns,
	serialize::{Serialize, SerializeOpts, Serializer, TraversalScope},
	tendril::TendrilSink,
	LocalName, ParseOpts, QualName,
};
use slotmap::{new_key_type, SlotMap};
use std::io;
use tracing::{error, warn};

mod select;
mod sink;

new_key_type! {
	/// Refers to a node of one [`MemDom`].
	pub struct NodeId;
}

#[derive(Debug, Clone)]
enum NodeData {
	/// Root of a tree under construction by [`sink::Sink`].
	Document,
	Element(ElementData),
	Text(String),
	Comment(String),
	Fragment,
}

#[derive(Debug, Clone)]
struct ElementData {
	name: QualName,
	attributes: Vec<(QualName, String)>,
	/// Set once the value is changed through [`Dom::set_value`]; until then it follows the markup.
	value: Option<String>,
	checked: Option<bool>,
	/// Template content.
	content: Option<NodeId>,
}
impl ElementData {
	fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.iter().find(|(n, _)| (*n.local).eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
	}
}

#[derive(Debug, Clone)]
struct Node {
	data: NodeData,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

#[derive(Debug, Default, Clone)]
pub struct MemDom {
	nodes: SlotMap<NodeId, Node>,
}
impl MemDom {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// How many nodes are alive, attached or not.
	#[must_use]
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	fn push(&mut self, data: NodeData) -> NodeId {
		self.nodes.insert(Node { data, parent: None, children: Vec::new() })
	}

	fn push_element(&mut self, name: QualName, attributes: Vec<(QualName, String)>, template: bool) -> NodeId {
		let content = if template { Some(self.push(NodeData::Fragment)) } else { None };
		self.push(NodeData::Element(ElementData {
			name,
			attributes,
			value: None,
			checked: None,
			content,
		}))
	}

	pub fn create_element(&mut self, tag: &str) -> NodeId {
		let local = tag.to_ascii_lowercase();
		let template = local == "template";
		self.push_element(QualName::new(None, ns!(html), LocalName::from(local)), Vec::new(), template)
	}

	pub fn create_text(&mut self, text: &str) -> NodeId {
		self.push(NodeData::Text(text.to_owned()))
	}

	pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
		self.insert_node(parent, child, None);
	}

	#[must_use]
	pub fn is_element(&self, node: NodeId) -> bool {
		matches!(self.nodes.get(node), Some(Node { data: NodeData::Element(_), .. }))
	}

	fn element_data(&self, node: NodeId) -> Option<&ElementData> {
		match &self.nodes.get(node)?.data {
			NodeData::Element(data) => Some(data),
			_ => None,
		}
	}

	fn element_data_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
		match &mut self.nodes.get_mut(node)?.data {
			NodeData::Element(data) => Some(data),
			_ => None,
		}
	}

	fn children_of(&self, node: NodeId) -> &[NodeId] {
		self.nodes.get(node).map_or(&[][..], |node| node.children.as_slice())
	}

	/// The parent of any kind, including fragments.
	fn parent_node(&self, node: NodeId) -> Option<NodeId> {
		self.nodes.get(node)?.parent
	}

	fn element_children(&self, node: NodeId) -> Vec<NodeId> {
		self.children_of(node).iter().copied().filter(|&child| self.is_element(child)).collect()
	}

	fn detach(&mut self, node: NodeId) {
		if let Some(parent) = self.nodes.get_mut(node).and_then(|node| node.parent.take()) {
			if let Some(parent) = self.nodes.get_mut(parent) {
				parent.children.retain(|&child| child != node);
			}
		}
	}

	/// Detaches `node` and frees it together with its descendants and template content.
	fn release(&mut self, node: NodeId) {
		self.detach(node);
		let mut pending = vec![node];
		while let Some(node) = pending.pop() {
			if let Some(removed) = self.nodes.remove(node) {
				pending.extend(removed.children);
				if let NodeData::Element(ElementData { content: Some(content), .. }) = removed.data {
					pending.push(content);
				}
			}
		}
	}

	fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
		loop {
			if node == ancestor {
				return true;
			}
			match self.parent_node(node) {
				Some(parent) => node = parent,
				None => return false,
			}
		}
	}

	fn insert_node(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
		if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
			return error!("Cannot insert {:?} into {:?}: stale node.", child, parent);
		}
		if self.is_inclusive_ancestor(child, parent) {
			return error!("Refusing to insert {:?} into its own subtree at {:?}.", child, parent);
		}
		self.detach(child);

		let siblings = &mut self.nodes[parent].children;
		let index = match reference {
			None => siblings.len(),
			Some(reference) => match siblings.iter().position(|&sibling| sibling == reference) {
				Some(index) => index,
				None => {
					warn!("Reference node {:?} is not a child of {:?}. Appending instead.", reference, parent);
					siblings.len()
				}
			},
		};
		siblings.insert(index, child);
		self.nodes[child].parent = Some(parent);
	}

	fn deep_clone(&mut self, node: NodeId) -> Option<NodeId> {
		let original = self.nodes.get(node)?;
		let (mut data, children) = (original.data.clone(), original.children.clone());
		if let NodeData::Element(ElementData { content, .. }) = &mut data {
			*content = content.and_then(|content| self.deep_clone(content));
		}
		let clone = self.push(data);
		for child in children {
			if let Some(child) = self.deep_clone(child) {
				self.insert_node(clone, child, None);
			}
		}
		Some(clone)
	}

	/// Reads `markup` into new detached nodes and returns the top-level elements.
	///
	/// The markup is treated like the content of a `<template>`, so table parts and list items may appear at the top level.
	/// Malformed markup is recovered from the way browsers do it: `<ul><li>a<li>b</ul>` yields two items.
	/// Top-level text and comments are dropped.
	pub fn parse(&mut self, markup: &str) -> Vec<NodeId> {
		let context = self.push_element(QualName::new(None, ns!(html), local_name!("template")), Vec::new(), true);
		let document = parse_fragment_for_element(sink::Sink::new(self), ParseOpts::default(), context, None).one(markup);

		let top_level = match self.element_children(document).first() {
			Some(&html) => self.element_children(html),
			None => Vec::new(),
		};
		for &element in &top_level {
			self.detach(element);
		}
		self.release(document);
		self.release(context);
		top_level
	}

	/// Serializes `node` as HTML, with lower-case tag names.
	#[must_use]
	pub fn markup(&self, node: NodeId) -> String {
		let mut markup = Vec::new();
		let opts = SerializeOpts {
			traversal_scope: TraversalScope::IncludeNode,
			..SerializeOpts::default()
		};
		if let Err(error) = html5ever::serialize(&mut markup, &Serializable { dom: self, node }, opts) {
			error!("Failed to serialize {:?}: {}", node, error);
		}
		String::from_utf8_lossy(&markup).into_owned()
	}

	/// The first descendant of `root` matching `selector`, in document order.
	#[must_use]
	pub fn select(&self, root: NodeId, selector: &str) -> Option<NodeId> {
		self.selects(root, selector).into_iter().next()
	}

	/// All descendants of `root` matching `selector`, in document order.
	///
	/// Template content is not searched.
	/// A selector that doesn't parse is logged and matches nothing.
	#[must_use]
	pub fn selects(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
		let selectors = match select::parse(selector) {
			Ok(selectors) => selectors,
			Err(reason) => {
				error!("Unsupported selector {:?}: {}", selector, reason);
				return Vec::new();
			}
		};

		let mut found = Vec::new();
		let mut pending: Vec<NodeId> = self.element_children(root).into_iter().rev().collect();
		while let Some(element) = pending.pop() {
			if select::matches(&selectors, self, element) {
				found.push(element);
			}
			pending.extend(self.element_children(element).into_iter().rev());
		}
		found
	}

	fn selected_option_value(&self, select: NodeId) -> String {
		let options = self.selects(select, "option");
		let option = options.iter().find(|&option| self.has_attribute(option, "selected")).or_else(|| options.first());
		match option {
			Some(option) => self.attribute(option, "value").unwrap_or_else(|| self.text(option)),
			None => String::new(),
		}
	}
}

impl Dom for MemDom {
	type Element = NodeId;
	type Fragment = NodeId;
	type Key = NodeId;

	fn key(&self, element: &NodeId) -> NodeId {
		*element
	}

	fn tag_name(&self, element: &NodeId) -> String {
		match self.element_data(*element) {
			Some(data) if data.name.ns == ns!(html) => (*data.name.local).to_ascii_uppercase(),
			Some(data) => data.name.local.to_string(),
			None => String::new(),
		}
	}

	fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
		self.element_data(*element)?.attribute(name).map(ToOwned::to_owned)
	}

	fn set_attribute(&mut self, element: &NodeId, name: &str, value: &str) {
		let data = match self.element_data_mut(*element) {
			Some(data) => data,
			None => return error!("Cannot set attribute {:?} on non-element {:?}.", name, element),
		};
		match data.attributes.iter_mut().find(|(n, _)| (*n.local).eq_ignore_ascii_case(name)) {
			Some((_, existing)) => value.clone_into(existing),
			None => data.attributes.push((
				QualName::new(None, ns!(), LocalName::from(name.to_ascii_lowercase())),
				value.to_owned(),
			)),
		}
	}

	fn remove_attribute(&mut self, element: &NodeId, name: &str) {
		if let Some(data) = self.element_data_mut(*element) {
			data.attributes.retain(|(n, _)| !(*n.local).eq_ignore_ascii_case(name));
		}
	}

	fn parent(&self, element: &NodeId) -> Option<NodeId> {
		self.parent_node(*element).filter(|&parent| self.is_element(parent))
	}

	fn children(&self, element: &NodeId) -> Vec<NodeId> {
		self.element_children(*element)
	}

	fn text(&self, element: &NodeId) -> String {
		match self.nodes.get(*element).map(|node| &node.data) {
			Some(NodeData::Text(text)) => text.clone(),
			Some(NodeData::Comment(_)) | None => String::new(),
			Some(_) => self.children_of(*element).iter().map(|child| self.text(child)).collect(),
		}
	}

	fn set_text(&mut self, element: &NodeId, text: &str) {
		let children = self.children_of(*element).to_vec();
		if let ([only], false) = (children.as_slice(), text.is_empty()) {
			if let Some(Node { data: NodeData::Text(existing), .. }) = self.nodes.get_mut(*only) {
				return text.clone_into(existing);
			}
		}

		for child in children {
			self.release(child);
		}
		if !text.is_empty() {
			let text = self.create_text(text);
			self.insert_node(*element, text, None);
		}
	}

	fn value(&self, element: &NodeId) -> String {
		let data = match self.element_data(*element) {
			Some(data) => data,
			None => return String::new(),
		};
		if let Some(value) = &data.value {
			return value.clone();
		}
		match &*data.name.local {
			"textarea" => self.text(element),
			"select" => self.selected_option_value(*element),
			"input" => data.attribute("value").map_or_else(
				|| match data.attribute("type").map(str::to_ascii_lowercase).as_deref() {
					Some("checkbox" | "radio") => "on".to_owned(),
					_ => String::new(),
				},
				ToOwned::to_owned,
			),
			_ => data.attribute("value").unwrap_or_default().to_owned(),
		}
	}

	fn set_value(&mut self, element: &NodeId, value: &str) {
		match self.element_data_mut(*element) {
			Some(data) => data.value = Some(value.to_owned()),
			None => error!("Cannot set the value of non-element {:?}.", element),
		}
	}

	fn checked(&self, element: &NodeId) -> bool {
		match self.element_data(*element) {
			Some(ElementData { checked: Some(checked), .. }) => *checked,
			Some(data) => data.attribute("checked").is_some(),
			None => false,
		}
	}

	fn set_checked(&mut self, element: &NodeId, checked: bool) {
		match self.element_data_mut(*element) {
			Some(data) => data.checked = Some(checked),
			None => error!("Cannot check non-element {:?}.", element),
		}
	}

	fn template_content(&self, element: &NodeId) -> Option<NodeId> {
		self.element_data(*element)?.content
	}

	fn detach_children(&mut self, element: &NodeId) -> NodeId {
		let fragment = self.push(NodeData::Fragment);
		for child in self.children_of(*element).to_vec() {
			self.insert_node(fragment, child, None);
		}
		fragment
	}

	fn fragment_element_count(&self, fragment: &NodeId) -> usize {
		self.element_children(*fragment).len()
	}

	fn instantiate(&mut self, fragment: &NodeId) -> Vec<NodeId> {
		self.element_children(*fragment).into_iter().filter_map(|element| self.deep_clone(element)).collect()
	}

	fn insert_before(&mut self, parent: &NodeId, child: &NodeId, reference: Option<&NodeId>) {
		self.insert_node(*parent, *child, reference.copied());
	}

	/// Detaches and frees `element` with its subtree.
	fn remove(&mut self, element: &NodeId) {
		self.release(*element);
	}
}

/// A node in the shape [`html5ever::serialize`] walks.
struct Serializable<'a> {
	dom: &'a MemDom,
	node: NodeId,
}
impl Serialize for Serializable<'_> {
	fn serialize<S: Serializer>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()> {
		let node = match self.dom.nodes.get(self.node) {
			Some(node) => node,
			None => return Ok(()),
		};
		let include_node = matches!(traversal_scope, TraversalScope::IncludeNode);
		let serialize_all = |serializer: &mut S, children: &[NodeId]| {
			children
				.iter()
				.try_for_each(|&node| Serializable { dom: self.dom, node }.serialize(serializer, TraversalScope::IncludeNode))
		};

		match &node.data {
			NodeData::Element(data) => {
				if include_node {
					serializer.start_elem(data.name.clone(), data.attributes.iter().map(|(name, value)| (name, value.as_str())))?;
				}
				if let Some(content) = data.content {
					serialize_all(serializer, self.dom.children_of(content))?;
				}
				serialize_all(serializer, &node.children)?;
				if include_node {
					serializer.end_elem(data.name.clone())?;
				}
				Ok(())
			}
			NodeData::Document | NodeData::Fragment => serialize_all(serializer, &node.children),
			NodeData::Text(text) => serializer.write_text(text),
			NodeData::Comment(text) => serializer.write_comment(text),
		}
	}
}

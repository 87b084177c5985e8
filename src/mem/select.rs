//! [`selectors`] matching over [`MemDom`] elements.

use super::{ElementData, MemDom, Node, NodeData, NodeId};
use crate::dom::Dom;
use cssparser::{ParserInput, ToCss};
use html5ever::{namespace_url, ns};
use selectors::{
	attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint},
	matching::{
		self, ElementSelectorFlags, IgnoreNthChildForInvalidation, MatchingContext, MatchingMode, NeedsSelectorFlags, QuirksMode,
	},
	parser::{self, ParseRelative, SelectorParseErrorKind},
	Element, NthIndexCache, OpaqueElement, SelectorList,
};
use std::fmt;

/// Parses a selector list like `ul > li.row, [name=Title]`.
pub(super) fn parse(selector: &str) -> Result<SelectorList<Simple>, String> {
	let mut input = ParserInput::new(selector);
	let mut parser = cssparser::Parser::new(&mut input);
	SelectorList::parse(&SimpleParser, &mut parser, ParseRelative::No).map_err(|error| format!("{:?}", error.kind))
}

pub(super) fn matches(selectors: &SelectorList<Simple>, dom: &MemDom, element: NodeId) -> bool {
	let element = MemElement { dom, id: element };
	let mut nth_index_cache = NthIndexCache::default();
	let mut context = MatchingContext::new(
		MatchingMode::Normal,
		None,
		&mut nth_index_cache,
		QuirksMode::NoQuirks,
		NeedsSelectorFlags::No,
		IgnoreNthChildForInvalidation::No,
	);
	selectors.0.iter().any(|selector| matching::matches_selector(selector, 0, None, &element, &mut context))
}

/// Selectors without pseudo-classes or pseudo-elements beyond the structural ones built into [`selectors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Simple;
impl parser::SelectorImpl for Simple {
	type ExtraMatchingData<'a> = ();
	type AttrValue = CssString;
	type Identifier = CssName;
	type LocalName = CssName;
	type NamespacePrefix = CssName;
	type NamespaceUrl = CssName;
	type BorrowedNamespaceUrl = CssName;
	type BorrowedLocalName = CssName;
	type NonTSPseudoClass = PseudoClass;
	type PseudoElement = PseudoElement;
}

struct SimpleParser;
impl<'i> parser::Parser<'i> for SimpleParser {
	type Impl = Simple;
	type Error = SelectorParseErrorKind<'i>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct CssString(String);
impl From<&str> for CssString {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl AsRef<str> for CssString {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl ToCss for CssString {
	fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
		cssparser::serialize_string(&self.0, dest)
	}
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct CssName(String);
impl From<&str> for CssName {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl ToCss for CssName {
	fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
		cssparser::serialize_identifier(&self.0, dest)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum PseudoClass {}
impl parser::NonTSPseudoClass for PseudoClass {
	type Impl = Simple;

	fn is_active_or_hover(&self) -> bool {
		match *self {}
	}

	fn is_user_action_state(&self) -> bool {
		match *self {}
	}
}
impl ToCss for PseudoClass {
	fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
		match *self {}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum PseudoElement {}
impl parser::PseudoElement for PseudoElement {
	type Impl = Simple;
}
impl ToCss for PseudoElement {
	fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
		match *self {}
	}
}

#[derive(Clone, Copy)]
struct MemElement<'a> {
	dom: &'a MemDom,
	id: NodeId,
}
impl fmt::Debug for MemElement<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("MemElement").field(&self.id).finish()
	}
}
impl<'a> MemElement<'a> {
	fn at(self, id: NodeId) -> Self {
		Self { dom: self.dom, id }
	}

	fn data(&self) -> Option<&'a ElementData> {
		self.dom.element_data(self.id)
	}

	/// The element siblings of this element, itself included, and its position among them.
	fn siblings(&self) -> Option<(Vec<NodeId>, usize)> {
		let siblings = self.dom.element_children(self.dom.parent_node(self.id)?);
		let index = siblings.iter().position(|&sibling| sibling == self.id)?;
		Some((siblings, index))
	}
}

impl Element for MemElement<'_> {
	type Impl = Simple;

	fn opaque(&self) -> OpaqueElement {
		match self.dom.nodes.get(self.id) {
			Some(node) => OpaqueElement::new(node),
			None => OpaqueElement::new(self.dom),
		}
	}

	fn parent_element(&self) -> Option<Self> {
		self.dom.parent(&self.id).map(|parent| self.at(parent))
	}

	fn parent_node_is_shadow_root(&self) -> bool {
		false
	}

	fn containing_shadow_host(&self) -> Option<Self> {
		None
	}

	fn is_pseudo_element(&self) -> bool {
		false
	}

	fn prev_sibling_element(&self) -> Option<Self> {
		let (siblings, index) = self.siblings()?;
		let previous = siblings.get(index.checked_sub(1)?)?;
		Some(self.at(*previous))
	}

	fn next_sibling_element(&self) -> Option<Self> {
		let (siblings, index) = self.siblings()?;
		siblings.get(index + 1).map(|&next| self.at(next))
	}

	fn first_element_child(&self) -> Option<Self> {
		self.dom.element_children(self.id).first().map(|&child| self.at(child))
	}

	fn is_html_element_in_html_document(&self) -> bool {
		self.data().map_or(false, |data| data.name.ns == ns!(html))
	}

	fn has_local_name(&self, local_name: &CssName) -> bool {
		self.data().map_or(false, |data| *data.name.local == *local_name.0)
	}

	fn has_namespace(&self, ns: &CssName) -> bool {
		self.data().map_or(false, |data| *data.name.ns == *ns.0)
	}

	fn is_same_type(&self, other: &Self) -> bool {
		match (self.data(), other.data()) {
			(Some(this), Some(other)) => this.name == other.name,
			_ => false,
		}
	}

	fn attr_matches(&self, ns: &NamespaceConstraint<&CssName>, local_name: &CssName, operation: &AttrSelectorOperation<&CssString>) -> bool {
		self.data().map_or(false, |data| {
			data.attributes.iter().any(|(name, value)| {
				let in_namespace = match ns {
					NamespaceConstraint::Any => true,
					NamespaceConstraint::Specific(url) => *name.ns == *url.0,
				};
				in_namespace && *name.local == *local_name.0 && operation.eval_str(value)
			})
		})
	}

	fn match_non_ts_pseudo_class(&self, pc: &PseudoClass, _context: &mut MatchingContext<'_, Simple>) -> bool {
		match *pc {}
	}

	fn match_pseudo_element(&self, pe: &PseudoElement, _context: &mut MatchingContext<'_, Simple>) -> bool {
		match *pe {}
	}

	fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

	fn is_link(&self) -> bool {
		false
	}

	fn is_html_slot_element(&self) -> bool {
		false
	}

	fn has_id(&self, id: &CssName, case_sensitivity: CaseSensitivity) -> bool {
		self.data()
			.and_then(|data| data.attribute("id"))
			.map_or(false, |actual| case_sensitivity.eq(actual.as_bytes(), id.0.as_bytes()))
	}

	fn has_class(&self, name: &CssName, case_sensitivity: CaseSensitivity) -> bool {
		self.data().and_then(|data| data.attribute("class")).map_or(false, |class| {
			class.split_ascii_whitespace().any(|class| case_sensitivity.eq(class.as_bytes(), name.0.as_bytes()))
		})
	}

	fn imported_part(&self, _name: &CssName) -> Option<CssName> {
		None
	}

	fn is_part(&self, _name: &CssName) -> bool {
		false
	}

	fn is_empty(&self) -> bool {
		self.dom.children_of(self.id).iter().all(|&child| match self.dom.nodes.get(child) {
			Some(Node { data: NodeData::Element(_), .. }) => false,
			Some(Node { data: NodeData::Text(text), .. }) => text.is_empty(),
			_ => true,
		})
	}

	fn is_root(&self) -> bool {
		false
	}
}

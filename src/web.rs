//! The browser backend, over [`web_sys`].
//!
//! Aside from the [`Dom`] implementation, this module has the thin selection, creation and event helpers
//! that round out binding in a page.

use crate::{bind::Binder, clock, dom::Dom, lookup, query};
use core::cell::Cell;
use js_sys::{Date, Object, WeakMap};
use serde_json::Value;
use tracing::{error, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue, UnwrapThrowExt};
use web_sys::{
	Document, DocumentFragment, Element, Event, EventTarget, HtmlButtonElement, HtmlCollection, HtmlElement, HtmlInputElement, HtmlSelectElement,
	HtmlTemplateElement, HtmlTextAreaElement, Node,
};

/// [`Dom`] over a live [***Document***](https://developer.mozilla.org/en-US/docs/Web/API/Document).
///
/// Element identity is a counter kept in a [***WeakMap***](https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/WeakMap),
/// so it doesn't keep elements alive.
#[derive(Debug)]
pub struct WebDom {
	document: Document,
	keys: WeakMap,
	next_key: Cell<u32>,
}

/// Where [`WebDom::create_in`] puts new elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
	/// After the parent's last child.
	Append,
	/// In place of the parent.
	Replace,
}

impl WebDom {
	/// A [`WebDom`] over the current `window.document`, if there is one.
	#[must_use]
	pub fn new() -> Option<Self> {
		Some(Self::for_document(web_sys::window()?.document()?))
	}

	#[must_use]
	pub fn for_document(document: Document) -> Self {
		Self {
			document,
			keys: WeakMap::new(),
			next_key: Cell::new(0),
		}
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}

	/// The first element in the document matching `selector`.
	#[must_use]
	pub fn select(&self, selector: &str) -> Option<Element> {
		self.document.query_selector(selector).unwrap_or_else(|error| {
			error!("Invalid selector {:?}: {:?}", selector, error);
			None
		})
	}

	/// The first descendant of `element` matching `selector`.
	#[must_use]
	pub fn select_in(&self, element: &Element, selector: &str) -> Option<Element> {
		element.query_selector(selector).unwrap_or_else(|error| {
			error!("Invalid selector {:?}: {:?}", selector, error);
			None
		})
	}

	/// All elements in the document matching `selector`.
	#[must_use]
	pub fn selects(&self, selector: &str) -> Vec<Element> {
		match self.document.query_selector_all(selector) {
			Ok(nodes) => (0..nodes.length()).filter_map(|i| nodes.get(i)?.dyn_into::<Element>().ok()).collect(),
			Err(error) => {
				error!("Invalid selector {:?}: {:?}", selector, error);
				Vec::new()
			}
		}
	}

	/// All descendants of `element` matching `selector`.
	#[must_use]
	pub fn selects_in(&self, element: &Element, selector: &str) -> Vec<Element> {
		match element.query_selector_all(selector) {
			Ok(nodes) => (0..nodes.length()).filter_map(|i| nodes.get(i)?.dyn_into::<Element>().ok()).collect(),
			Err(error) => {
				error!("Invalid selector {:?}: {:?}", selector, error);
				Vec::new()
			}
		}
	}

	/// Parses `markup` into detached elements.
	///
	/// Each call parses into its own fresh inert `<template>`, so nothing is shared between calls.
	#[instrument(skip(self))]
	pub fn create(&self, markup: &str) -> Vec<Element> {
		let template = match self.document.create_element("template") {
			Ok(template) => template.unchecked_into::<HtmlTemplateElement>(),
			Err(error) => {
				error!("Failed to create parsing template: {:?}", error);
				return Vec::new();
			}
		};
		template.set_inner_html(markup);

		let elements = elements_of(&template.content().children());
		for element in &elements {
			element.remove();
		}
		trace!("Created {} element(s).", elements.len());
		elements
	}

	/// Like [`create`](`WebDom::create`), then places the new elements relative to `parent`.
	pub fn create_in(&self, parent: &Element, markup: &str, placement: Placement) -> Vec<Element> {
		let elements = self.create(markup);
		match placement {
			Placement::Append => {
				for element in &elements {
					if let Err(error) = parent.append_child(element) {
						error!("Failed to append created element: {:?}", error);
					}
				}
			}
			Placement::Replace => match parent.parent_node() {
				Some(grandparent) => {
					let anchor: &Node = parent.as_ref();
					for element in &elements {
						if let Err(error) = grandparent.insert_before(element, Some(anchor)) {
							error!("Failed to insert created element: {:?}", error);
						}
					}
					parent.remove();
				}
				None => warn!("Cannot replace {:?}, as it has no parent.", parent),
			},
		}
		elements
	}

	/// Adds `listener` for `event` to each of `elements`.
	///
	/// The listeners are removed when the returned [`Listener`] is dropped.
	pub fn on(&self, elements: &[Element], event: &str, listener: impl 'static + FnMut(Event)) -> Listener {
		let closure = Closure::wrap(Box::new(listener) as Box<dyn FnMut(Event)>);
		let mut targets = Vec::with_capacity(elements.len());
		for element in elements {
			match element.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
				Ok(()) => targets.push(element.clone().into()),
				Err(error) => error!("Failed to add event listener {:?}: {:?}", event, error),
			}
		}
		Listener {
			event: event.to_owned(),
			targets,
			closure: Some(closure),
		}
	}

	/// Adds `listener` for `event` to each descendant of `element` that matches `selector`.
	pub fn on_in(&self, element: &Element, selector: &str, event: &str, listener: impl 'static + FnMut(Event)) -> Listener {
		self.on(&self.selects_in(element, selector), event, listener)
	}

	/// [`query::param`] over `location.search`.
	#[must_use]
	pub fn location_query(&self, name: &str) -> Option<String> {
		let search = self.document.location()?.search().ok()?;
		query::param(&search, name).map(str::to_owned)
	}
}

impl Dom for WebDom {
	type Element = Element;
	type Fragment = DocumentFragment;
	type Key = u32;

	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	fn key(&self, element: &Element) -> u32 {
		let object: &Object = element.as_ref();
		if let Some(key) = self.keys.get(object).as_f64() {
			return key as u32;
		}
		let key = self.next_key.get();
		self.next_key.set(key.checked_add(1).expect_throw("eno-dom: Ran out of element keys."));
		self.keys.set(object, &JsValue::from(key));
		key
	}

	fn tag_name(&self, element: &Element) -> String {
		element.tag_name()
	}

	fn attribute(&self, element: &Element, name: &str) -> Option<String> {
		element.get_attribute(name)
	}

	fn set_attribute(&mut self, element: &Element, name: &str, value: &str) {
		if let Err(error) = element.set_attribute(name, value) {
			error!("Could not set attribute {:?}={:?}: {:?}", name, value, error);
		}
	}

	fn remove_attribute(&mut self, element: &Element, name: &str) {
		if let Err(error) = element.remove_attribute(name) {
			warn!("Could not remove attribute {:?}: {:?}", name, error);
		}
	}

	fn has_attribute(&self, element: &Element, name: &str) -> bool {
		element.has_attribute(name)
	}

	fn parent(&self, element: &Element) -> Option<Element> {
		element.parent_element()
	}

	fn children(&self, element: &Element) -> Vec<Element> {
		elements_of(&element.children())
	}

	fn text(&self, element: &Element) -> String {
		match element.dyn_ref::<HtmlElement>() {
			Some(html_element) => html_element.inner_text(),
			None => element.text_content().unwrap_or_default(),
		}
	}

	fn set_text(&mut self, element: &Element, text: &str) {
		match element.dyn_ref::<HtmlElement>() {
			Some(html_element) => html_element.set_inner_text(text),
			None => element.set_text_content(Some(text)),
		}
	}

	fn value(&self, element: &Element) -> String {
		if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
			input.value()
		} else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
			select.value()
		} else if let Some(text_area) = element.dyn_ref::<HtmlTextAreaElement>() {
			text_area.value()
		} else if let Some(button) = element.dyn_ref::<HtmlButtonElement>() {
			button.value()
		} else {
			element.get_attribute("value").unwrap_or_default()
		}
	}

	fn set_value(&mut self, element: &Element, value: &str) {
		if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
			input.set_value(value);
		} else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
			select.set_value(value);
		} else if let Some(text_area) = element.dyn_ref::<HtmlTextAreaElement>() {
			text_area.set_value(value);
		} else if let Some(button) = element.dyn_ref::<HtmlButtonElement>() {
			button.set_value(value);
		} else {
			self.set_attribute(element, "value", value);
		}
	}

	fn checked(&self, element: &Element) -> bool {
		element.dyn_ref::<HtmlInputElement>().map_or(false, HtmlInputElement::checked)
	}

	fn set_checked(&mut self, element: &Element, checked: bool) {
		match element.dyn_ref::<HtmlInputElement>() {
			Some(input) => input.set_checked(checked),
			None => warn!("Cannot check non-input {:?}.", element),
		}
	}

	fn hidden(&self, element: &Element) -> bool {
		match element.dyn_ref::<HtmlElement>() {
			Some(html_element) => html_element.hidden(),
			None => element.has_attribute("hidden"),
		}
	}

	fn set_hidden(&mut self, element: &Element, hidden: bool) {
		match element.dyn_ref::<HtmlElement>() {
			Some(html_element) => html_element.set_hidden(hidden),
			None if hidden => self.set_attribute(element, "hidden", ""),
			None => self.remove_attribute(element, "hidden"),
		}
	}

	fn template_content(&self, element: &Element) -> Option<DocumentFragment> {
		element.dyn_ref::<HtmlTemplateElement>().map(HtmlTemplateElement::content)
	}

	fn detach_children(&mut self, element: &Element) -> DocumentFragment {
		let fragment = self.document.create_document_fragment();
		while let Some(child) = element.first_child() {
			if let Err(error) = fragment.append_child(&child) {
				error!("Failed to move {:?} into the template fragment: {:?}", child, error);
				break;
			}
		}
		fragment
	}

	fn fragment_element_count(&self, fragment: &DocumentFragment) -> usize {
		fragment.children().length() as usize
	}

	fn instantiate(&mut self, fragment: &DocumentFragment) -> Vec<Element> {
		match fragment.clone_node_with_deep(true) {
			Ok(clone) => elements_of(&clone.unchecked_into::<DocumentFragment>().children()),
			Err(error) => {
				error!("Failed to clone template fragment: {:?}", error);
				Vec::new()
			}
		}
	}

	fn insert_before(&mut self, parent: &Element, child: &Element, reference: Option<&Element>) {
		let reference: Option<&Node> = reference.map(AsRef::<Node>::as_ref);
		if let Err(error) = parent.insert_before(child, reference) {
			error!("Failed to insert {:?}: {:?}", child, error);
		}
	}

	fn remove(&mut self, element: &Element) {
		element.remove();
	}
}

impl Binder<WebDom> {
	/// The entity bound around `event`'s target.
	#[must_use]
	pub fn entity_of_event(&self, event: &Event) -> Option<&Value> {
		self.entity(&event_target(event)?)
	}

	/// The bound element around `event`'s target.
	#[must_use]
	pub fn element_of_event(&self, event: &Event) -> Option<Element> {
		self.element(&event_target(event)?)
	}

	/// Whether `event`'s target or one of its ancestors carries `attribute`.
	#[must_use]
	pub fn action_of_event(&self, event: &Event, attribute: &str) -> bool {
		event_target(event).map_or(false, |target| lookup::action(self.dom(), &target, attribute))
	}
}

/// Registered event listeners, removed on drop.
#[must_use = "Dropping a `Listener` removes its event listeners again."]
#[derive(Debug)]
pub struct Listener {
	event: String,
	targets: Vec<EventTarget>,
	closure: Option<Closure<dyn FnMut(Event)>>,
}
impl Listener {
	/// Keeps the listeners registered for the rest of the page's life.
	pub fn forget(mut self) {
		if let Some(closure) = self.closure.take() {
			closure.forget();
		}
	}
}
impl Drop for Listener {
	fn drop(&mut self) {
		if let Some(closure) = self.closure.take() {
			for target in &self.targets {
				if let Err(error) = target.remove_event_listener_with_callback(&self.event, closure.as_ref().unchecked_ref()) {
					error!("Failed to remove event listener {:?}: {:?}", self.event, error);
				}
			}
		}
	}
}

/// The element an event was dispatched to.
#[must_use]
pub fn event_target(event: &Event) -> Option<Element> {
	event.target()?.dyn_into::<Element>().ok()
}

/// Today as `2024-06-24`, local time.
#[must_use]
pub fn date() -> String {
	let now = Date::new_0();
	clock::format_date(now.get_full_year(), now.get_month() + 1, now.get_date())
}

/// The current local time as `10:28:12`.
#[must_use]
pub fn time() -> String {
	let now = Date::new_0();
	clock::format_time(now.get_hours(), now.get_minutes(), now.get_seconds())
}

/// The current local date and time as `2024-6-24 10:28:12`.
#[must_use]
pub fn datetime() -> String {
	let now = Date::new_0();
	clock::format_datetime(now.get_full_year(), now.get_month() + 1, now.get_date(), now.get_hours(), now.get_minutes(), now.get_seconds())
}

fn elements_of(collection: &HtmlCollection) -> Vec<Element> {
	(0..collection.length()).filter_map(|i| collection.item(i)).collect()
}

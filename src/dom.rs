//! The element operations binding needs from a DOM implementation.
//!
//! See [`crate::web::WebDom`] for the browser and [`crate::mem::MemDom`] for a retained in-memory tree.

use core::{fmt::Debug, hash::Hash};

/// Element-level access to a document.
///
/// Handles are cheap to clone and compare by identity.
/// Backend failures are logged by the implementation and otherwise ignored, so none of these methods return [`Result`].
pub trait Dom {
	type Element: Clone + PartialEq + Debug;

	/// An inert node container, like a [***DocumentFragment***](https://developer.mozilla.org/en-US/docs/Web/API/DocumentFragment).
	type Fragment: Clone + Debug;

	/// Stable identity of an element, used to key side tables.
	type Key: Copy + Eq + Hash + Debug;

	fn key(&self, element: &Self::Element) -> Self::Key;

	/// Upper-case for HTML elements.
	fn tag_name(&self, element: &Self::Element) -> String;

	fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
	fn set_attribute(&mut self, element: &Self::Element, name: &str, value: &str);
	fn remove_attribute(&mut self, element: &Self::Element, name: &str);

	fn has_attribute(&self, element: &Self::Element, name: &str) -> bool {
		self.attribute(element, name).is_some()
	}

	/// The parent **element**. Fragments don't count.
	fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

	/// Child elements only, in order.
	fn children(&self, element: &Self::Element) -> Vec<Self::Element>;

	fn text(&self, element: &Self::Element) -> String;

	/// Replaces all content of `element` with a single text node.
	fn set_text(&mut self, element: &Self::Element, text: &str);

	/// The live value of a form control.
	fn value(&self, element: &Self::Element) -> String;
	fn set_value(&mut self, element: &Self::Element, value: &str);

	fn checked(&self, element: &Self::Element) -> bool;
	fn set_checked(&mut self, element: &Self::Element, checked: bool);

	fn hidden(&self, element: &Self::Element) -> bool {
		self.has_attribute(element, "hidden")
	}

	fn set_hidden(&mut self, element: &Self::Element, hidden: bool) {
		if hidden {
			self.set_attribute(element, "hidden", "");
		} else {
			self.remove_attribute(element, "hidden");
		}
	}

	/// The inert content of a `<template>`-like element, [`None`] for any other element.
	fn template_content(&self, element: &Self::Element) -> Option<Self::Fragment>;

	/// Moves all child nodes of `element` into a new inert fragment.
	fn detach_children(&mut self, element: &Self::Element) -> Self::Fragment;

	fn fragment_element_count(&self, fragment: &Self::Fragment) -> usize;

	/// Deep-clones the top-level elements of `fragment`.
	///
	/// The clones are detached and `fragment` itself is left untouched.
	fn instantiate(&mut self, fragment: &Self::Fragment) -> Vec<Self::Element>;

	/// Inserts `child` into `parent` before `reference`, or at the end.
	fn insert_before(&mut self, parent: &Self::Element, child: &Self::Element, reference: Option<&Self::Element>);

	/// Detaches `element` from its parent.
	fn remove(&mut self, element: &Self::Element);
}

/// How an element takes part in binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
	CheckBox,
	Radio,
	/// `<input type=number>` and `<input type=range>`.
	Number,
	/// Any other form control with a value.
	Control,
	/// Elements showing their `src`.
	Image,
	Other,
}
impl ElementKind {
	#[must_use]
	pub fn of<D: Dom + ?Sized>(dom: &D, element: &D::Element) -> Self {
		match dom.tag_name(element).to_ascii_uppercase().as_str() {
			"INPUT" => match dom.attribute(element, "type").map(|r#type| r#type.to_ascii_lowercase()).as_deref() {
				Some("checkbox") => Self::CheckBox,
				Some("radio") => Self::Radio,
				Some("number" | "range") => Self::Number,
				_ => Self::Control,
			},
			"SELECT" | "TEXTAREA" | "BUTTON" => Self::Control,
			"IMG" | "IFRAME" | "VIDEO" | "AUDIO" | "SOURCE" | "EMBED" | "TRACK" => Self::Image,
			_ => Self::Other,
		}
	}

	#[must_use]
	pub fn is_control(self) -> bool {
		matches!(self, Self::CheckBox | Self::Radio | Self::Number | Self::Control)
	}
}

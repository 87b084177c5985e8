//! Reverse lookup from an element (usually an event target) to what is bound around it.

use crate::{bind::Binder, dom::Dom};
use serde_json::Value;

impl<D: Dom> Binder<D> {
	/// The closest element at or above `element` that is tagged with an entity.
	#[must_use]
	pub fn element(&self, element: &D::Element) -> Option<D::Element> {
		let mut current = Some(element.clone());
		while let Some(candidate) = current {
			if self.tags.contains_key(&self.dom.key(&candidate)) {
				return Some(candidate);
			}
			current = self.dom.parent(&candidate);
		}
		None
	}

	/// The entity of the closest tagged element at or above `element`.
	#[must_use]
	pub fn entity(&self, element: &D::Element) -> Option<&Value> {
		let bound = self.element(element)?;
		self.tags.get(&self.dom.key(&bound))
	}

	/// Removes `elements` from the document, forgetting their bindings.
	pub fn remove(&mut self, elements: &[D::Element]) {
		for element in elements {
			self.forget(element);
			self.dom.remove(element);
		}
	}
}

/// Whether `element` or one of its ancestors carries `attribute`.
///
/// Lets one delegated listener tell which kind of control was activated, as in `<button delete>`.
pub fn action<D: Dom + ?Sized>(dom: &D, element: &D::Element, attribute: &str) -> bool {
	let mut current = Some(element.clone());
	while let Some(candidate) = current {
		if dom.has_attribute(&candidate, attribute) {
			return true;
		}
		current = dom.parent(&candidate);
	}
	false
}

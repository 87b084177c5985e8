//! Showing, hiding and removing elements.

use crate::dom::Dom;
use tracing::trace;

pub fn show<D: Dom + ?Sized>(dom: &mut D, elements: &[D::Element]) {
	for element in elements {
		dom.set_hidden(element, false);
	}
}

pub fn hide<D: Dom + ?Sized>(dom: &mut D, elements: &[D::Element]) {
	for element in elements {
		dom.set_hidden(element, true);
	}
}

/// Flips whether `element` is hidden.
pub fn toggle<D: Dom + ?Sized>(dom: &mut D, element: &D::Element) {
	let hidden = dom.hidden(element);
	dom.set_hidden(element, !hidden);
}

/// Shows `element` and hides all its siblings, appending it to `parent` first if it isn't a child there.
pub fn toggle_among<D: Dom + ?Sized>(dom: &mut D, parent: &D::Element, element: &D::Element) {
	if dom.parent(element).as_ref() != Some(parent) {
		trace!("Moving {:?} into {:?}.", element, parent);
		dom.insert_before(parent, element, None);
	}
	for child in dom.children(parent) {
		dom.set_hidden(&child, &child != element);
	}
}

/// Detaches `elements` from the document.
///
/// Prefer [`Binder::remove`](`crate::Binder::remove`) for bound elements.
pub fn remove<D: Dom + ?Sized>(dom: &mut D, elements: &[D::Element]) {
	for element in elements {
		dom.remove(element);
	}
}

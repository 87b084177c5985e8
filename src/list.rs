//! Template-based list reconciliation.
//!
//! A list container's children are split into three regions:
//!
//! ```text
//! [ before anchors | unit 0 | unit 1 | … | after anchors ]
//! ```
//!
//! Each unit is one clone of the container's template and displays one entity.
//! The anchors are never touched.
//!
//! The template is discovered once per container, on its first [`Binder::set_list`]:
//!
//! - If a child has template content (a `<template>`), that content is the template.
//!   The `<template>` and everything before it are the leading anchors, everything after it the trailing anchors.
//! - Otherwise **all** existing children are detached into an inert fragment that becomes the template,
//!   and there are no anchors.

use crate::{
	bind::{default_conversion, Binder, Conversion, Convert},
	dom::Dom,
};
use core::slice;
use serde_json::Value;
use tracing::{debug, instrument, trace, trace_span, warn};

/// Cached template state of one list container.
#[derive(Debug, Clone)]
pub(crate) struct Repeater<F> {
	template: F,
	/// Top-level elements per template clone.
	unit: usize,
	before: usize,
	after: usize,
}

impl<D: Dom> Binder<D> {
	/// Reconciles `container`'s children with `entities`, one template unit per entity.
	///
	/// A non-sequence entity is treated as a sequence of one. An absent or empty sequence collapses the list.
	/// Existing units are reused in place and only re-bound, so element identities are stable across calls
	/// for as long as the list doesn't shrink past them.
	pub fn set_list(&mut self, container: &D::Element, entities: Option<&Value>) -> D::Element {
		self.set_list_with(container, entities, default_conversion::<D>)
	}

	#[instrument(skip(self, entities, converter))]
	pub fn set_list_with(&mut self, container: &D::Element, entities: Option<&Value>, mut converter: impl FnMut(&mut D, &D::Element, Option<&Value>, &str) -> Conversion) -> D::Element {
		let repeater = self.repeater(container);

		let entities: &[Value] = match entities {
			None => &[],
			Some(Value::Array(items)) => items.as_slice(),
			Some(single) => slice::from_ref(single),
		};

		if entities.is_empty() {
			self.collapse(container, &repeater);
			return container.clone();
		}

		if repeater.unit == 0 {
			warn!("The list template of {:?} contains no elements. Nothing to instantiate.", container);
			return container.clone();
		}

		let mut children = self.dom.children(container);
		for (i, entity) in entities.iter().enumerate() {
			let span = trace_span!("Reconciling unit", i);
			let _enter = span.enter();

			let start = repeater.before + i * repeater.unit;
			let end = start + repeater.unit;
			if end + repeater.after <= children.len() {
				trace!("Reusing {} element(s).", repeater.unit);
				for element in &children[start..end] {
					self.bind_unit_element(element, entity, &mut converter);
				}
			} else {
				let reference = children.get(start).cloned();
				let instance = self.dom.instantiate(&repeater.template);
				trace!("Cloned {} element(s) from the template.", instance.len());
				for element in &instance {
					self.bind_unit_element(element, entity, &mut converter);
					self.dom.insert_before(container, element, reference.as_ref());
				}
				children = self.dom.children(container);
			}
		}

		let data_end = repeater.before + entities.len() * repeater.unit;
		self.prune(container, data_end, repeater.after);
		container.clone()
	}

	/// Discards the cached template state of `container`.
	///
	/// The next [`set_list`](`Binder::set_list`) discovers the template again from the children present then.
	pub fn invalidate(&mut self, container: &D::Element) {
		let key = self.dom.key(container);
		if self.repeaters.remove(&key).is_some() {
			debug!("Invalidated list template of {:?}.", container);
		}
	}

	fn repeater(&mut self, container: &D::Element) -> Repeater<D::Fragment> {
		let key = self.dom.key(container);
		if let Some(repeater) = self.repeaters.get(&key) {
			return repeater.clone();
		}

		let repeater = self.discover(container);
		debug!(
			unit = repeater.unit,
			before = repeater.before,
			after = repeater.after,
			"Discovered list template of {:?}.",
			container
		);
		self.repeaters.insert(key, repeater.clone());
		repeater
	}

	fn discover(&mut self, container: &D::Element) -> Repeater<D::Fragment> {
		let children = self.dom.children(container);
		for (index, child) in children.iter().enumerate() {
			if let Some(template) = self.dom.template_content(child) {
				return Repeater {
					unit: self.dom.fragment_element_count(&template),
					template,
					before: index + 1,
					after: children.len() - index - 1,
				};
			}
		}

		for child in &children {
			self.forget(child);
		}
		let template = self.dom.detach_children(container);
		Repeater {
			unit: self.dom.fragment_element_count(&template),
			template,
			before: 0,
			after: 0,
		}
	}

	fn bind_unit_element(&mut self, element: &D::Element, entity: &Value, converter: &mut Convert<'_, D>) {
		if self.dom.hidden(element) {
			self.dom.set_hidden(element, false);
		}
		self.write_into(element, Some(entity), converter);
		self.tag(element, Some(entity));
	}

	/// Keeps the first unit (hidden and unbound) if there is a whole one, and drops the rest.
	fn collapse(&mut self, container: &D::Element, repeater: &Repeater<D::Fragment>) {
		let children = self.dom.children(container);
		let data_len = children.len().saturating_sub(repeater.before + repeater.after);
		let kept = if repeater.unit > 0 && data_len >= repeater.unit { repeater.unit } else { 0 };

		if let Some(unit) = children.get(repeater.before..repeater.before + kept) {
			for element in unit {
				self.dom.set_hidden(element, true);
				self.tag(element, None);
			}
		}
		trace!("Collapsing to {} retained element(s).", kept);
		self.prune(container, repeater.before + kept, repeater.after);
	}

	/// Removes children from `data_end` on until only `after` children follow it.
	fn prune(&mut self, container: &D::Element, data_end: usize, after: usize) {
		let mut children = self.dom.children(container);
		let mut removed = 0_usize;
		while children.len() > data_end + after {
			let extra = children.remove(data_end);
			self.forget(&extra);
			self.dom.remove(&extra);
			removed += 1;
		}
		if removed > 0 {
			trace!("Removed {} extra element(s).", removed);
		}
	}
}

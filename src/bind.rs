//! Two-way binding between an element subtree and a single entity.
//!
//! Elements take part through two attributes:
//!
//! - `name` binds the element's value to the entity field at that [path](`crate::path`),
//! - `case` hands the element to a caller-supplied converter, keyed by the attribute's value.

use crate::{
	dom::{Dom, ElementKind},
	list::Repeater,
	path,
};
use hashbrown::HashMap;
use serde_json::{Map, Number, Value};
use tracing::{instrument, trace, trace_span};

/// What a converter decided for a `case`-tagged element.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
	/// Run the default `name` handling.
	Default,
	/// Skip the default handling.
	///
	/// When reading, the element's descendants are skipped too.
	Veto,
	/// Use this as the field's value (reading) or as the rendered value (writing).
	Value(Value),
}

/// The conversion hook: `(dom, element, entity, case) -> Conversion`.
///
/// While reading, `entity` is the entity collected so far.
pub type Convert<'a, D> = dyn 'a + FnMut(&mut D, &<D as Dom>::Element, Option<&Value>, &str) -> Conversion;

/// Converter used by the operations without a `_with` suffix.
pub fn default_conversion<D: Dom>(_: &mut D, _: &D::Element, _: Option<&Value>, _: &str) -> Conversion {
	Conversion::Default
}

/// What [`Binder::write`] found in an element before first rendering into it.
#[derive(Debug, Clone)]
pub(crate) struct Original {
	/// Text content, or `src` for image-like elements.
	content: String,
	titled: bool,
}

/// Owns a [`Dom`] and the binding state attached to its elements.
///
/// Entities bound to elements and the template state of list containers are kept in side tables keyed by element identity,
/// so elements never own an entity.
/// Elements removed through the [`Binder`] are forgotten. Elements removed externally leave their (small) entries behind
/// until [`Binder::forget`] is called for them.
#[derive(Debug)]
pub struct Binder<D: Dom> {
	pub(crate) dom: D,
	pub(crate) tags: HashMap<D::Key, Value>,
	pub(crate) originals: HashMap<D::Key, Original>,
	pub(crate) repeaters: HashMap<D::Key, Repeater<D::Fragment>>,
}
impl<D: Dom> Binder<D> {
	#[must_use]
	pub fn new(dom: D) -> Self {
		Self {
			dom,
			tags: HashMap::new(),
			originals: HashMap::new(),
			repeaters: HashMap::new(),
		}
	}

	#[must_use]
	pub fn dom(&self) -> &D {
		&self.dom
	}

	pub fn dom_mut(&mut self) -> &mut D {
		&mut self.dom
	}

	#[must_use]
	pub fn into_dom(self) -> D {
		self.dom
	}

	/// Collects the `name`d values below (and including) `root` into a new mapping.
	#[must_use]
	pub fn read(&mut self, root: &D::Element) -> Value {
		self.read_with(root, default_conversion::<D>)
	}

	#[instrument(skip(self, converter))]
	pub fn read_with(&mut self, root: &D::Element, mut converter: impl FnMut(&mut D, &D::Element, Option<&Value>, &str) -> Conversion) -> Value {
		let mut entity = Value::Object(Map::new());
		self.read_into(root, &mut entity, &mut converter);
		entity
	}

	/// [`read`](`Binder::read`)s each of `roots`, keeping only the non-empty results.
	#[must_use]
	pub fn read_all(&mut self, roots: &[D::Element]) -> Vec<Value> {
		self.read_all_with(roots, default_conversion::<D>)
	}

	pub fn read_all_with(&mut self, roots: &[D::Element], mut converter: impl FnMut(&mut D, &D::Element, Option<&Value>, &str) -> Conversion) -> Vec<Value> {
		roots
			.iter()
			.map(|root| {
				let mut entity = Value::Object(Map::new());
				self.read_into(root, &mut entity, &mut converter);
				entity
			})
			.filter(|entity| entity.as_object().map_or(false, |map| !map.is_empty()))
			.collect()
	}

	fn read_into(&mut self, element: &D::Element, entity: &mut Value, converter: &mut Convert<'_, D>) {
		if self.is_disabled(element) {
			return trace!("Skipping disabled {:?}.", element);
		}

		let mut handled = false;
		if let Some(case) = non_empty(self.dom.attribute(element, "case")) {
			match converter(&mut self.dom, element, Some(&*entity), &case) {
				Conversion::Default => (),
				Conversion::Veto => return trace!("Converter for {:?} vetoed {:?}.", case, element),
				Conversion::Value(value) => {
					path::set(entity, &case, value);
					handled = true;
				}
			}
		}

		if !handled {
			if let Some(name) = non_empty(self.dom.attribute(element, "name")) {
				if let Some(value) = self.element_value(element) {
					path::set(entity, &name, value);
				}
			}
		}

		for child in self.dom.children(element) {
			self.read_into(&child, entity, converter);
		}
	}

	/// `disabled` only applies to form controls and to fieldsets, which disable their whole subtree.
	fn is_disabled(&self, element: &D::Element) -> bool {
		self.dom.has_attribute(element, "disabled")
			&& (ElementKind::of(&self.dom, element).is_control() || self.dom.tag_name(element).eq_ignore_ascii_case("FIELDSET"))
	}

	fn element_value(&self, element: &D::Element) -> Option<Value> {
		Some(match ElementKind::of(&self.dom, element) {
			ElementKind::CheckBox | ElementKind::Radio => {
				if !self.dom.checked(element) {
					return None;
				}
				Value::String(self.dom.value(element))
			}
			ElementKind::Number => parse_number(self.dom.value(element)),
			ElementKind::Control => Value::String(self.dom.value(element)),
			ElementKind::Image => Value::String(self.dom.attribute(element, "src").unwrap_or_default()),
			ElementKind::Other => Value::String(self.dom.text(element)),
		})
	}

	/// Renders `entity` into the `name`d elements below (and including) `root`, then tags `root` with it.
	///
	/// An absent `entity` clears the tag and resets every bound element to what it showed originally.
	pub fn write(&mut self, root: &D::Element, entity: Option<&Value>) -> D::Element {
		self.write_with(root, entity, default_conversion::<D>)
	}

	#[instrument(skip(self, entity, converter))]
	pub fn write_with(&mut self, root: &D::Element, entity: Option<&Value>, mut converter: impl FnMut(&mut D, &D::Element, Option<&Value>, &str) -> Conversion) -> D::Element {
		if cfg!(feature = "dangerous-logging") {
			trace!("Writing {:?}.", entity);
		}
		self.write_into(root, entity, &mut converter);
		self.tag(root, entity);
		root.clone()
	}

	pub(crate) fn write_into(&mut self, element: &D::Element, entity: Option<&Value>, converter: &mut Convert<'_, D>) {
		let kind = ElementKind::of(&self.dom, element);

		let mut handled = false;
		if let Some(case) = non_empty(self.dom.attribute(element, "case")) {
			match converter(&mut self.dom, element, entity, &case) {
				Conversion::Default => (),
				Conversion::Veto => handled = true,
				Conversion::Value(value) => {
					self.render(element, kind, Some(&value));
					handled = true;
				}
			}
		}

		if !handled {
			if let Some(name) = non_empty(self.dom.attribute(element, "name")) {
				let span = trace_span!("Rendering field", name = name.as_str());
				let _enter = span.enter();
				let field = entity.and_then(|entity| path::get(entity, &name));
				self.render(element, kind, field.as_ref());
			}
		}

		for child in self.dom.children(element) {
			self.write_into(&child, entity, converter);
		}
	}

	fn render(&mut self, element: &D::Element, kind: ElementKind, field: Option<&Value>) {
		match kind {
			ElementKind::CheckBox | ElementKind::Radio => {
				let checked = matches_control(field, &self.dom.value(element));
				self.dom.set_checked(element, checked);
			}
			ElementKind::Number | ElementKind::Control => self.dom.set_value(element, &path::to_text(field)),
			ElementKind::Image => {
				let original = self.original(element, kind);
				let text = path::to_text(field);
				let src = if text.is_empty() { original.content } else { text };
				self.dom.set_attribute(element, "src", &src);
			}
			ElementKind::Other => {
				let original = self.original(element, kind);
				let text = path::to_text(field);
				let text = if text.is_empty() { original.content } else { text };
				self.dom.set_text(element, &text);
				if !original.titled {
					if text.is_empty() {
						self.dom.remove_attribute(element, "title");
					} else {
						self.dom.set_attribute(element, "title", &text);
					}
				}
			}
		}
	}

	/// Captured on first use, so later renders can fall back to it.
	fn original(&mut self, element: &D::Element, kind: ElementKind) -> Original {
		let dom = &self.dom;
		self.originals
			.entry(dom.key(element))
			.or_insert_with(|| Original {
				content: if kind == ElementKind::Image {
					dom.attribute(element, "src").unwrap_or_default()
				} else {
					dom.text(element)
				},
				titled: dom.has_attribute(element, "title"),
			})
			.clone()
	}

	pub(crate) fn tag(&mut self, element: &D::Element, entity: Option<&Value>) {
		let key = self.dom.key(element);
		match entity {
			Some(entity) => {
				self.tags.insert(key, entity.clone());
			}
			None => {
				self.tags.remove(&key);
			}
		}
	}

	/// Drops everything the binder remembers about `element` and its descendants.
	///
	/// Call this for bound elements removed or rebuilt outside of the binder.
	pub fn forget(&mut self, element: &D::Element) {
		let key = self.dom.key(element);
		self.tags.remove(&key);
		self.originals.remove(&key);
		self.repeaters.remove(&key);
		for child in self.dom.children(element) {
			self.forget(&child);
		}
	}
}

fn non_empty(attribute: Option<String>) -> Option<String> {
	attribute.filter(|value| !value.is_empty())
}

/// Numbers when valid, the raw string otherwise.
fn parse_number(value: String) -> Value {
	if let Ok(integer) = value.parse::<i64>() {
		return Value::Number(integer.into());
	}
	match value.parse::<f64>().ok().and_then(Number::from_f64) {
		Some(number) => Value::Number(number),
		None => Value::String(value),
	}
}

fn matches_control(field: Option<&Value>, control_value: &str) -> bool {
	match field {
		None | Some(Value::Null) => false,
		Some(Value::Bool(checked)) => *checked,
		Some(Value::Array(items)) => items.iter().any(|item| matches_control(Some(item), control_value)),
		Some(other) => path::to_text(Some(other)) == control_value,
	}
}

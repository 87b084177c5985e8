#![doc(html_root_url = "https://docs.rs/eno-dom/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Easy Node Object: binds HTML element subtrees to plain JSON-like entities.
//!
//! - [`Binder::read`] and [`Binder::write`] map between an entity and the `name`/`case`-attributed elements of a subtree.
//! - [`Binder::set_list`] repeats a container's template once per entity, reusing instances where it can.
//! - [`Binder::entity`] and [`Binder::element`] find the binding around an element, for example an event's target.
//!
//! The document is accessed through the [`Dom`] trait, implemented by [`web::WebDom`] for browsers
//! and by [`mem::MemDom`] as retained in-memory tree.

pub use serde_json;

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod bind;
pub mod clock;
pub mod dom;
pub mod list;
pub mod lookup;
pub mod mem;
pub mod path;
pub mod query;
pub mod visibility;
#[cfg(feature = "web")]
pub mod web;

pub use bind::{Binder, Conversion};
pub use dom::{Dom, ElementKind};

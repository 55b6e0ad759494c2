#![doc(html_root_url = "https://docs.rs/dom-wire/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Attribute-driven two-way DOM bindings with lexically scoped state.
//!
//! [`init`] walks a DOM subtree once, creating one [`scope`] per element and wiring each
//! [`directive`] it finds to the [`ScopeTree`]. Hosts are abstracted by [`dom::Dom`];
//! [`web::WebDom`] is the browser implementation.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod app;
pub mod default_map;
pub mod directive;
pub mod dom;
mod error;
pub mod scope;
pub mod web;

pub use crate::{
	app::{init, App, AppConfig, StateMap},
	error::BindingError,
	scope::{ScopeId, ScopeTree},
};

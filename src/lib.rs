#![doc(html_root_url = "https://docs.rs/mini-vdom/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A small positional virtual DOM.
//!
//! Describe the page as a [`VNode`] tree, [`render`] it into a container once, then hand each fresh tree to
//! [`Mount::update`]. The tree is diffed against the previous one and only the differences are written to the host.
//!
//! Children are matched strictly by index. Nodes are reused when their kind and tag match
//! (and their `key`s, if both define one), otherwise replaced wholesale.
//!
//! Hosts implement [`Dom`]: [`web::WebDom`] writes into a browser document, [`memory::MemoryDom`] into an arena
//! that records every mutation.

pub use hashbrown;

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod attributes;
mod diff;
pub mod dom;
mod error;
pub mod load;
mod materialize;
pub mod memory;
mod mount;
mod vnode;
pub mod web;

pub use diff::PatchStats;
pub use dom::{Dom, HostError, HostNode};
pub use error::Error;
pub use materialize::{materialize, LiveNode};
pub use mount::{render, Mount, Options};
pub use vnode::{h, Event, EventHandler, VElement, VNode, Value, TEXT_TAG};

//! Incremental view of a host graph
//!
//! A [`GraphView`] converts the host graph through [`GraphSource`] on every
//! [`GraphView::update`], lays it out only when its structure changed and
//! hands the result to a [`Renderer`] together with the configured [`Styles`].

mod adapter;
mod config;
mod style;
mod view;

pub use adapter::*;
pub use config::*;
pub use style::*;
pub use view::*;

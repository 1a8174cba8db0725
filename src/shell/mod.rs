//! Country selection, load supersession, and the glue between loader, injector and store.

pub(crate) mod catalog;
pub(crate) mod config;
pub(crate) mod session;
pub(crate) mod state;

//! Static portfolio page composition.
//!
//! A page starts as an HTML shell. [`page::Page::bootstrap`] fills its
//! sections host from a JSON configuration, renders project cards into every
//! gallery container, and binds the project modal. Everything runs against an
//! in-memory [`dom::Document`].

pub mod cards;
pub mod config;
pub mod detail;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod gallery;
pub mod modal;
pub mod models;
pub mod page;
pub mod sections;

#[cfg(test)]
mod tests;

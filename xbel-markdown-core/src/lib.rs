#![doc = "xbel-markdown-core: core logic library for xbel-markdown."]

//! This crate turns an XBEL bookmark export into a heading-structured
//! Markdown document and keeps rotating backups of the previous output.
//!
//! # Usage
//! Build a [`config::ConvertConfig`], pick collaborators
//! ([`storage::LocalStorage`], [`parse::XbelParser`], [`contract::SystemClock`])
//! and call [`convert::run`].

pub mod config;
pub mod contract;
pub mod convert;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod render;
pub mod rotation;
pub mod storage;

pub use config::ConvertConfig;
pub use convert::{run, RunReport};
pub use error::ConversionError;
pub use model::BookmarkNode;

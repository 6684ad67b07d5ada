//! Syntax module for the testcase notation
//!
//! The notation is line oriented: one tag per physical line, tag and attribute
//! names are case-sensitive, and attribute values are never escaped. This
//! module only classifies lines and decodes attributes; assembling trees is
//! the job of [`crate::ast::builder`].

pub mod attributes;
pub mod tags;

pub use attributes::{get_attributes, is_truthy, Attributes};
pub use tags::{is_end_tag, is_start_tag, tag_name, TagEvent};

//! Markup walking: turns story HTML into styled content blocks.
//!
//! [`html`] selects paragraphs, extracts images and walks text nodes with the
//! active inline style; [`text`] normalizes whitespace and splits text nodes
//! into tokens.

pub mod html;
pub mod text;


pub use html::walk_document;

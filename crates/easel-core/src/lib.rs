//! Easel Core Types
//!
//! This crate provides the element graph the Easel editing core operates on:
//!
//! - **Identifiers**: String-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Points, bounds and segment math ([`geometry`] module)
//! - **Elements**: Roots, shapes, labels and connections ([`element`] module)
//! - **Diagram**: The arena owning all elements and their relations ([`diagram::Diagram`])
//! - **Ids**: The semantic identifier registry ([`ids::IdRegistry`])

pub mod diagram;
pub mod element;
pub mod geometry;
pub mod identifier;
pub mod ids;

mod error;

pub use error::ModelError;

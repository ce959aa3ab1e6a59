//! # Expression vocabulary
//!
//! The expression trees this crate rewrites are produced by an external SQL
//! front end and arrive as JSON. This module gives that JSON a vocabulary.
//!
//! ## Architecture Overview
//!
//! - **[vocabulary]** - The `class`/`type` discriminator strings of the serializer
//! - **[kind]** - The closed [`Kind`] projection of a node, plus comparison and
//!   conjunction operators
//! - **[builder]** - Constructors for synthetic nodes used by rewrites
//!
//! ## Discriminator Pairs
//!
//! Every expression object carries a `class` and a `type`. Together they name
//! the node's kind:
//!
//! ```text
//! {"class": "COMPARISON", "type": "COMPARE_EQUAL", "left": ..., "right": ...}
//! {"class": "CONJUNCTION", "type": "CONJUNCTION_AND", "children": [...]}
//! {"class": "CAST", "type": "OPERATOR_CAST", "child": ..., "cast_type": ...}
//! ```
//!
//! Pairs the rewriter has no rule for project to [`Kind::Opaque`]. Opaque
//! nodes pass through rewrites untouched, although their children are still
//! searched.
//!
//! ## Always-True Predicate
//!
//! Pruning replaces every predicate it cannot keep with
//! `CAST('t' AS BOOLEAN)` ([`builder::true_literal`]). An `AND` with no
//! children means the same thing.

pub mod builder;
pub mod kind;
pub mod vocabulary;

pub use kind::{CompareOp, ConjunctionOp, Kind};

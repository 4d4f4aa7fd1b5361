//! # `SieveQL` Core
//!
//! A dual-target predicate compiler: one logical filter model, two backends.
//!
//! `SieveQL` translates an immutable tree of typed search predicates
//! (`country = US AND year >= 2000`) into either a nested Elasticsearch
//! boolean query or a SQL `WHERE` clause fragment, without the caller
//! knowing either store's query language.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sieveql_core::{OccurrenceField, OccurrenceMapper, Predicate};
//! use sieveql_core::{SearchQueryVisitor, SqlQueryVisitor};
//!
//! let filter = Predicate::conjunction(vec![
//!     Predicate::equals(OccurrenceField::Country, "US"),
//!     Predicate::greater_than_or_equals(OccurrenceField::Year, "2000"),
//! ]);
//!
//! let mapper = OccurrenceMapper::new();
//!
//! // Elasticsearch bool query (structured, serializes to the ES query DSL)
//! let es_query = SearchQueryVisitor::new(&mapper).build_query(&filter)?;
//!
//! // SQL WHERE fragment with inlined, escaped literals
//! let where_clause = SqlQueryVisitor::new(&mapper).build_query(&filter)?;
//! ```
//!
//! Translation is pure and stateless: the same predicate tree and mapper
//! always produce byte-identical output, and both visitors may be shared
//! freely across threads.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]

pub mod columns;
pub mod datetime;
pub mod error;
pub mod geometry;
#[cfg(test)]
mod geometry_tests;
pub mod mapper;
pub mod predicate;
pub mod search;
pub mod sql;

pub use error::{Error, Result};
pub use mapper::event::{EventField, EventMapper};
pub use mapper::occurrence::{OccurrenceField, OccurrenceMapper};
pub use mapper::FieldMapper;
pub use predicate::{Distance, DistanceUnit, GeoDistance, Predicate, RangeValue};
pub use search::query::{BoolQuery, GeoShapeBody, RangeClause, SearchQuery};
pub use search::SearchQueryVisitor;
pub use sql::SqlQueryVisitor;
pub use columns::{Term, TermKind};

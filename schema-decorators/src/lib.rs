//! Build-time decorators for GraphQL schemas.
//!
//! The decorators walk a [`TypeGraph`] once it has been built from SDL and its resolvers have
//! been merged in, and add behavior that field authors would otherwise write by hand:
//!
//! * Object types marked with `@injectAggregate` that have the cursor connection shape gain
//!   aggregate fields, `count` by default. See [`aggregate`].
//! * Fields whose type ends in the `DateTime` scalar, through any number of non-null, list or
//!   lazy layers, gain `dateFormat`, `dateFormatLocale` and `dateFormatTimezone` arguments and
//!   return either a UTC date-time or a formatted string. See [`date_format`].
//!
//! ## Usage
//!
//! ```
//! use schema_decorators::Decorator;
//! use schema_decorators::Resolvers;
//!
//! let graph = Decorator::default()
//!     .build(
//!         r#"
//!         scalar DateTime
//!         type Query { foods: FoodConnection }
//!         type FoodConnection @injectAggregate { edges: [FoodEdge!]! }
//!         type FoodEdge { node: Food! }
//!         type Food { name: String, bestBefore: DateTime }
//!         "#,
//!         Resolvers::new(),
//!     )
//!     .unwrap();
//! assert!(graph.to_string().contains("count: Int!"));
//! ```

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]

pub mod aggregate;
pub mod config;
pub mod date_format;
mod decorator;
pub mod error;
pub mod resolver;
pub mod schema;

pub use crate::config::DecoratorConfig;
pub use crate::decorator::DecorationReport;
pub use crate::decorator::Decorator;
pub use crate::error::DecoratorError;
pub use crate::error::ResolverError;
pub use crate::resolver::FieldContext;
pub use crate::resolver::ResolvedValue;
pub use crate::resolver::Resolver;
pub use crate::resolver::Resolvers;
pub use crate::schema::FieldCoordinate;
pub use crate::schema::TypeGraph;

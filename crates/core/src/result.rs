//! Result type definition for stepgraph operations.

use crate::error::Error;

/// The standard Result type for stepgraph operations.
///
/// All fallible operations in the workspace return this type.
/// Use the `?` operator, `match`, or combinator methods to handle results.
///
/// # Examples
///
/// ```ignore
/// fn operation(graph: &mut Graph) -> Result<()> {
///     let id = NodeId::new("a").ok_or_else(|| Error::duplicate_node(""))?;
///     graph.add_node(id)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

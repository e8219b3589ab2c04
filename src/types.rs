//! Various types related to pattern mining.

/// The host vertex id type.
///
/// Host vertices are renumbered densely when the graph is built.
pub type VId = usize;

/// The vertex id type used by graph sources.
pub type ExternalId = i64;

/// The interned color type shared by vertex and edge labels.
pub type Color = u32;

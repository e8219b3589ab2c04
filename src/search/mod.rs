//! Extension and embedding search over the host graph.

pub use embedding::{find_embeddings, min_image_support, ChainArena, ChainId};
pub use extension::{Child, ExtensionResult, Extender};

mod embedding;
mod extension;

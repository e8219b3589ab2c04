use super::{read_u32, Vertex};
use crate::{
    error::{Error, Result},
    types::Color,
};

/// A candidate edge growing a pattern by one edge.
///
/// An endpoint whose `idx` equals the pattern's vertex count is a new
/// vertex; at most one endpoint is new.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Extension {
    pub source: Vertex,
    pub target: Vertex,
    pub color: Color,
}

impl Extension {
    pub fn new(source: Vertex, target: Vertex, color: Color) -> Self {
        Self {
            source,
            target,
            color,
        }
    }

    /// Whether applying the extension to a `len`-vertex pattern adds a vertex.
    pub fn adds_vertex(&self, len: usize) -> bool {
        self.source.idx == len || self.target.idx == len
    }

    /// Re-indexes the extension from a `len`-vertex pattern into a
    /// `new_len`-vertex pattern, where old vertex `i` became `position[i]`.
    pub fn translate(&self, len: usize, new_len: usize, position: &[usize]) -> Extension {
        let map = |v: Vertex| Vertex {
            idx: if v.idx == len {
                new_len
            } else {
                position[v.idx]
            },
            color: v.color,
        };
        Extension {
            source: map(self.source),
            target: map(self.target),
            color: self.color,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(20);
        for x in &[
            self.source.idx as u32,
            self.source.color,
            self.target.idx as u32,
            self.target.color,
            self.color,
        ] {
            bytes.extend_from_slice(&x.to_be_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 20 {
            return Err(Error::Invariant(format!(
                "malformed extension {:?}",
                bytes
            )));
        }
        let field = |i: usize| read_u32(bytes, 4 * i).unwrap_or(0);
        Ok(Extension {
            source: Vertex {
                idx: field(0) as usize,
                color: field(1),
            },
            target: Vertex {
                idx: field(2) as usize,
                color: field(3),
            },
            color: field(4),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate() {
        let ext = Extension::new(Vertex { idx: 1, color: 7 }, Vertex { idx: 3, color: 8 }, 9);
        assert!(ext.adds_vertex(3));
        let moved = ext.translate(3, 4, &[2, 0, 1]);
        assert_eq!(moved.source, Vertex { idx: 0, color: 7 });
        assert_eq!(moved.target, Vertex { idx: 4, color: 8 });
        assert!(!moved.adds_vertex(5));
    }

    #[test]
    fn test_bytes() {
        let ext = Extension::new(Vertex { idx: 0, color: 1 }, Vertex { idx: 2, color: 3 }, 4);
        assert_eq!(Extension::from_bytes(&ext.to_bytes()).unwrap(), ext);
        assert!(Extension::from_bytes(&[1, 2, 3]).is_err());
    }
}

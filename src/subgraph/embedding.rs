use crate::{
    error::{Error, Result},
    types::VId,
};

/// An occurrence of a pattern: pattern vertex `i` is host vertex `ids[i]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Embedding {
    ids: Vec<VId>,
}

impl Embedding {
    pub fn new(ids: Vec<VId>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &[VId] {
        &self.ids
    }

    pub fn get(&self, idx: usize) -> VId {
        self.ids[idx]
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The pattern index bound to host vertex `v`.
    pub fn position(&self, v: VId) -> Option<usize> {
        self.ids.iter().position(|&id| id == v)
    }

    /// Binds host vertex `v` to a new last pattern vertex.
    pub fn extend(&self, v: VId) -> Embedding {
        let mut ids = Vec::with_capacity(self.ids.len() + 1);
        ids.extend_from_slice(&self.ids);
        ids.push(v);
        Embedding { ids }
    }

    /// Reorders the embedding so that vertex `k` is old vertex `vord[k]`.
    pub fn permute(&self, vord: &[usize]) -> Embedding {
        Embedding {
            ids: vord.iter().map(|&i| self.ids[i]).collect(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 * self.ids.len());
        for &id in &self.ids {
            bytes.extend_from_slice(&(id as u64).to_be_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 8 != 0 {
            return Err(Error::Invariant(format!(
                "malformed embedding of {} bytes",
                bytes.len()
            )));
        }
        Ok(Embedding {
            ids: bytes
                .chunks(8)
                .map(|chunk| {
                    let mut buf = [0; 8];
                    buf.copy_from_slice(chunk);
                    u64::from_be_bytes(buf) as VId
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_permute() {
        let emb = Embedding::new(vec![10, 20]).extend(30);
        assert_eq!(emb.ids(), &[10, 20, 30]);
        assert_eq!(emb.position(20), Some(1));
        assert_eq!(emb.position(40), None);
        assert_eq!(emb.permute(&[2, 0, 1]).ids(), &[30, 10, 20]);
    }

    #[test]
    fn test_bytes() {
        let emb = Embedding::new(vec![3, 1, 4]);
        assert_eq!(Embedding::from_bytes(&emb.to_bytes()).unwrap(), emb);
        assert!(Embedding::from_bytes(&[0; 5]).is_err());
    }
}

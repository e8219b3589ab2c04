//! Write-once caches keyed by pattern label.

use crate::{
    error::{Error, Result},
    store::{Store, StoreType},
    subgraph::{Embedding, Extension},
};
use log::debug;

/// A lattice relation cached per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Children,
    Parents,
    CanonKids,
}

impl Relation {
    fn name(self) -> &'static str {
        match self {
            Relation::Children => "children",
            Relation::Parents => "parents",
            Relation::CanonKids => "canon_kids",
        }
    }
}

/// The count store says whether a node's adjacency was computed; the
/// adjacency store holds the neighbor labels in order.
struct RelationCache {
    count: Store,
    adjacency: Store,
}

impl RelationCache {
    fn open(store_type: &StoreType, relation: Relation) -> Result<Self> {
        Ok(Self {
            count: Store::open(store_type, &format!("{}_count", relation.name()))?,
            adjacency: Store::open(store_type, relation.name())?,
        })
    }
}

/// Per-label frequency, embeddings, extensions and adjacency.
///
/// Entries are only ever written once: the first writer wins and later
/// writers see its entries.
pub struct LatticeCache {
    frequency: Store,
    embeddings: Store,
    extensions: Store,
    children: RelationCache,
    parents: RelationCache,
    canon_kids: RelationCache,
}

fn encode_usize(x: usize) -> Vec<u8> {
    (x as u64).to_be_bytes().to_vec()
}

fn decode_usize(bytes: &[u8]) -> Result<usize> {
    if bytes.len() != 8 {
        return Err(Error::Invariant(format!("malformed count {:?}", bytes)));
    }
    let mut buf = [0; 8];
    buf.copy_from_slice(bytes);
    Ok(u64::from_be_bytes(buf) as usize)
}

impl LatticeCache {
    pub fn open(store_type: &StoreType) -> Result<Self> {
        debug!("opening lattice cache {:?}", store_type);
        Ok(Self {
            frequency: Store::open(store_type, "frequency")?,
            embeddings: Store::open(store_type, "embeddings")?,
            extensions: Store::open(store_type, "extensions")?,
            children: RelationCache::open(store_type, Relation::Children)?,
            parents: RelationCache::open(store_type, Relation::Parents)?,
            canon_kids: RelationCache::open(store_type, Relation::CanonKids)?,
        })
    }

    fn relation(&self, relation: Relation) -> &RelationCache {
        match relation {
            Relation::Children => &self.children,
            Relation::Parents => &self.parents,
            Relation::CanonKids => &self.canon_kids,
        }
    }

    /// The cached adjacency of `key`, or `None` if it was never computed.
    pub fn get(&self, relation: Relation, key: &[u8]) -> Result<Option<Vec<Vec<u8>>>> {
        let cache = self.relation(relation);
        let mut count = None;
        cache.count.do_find(key, |bytes| {
            count = Some(decode_usize(bytes)?);
            Ok(())
        })?;
        match count {
            None => Ok(None),
            Some(count) => {
                let labels = cache.adjacency.find(key)?;
                if labels.len() != count {
                    return Err(Error::Invariant(format!(
                        "{} cache holds {} of {} entries",
                        relation.name(),
                        labels.len(),
                        count
                    )));
                }
                Ok(Some(labels))
            }
        }
    }

    /// Returns the cached adjacency of `key`, computing and caching it with
    /// `f` on a miss.
    ///
    /// The adjacency entries are written before the count, so a present
    /// count always means complete entries.
    pub fn get_or_insert_with<F>(&self, relation: Relation, key: &[u8], f: F) -> Result<Vec<Vec<u8>>>
    where
        F: FnOnce() -> Result<Vec<Vec<u8>>>,
    {
        if let Some(labels) = self.get(relation, key)? {
            return Ok(labels);
        }
        let labels = f()?;
        let cache = self.relation(relation);
        if cache.adjacency.put_once(key, &labels)? {
            cache.count.put_once(key, &[encode_usize(labels.len())])?;
            Ok(labels)
        } else {
            // Another writer got there first.
            match self.get(relation, key)? {
                Some(cached) => Ok(cached),
                None => Ok(labels),
            }
        }
    }

    pub fn frequency(&self, key: &[u8]) -> Result<Option<usize>> {
        let values = self.frequency.find(key)?;
        values.first().map(|bytes| decode_usize(bytes)).transpose()
    }

    /// Records the frequency and, when given, the embeddings of a node.
    ///
    /// Embeddings go in first so that a present frequency implies them.
    pub fn put_node(&self, key: &[u8], frequency: usize, embeddings: Option<&[Embedding]>) -> Result<()> {
        if let Some(embeddings) = embeddings {
            let values: Vec<Vec<u8>> = embeddings.iter().map(|emb| emb.to_bytes()).collect();
            self.embeddings.put_once(key, &values)?;
        }
        self.frequency.put_once(key, &[encode_usize(frequency)])?;
        Ok(())
    }

    pub fn embeddings(&self, key: &[u8]) -> Result<Vec<Embedding>> {
        let mut embeddings = vec![];
        self.embeddings.do_find(key, |bytes| {
            embeddings.push(Embedding::from_bytes(bytes)?);
            Ok(())
        })?;
        Ok(embeddings)
    }

    pub fn put_extensions(&self, key: &[u8], extensions: &[Extension]) -> Result<()> {
        let values: Vec<Vec<u8>> = extensions.iter().map(|ext| ext.to_bytes()).collect();
        self.extensions.put_once(key, &values)?;
        Ok(())
    }

    pub fn extensions(&self, key: &[u8]) -> Result<Vec<Extension>> {
        let mut extensions = vec![];
        self.extensions.do_find(key, |bytes| {
            extensions.push(Extension::from_bytes(bytes)?);
            Ok(())
        })?;
        Ok(extensions)
    }

    fn stores(&self) -> Vec<&Store> {
        let mut stores = vec![&self.frequency, &self.embeddings, &self.extensions];
        for cache in vec![&self.children, &self.parents, &self.canon_kids] {
            stores.push(&cache.count);
            stores.push(&cache.adjacency);
        }
        stores
    }

    pub fn close(&self) -> Result<()> {
        for store in self.stores() {
            store.close()?;
        }
        Ok(())
    }
}

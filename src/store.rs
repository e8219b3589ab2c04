//! Ordered byte multimaps backing the lattice caches.

use crate::error::{Error, Result};
use log::debug;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Where a [`Store`] keeps its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreType {
    Mem,
    /// One SQLite file per store under this directory.
    Sqlite(PathBuf),
}

/// An in-memory multimap.
pub struct MemStore {
    entries: Mutex<Option<BTreeMap<Vec<u8>, Vec<Vec<u8>>>>>,
}

/// A multimap persisted in a SQLite table `kv(key, value)`.
pub struct SqliteStore {
    path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        debug!("opening store {}", path.display());
        let conn = Connection::open(&path)?;
        conn.execute_batch(
            "PRAGMA synchronous = OFF;
             CREATE TABLE IF NOT EXISTS kv (key BLOB NOT NULL, value BLOB NOT NULL);
             CREATE INDEX IF NOT EXISTS kv_key ON kv (key);",
        )?;
        Ok(Self {
            path,
            conn: Mutex::new(Some(conn)),
        })
    }
}

/// An ordered multimap from keys to the values added under them.
///
/// Values under one key are returned in insertion order. Every store has
/// its own lock, so concurrent callers never observe a partially written
/// [`put_once`](Store::put_once).
pub enum Store {
    Mem(MemStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn new_mem() -> Self {
        Store::Mem(MemStore {
            entries: Mutex::new(Some(BTreeMap::new())),
        })
    }

    pub fn new_sqlite<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Store::Sqlite(SqliteStore::open(path)?))
    }

    /// Opens the store called `name`.
    pub fn open(store_type: &StoreType, name: &str) -> Result<Self> {
        match store_type {
            StoreType::Mem => Ok(Self::new_mem()),
            StoreType::Sqlite(dir) => Self::new_sqlite(dir.join(format!("{}.db", name))),
        }
    }

    pub fn add(&self, key: &[u8], value: &[u8]) -> Result<()> {
        match self {
            Store::Mem(store) => {
                let mut entries = store.entries.lock();
                let entries = entries.as_mut().ok_or(Error::StoreClosed)?;
                entries.entry(key.to_vec()).or_insert_with(Vec::new).push(value.to_vec());
                Ok(())
            }
            Store::Sqlite(store) => {
                let conn = store.conn.lock();
                let conn = conn.as_ref().ok_or(Error::StoreClosed)?;
                conn.execute("INSERT INTO kv (key, value) VALUES (?1, ?2)", params![key, value])?;
                Ok(())
            }
        }
    }

    pub fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.count(key)? > 0)
    }

    /// Calls `f` on every value under `key` until it fails.
    pub fn do_find<F>(&self, key: &[u8], mut f: F) -> Result<()>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        match self {
            Store::Mem(store) => {
                let entries = store.entries.lock();
                let entries = entries.as_ref().ok_or(Error::StoreClosed)?;
                for value in entries.get(key).into_iter().flatten() {
                    f(value)?;
                }
                Ok(())
            }
            Store::Sqlite(store) => {
                let conn = store.conn.lock();
                let conn = conn.as_ref().ok_or(Error::StoreClosed)?;
                let mut stmt =
                    conn.prepare_cached("SELECT value FROM kv WHERE key = ?1 ORDER BY rowid")?;
                let mut rows = stmt.query(params![key])?;
                while let Some(row) = rows.next()? {
                    let value: Vec<u8> = row.get(0)?;
                    f(&value)?;
                }
                Ok(())
            }
        }
    }

    pub fn find(&self, key: &[u8]) -> Result<Vec<Vec<u8>>> {
        let mut values = vec![];
        self.do_find(key, |value| {
            values.push(value.to_vec());
            Ok(())
        })?;
        Ok(values)
    }

    /// The number of values under `key`.
    pub fn count(&self, key: &[u8]) -> Result<usize> {
        match self {
            Store::Mem(store) => {
                let entries = store.entries.lock();
                let entries = entries.as_ref().ok_or(Error::StoreClosed)?;
                Ok(entries.get(key).map_or(0, |values| values.len()))
            }
            Store::Sqlite(store) => {
                let conn = store.conn.lock();
                let conn = conn.as_ref().ok_or(Error::StoreClosed)?;
                let count: i64 = conn
                    .prepare_cached("SELECT COUNT(*) FROM kv WHERE key = ?1")?
                    .query_row(params![key], |row| row.get(0))?;
                Ok(count as usize)
            }
        }
    }

    /// Adds `values` under `key` unless the key is present.
    ///
    /// Returns whether the values were written.
    pub fn put_once(&self, key: &[u8], values: &[Vec<u8>]) -> Result<bool> {
        match self {
            Store::Mem(store) => {
                let mut entries = store.entries.lock();
                let entries = entries.as_mut().ok_or(Error::StoreClosed)?;
                if entries.contains_key(key) {
                    return Ok(false);
                }
                entries.insert(key.to_vec(), values.to_vec());
                Ok(true)
            }
            Store::Sqlite(store) => {
                let mut conn = store.conn.lock();
                let conn = conn.as_mut().ok_or(Error::StoreClosed)?;
                let tx = conn.transaction()?;
                let present: i64 = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM kv WHERE key = ?1)",
                    params![key],
                    |row| row.get(0),
                )?;
                if present != 0 {
                    return Ok(false);
                }
                for value in values {
                    tx.execute(
                        "INSERT INTO kv (key, value) VALUES (?1, ?2)",
                        params![key, value],
                    )?;
                }
                tx.commit()?;
                Ok(true)
            }
        }
    }

    /// The number of distinct keys.
    pub fn len(&self) -> Result<usize> {
        match self {
            Store::Mem(store) => {
                let entries = store.entries.lock();
                Ok(entries.as_ref().ok_or(Error::StoreClosed)?.len())
            }
            Store::Sqlite(store) => {
                let conn = store.conn.lock();
                let conn = conn.as_ref().ok_or(Error::StoreClosed)?;
                let len: i64 =
                    conn.query_row("SELECT COUNT(DISTINCT key) FROM kv", [], |row| row.get(0))?;
                Ok(len as usize)
            }
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Removes every entry.
    pub fn clear(&self) -> Result<()> {
        match self {
            Store::Mem(store) => {
                let mut entries = store.entries.lock();
                entries.as_mut().ok_or(Error::StoreClosed)?.clear();
                Ok(())
            }
            Store::Sqlite(store) => {
                let conn = store.conn.lock();
                let conn = conn.as_ref().ok_or(Error::StoreClosed)?;
                conn.execute("DELETE FROM kv", [])?;
                Ok(())
            }
        }
    }

    /// Flushes and releases the store. Later calls fail with
    /// [`Error::StoreClosed`].
    pub fn close(&self) -> Result<()> {
        match self {
            Store::Mem(store) => {
                store.entries.lock().take();
                Ok(())
            }
            Store::Sqlite(store) => {
                if let Some(conn) = store.conn.lock().take() {
                    debug!("closing store {}", store.path.display());
                    conn.close().map_err(|(_, e)| Error::Store(e))?;
                }
                Ok(())
            }
        }
    }

    /// Closes the store and removes its file.
    pub fn delete(self) -> Result<()> {
        self.close()?;
        if let Store::Sqlite(store) = &self {
            if store.path.exists() {
                debug!("deleting store {}", store.path.display());
                fs::remove_file(&store.path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_multimap(store: &Store) {
        store.add(b"k1", b"a").unwrap();
        store.add(b"k1", b"b").unwrap();
        store.add(b"k0", b"c").unwrap();
        assert!(store.has(b"k1").unwrap());
        assert!(!store.has(b"k2").unwrap());
        assert_eq!(store.count(b"k1").unwrap(), 2);
        assert_eq!(store.find(b"k1").unwrap(), vec![b"a".to_vec(), b"b".to_vec()]);
        assert_eq!(store.len().unwrap(), 2);
        assert!(!store.put_once(b"k0", &[b"d".to_vec()]).unwrap());
        assert!(store.put_once(b"k3", &[b"e".to_vec(), b"f".to_vec()]).unwrap());
        assert_eq!(store.count(b"k3").unwrap(), 2);
        assert_eq!(store.find(b"k0").unwrap(), vec![b"c".to_vec()]);
    }

    #[test]
    fn test_mem() {
        let store = Store::new_mem();
        check_multimap(&store);
        store.close().unwrap();
        assert!(matches!(store.has(b"k1"), Err(Error::StoreClosed)));
    }

    #[test]
    fn test_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&StoreType::Sqlite(dir.path().to_path_buf()), "test").unwrap();
        check_multimap(&store);
        store.close().unwrap();
        let store = Store::open(&StoreType::Sqlite(dir.path().to_path_buf()), "test").unwrap();
        assert_eq!(store.count(b"k1").unwrap(), 2);
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
        store.delete().unwrap();
        assert!(!dir.path().join("test.db").exists());
    }

    #[test]
    fn test_do_find_stops_on_error() {
        let store = Store::new_mem();
        store.add(b"k", b"a").unwrap();
        store.add(b"k", b"b").unwrap();
        let mut seen = 0;
        let result = store.do_find(b"k", |_| {
            seen += 1;
            Err(Error::Invariant(String::from("stop")))
        });
        assert!(result.is_err());
        assert_eq!(seen, 1);
    }
}

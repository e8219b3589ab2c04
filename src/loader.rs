//! Host graph sources.

use crate::{
    error::{Error, Result},
    graph::{Graph, GraphBuilder},
    types::ExternalId,
};
use log::{info, warn};
use rusqlite::types::ValueRef;

/// Builds a graph from vertex `(id, label)` and edge `(src, dst, label)`
/// lists. Edges with an unknown endpoint are skipped.
pub fn from_iter<V, E, S, T>(vertices: V, edges: E) -> Graph
where
    V: IntoIterator<Item = (ExternalId, S)>,
    E: IntoIterator<Item = (ExternalId, ExternalId, T)>,
    S: AsRef<str>,
    T: AsRef<str>,
{
    let mut builder = GraphBuilder::new();
    info!("scanning vertices...");
    for (id, label) in vertices {
        builder.add_vertex(id, label.as_ref());
    }
    info!("scanning edges...");
    let mut skipped = 0;
    for (src, dst, label) in edges {
        if !builder.add_edge(src, dst, label.as_ref()) {
            skipped += 1;
        }
    }
    if skipped > 0 {
        warn!("skipped {} edges with an unknown endpoint", skipped);
    }
    builder.build()
}

fn label_text(value: ValueRef) -> Result<String> {
    match value {
        ValueRef::Null => Ok(String::new()),
        ValueRef::Integer(i) => Ok(i.to_string()),
        ValueRef::Real(f) => Ok(f.to_string()),
        ValueRef::Text(t) => Ok(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => Err(Error::Parse(String::from("blob labels are not supported"))),
    }
}

/// Reads the graph stored in a SQLite3 database.
///
/// The database must have the following schema, where labels may be
/// integers or text:
///
/// ```sql
/// CREATE TABLE vertices (vid INT, vlabel);
/// CREATE TABLE edges (src INT, dst INT, elabel);
/// ```
pub fn from_sqlite(conn: &rusqlite::Connection) -> Result<Graph> {
    let mut vertices_stmt = conn.prepare("SELECT vid, vlabel FROM vertices")?;
    let vertices = vertices_stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, label_text(row.get_ref(1)?))))?
        .map(|row| {
            let (vid, label) = row?;
            Ok((vid, label?))
        })
        .collect::<Result<Vec<(ExternalId, String)>>>()?;
    let mut edges_stmt = conn.prepare("SELECT src, dst, elabel FROM edges")?;
    let edges = edges_stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                label_text(row.get_ref(2)?),
            ))
        })?
        .map(|row| {
            let (src, dst, label) = row?;
            Ok((src, dst, label?))
        })
        .collect::<Result<Vec<(ExternalId, ExternalId, String)>>>()?;
    Ok(from_iter(vertices, edges))
}

/// Opens the SQLite3 file at `path` and reads its graph.
pub fn from_sqlite_file<P: AsRef<std::path::Path>>(path: P) -> Result<Graph> {
    let conn = rusqlite::Connection::open_with_flags(
        path,
        rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
    )?;
    from_sqlite(&conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    fn create_triangle_sqlite3() -> rusqlite::Connection {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE vertices (vid INT, vlabel)", [])
            .unwrap();
        conn.execute("CREATE TABLE edges (src INT, dst INT, elabel)", [])
            .unwrap();
        for (vid, vlabel) in &[(1, "a"), (2, "b"), (3, "b")] {
            conn.execute("INSERT INTO vertices VALUES (?1, ?2)", params![vid, vlabel])
                .unwrap();
        }
        for (src, dst, elabel) in &[(1, 2, 12), (1, 3, 13), (2, 3, 23), (3, 4, 34)] {
            conn.execute(
                "INSERT INTO edges VALUES (?1, ?2, ?3)",
                params![src, dst, elabel],
            )
            .unwrap();
        }
        conn
    }

    #[test]
    fn test_from_sqlite() {
        let g = from_sqlite(&create_triangle_sqlite3()).unwrap();
        let info = g.info();
        assert_eq!(info.num_vertices(), 3);
        assert_eq!(info.num_edges(), 3);
        let b = g.labels().color("b").unwrap();
        assert_eq!(g.color_frequency(b), 2);
        assert_eq!(g.edge_color_frequency(g.labels().color("12").unwrap()), 1);
    }

    #[test]
    fn test_from_iter() {
        let g = from_iter(
            vec![(10, "x"), (20, "y")],
            vec![(10, 20, "e"), (20, 10, "e"), (20, 30, "e")],
        );
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.external_id(1), 20);
    }
}

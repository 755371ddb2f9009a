//! Merging into a real SQLite database.

#![cfg(feature = "sqlite")]

use std::sync::Arc;

use dbsync_merge::{
    DefaultValueForNull, Dialect, MergeDirection, MergeExecutor, MergePlan, MergerContext,
    MergerTokenFactory, SchemaDiffer, SqlAdapter, SqliteConnectionFactory,
};
use dbsync_schema::{DataMap, DbAttribute, DbEntity, DbRelationship, SqlType};
use tempfile::TempDir;

fn artist() -> DbEntity {
    DbEntity::new("ARTIST")
        .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key())
        .with_attribute(DbAttribute::new("NAME", SqlType::VarChar).with_max_length(100))
}

fn table_exists(conn: &rusqlite::Connection, table: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        == 1
}

fn setup(sql: &str) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gallery.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(sql).unwrap();
    (dir, path)
}

#[tokio::test]
async fn test_artist_painting_merge() {
    let (_dir, path) =
        setup("CREATE TABLE ARTIST (ID INTEGER NOT NULL, NAME VARCHAR(100), PRIMARY KEY (ID));");

    let db = DataMap::new("db").with_db_entity(artist());
    let model = DataMap::new("model")
        .with_db_entity(artist().with_relationship(
            DbRelationship::new("paintings", "PAINTING")
                .join("ID", "ARTIST_ID")
                .to_many(),
        ))
        .with_db_entity(
            DbEntity::new("PAINTING")
                .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key())
                .with_attribute(DbAttribute::new("ARTIST_ID", SqlType::Integer).foreign_key())
                .with_attribute(DbAttribute::new("TITLE", SqlType::VarChar).with_max_length(200))
                .with_relationship(DbRelationship::new("artist", "ARTIST").join("ARTIST_ID", "ID")),
        );

    let factory = MergerTokenFactory::new(Dialect::Sqlite);
    let plan = MergePlan::new(SchemaDiffer::new(&factory).diff(&db, &model, MergeDirection::ToDb));
    let names: Vec<&str> = plan.tokens().iter().map(|t| t.token_name()).collect();
    assert_eq!(names, vec!["Create Table", "Add Relationship"]);

    let adapter = SqlAdapter::new(Dialect::Sqlite);
    let context = MergerContext::new(&adapter)
        .with_connections(Arc::new(SqliteConnectionFactory::new(&path)));
    let result = MergeExecutor::new(context)
        .execute(plan.tokens())
        .await
        .unwrap();

    assert!(result.is_ok(), "unexpected failures: {:?}", result.failures());

    let conn = rusqlite::Connection::open(&path).unwrap();
    assert!(table_exists(&conn, "PAINTING"));
}

#[tokio::test]
async fn test_backfill_before_not_null() {
    let (_dir, path) = setup(
        "CREATE TABLE T (ID INTEGER NOT NULL, RANK INTEGER, PRIMARY KEY (ID));
         INSERT INTO T (ID, RANK) VALUES (1, NULL), (2, 3);",
    );

    let db = DataMap::new("db").with_db_entity(
        DbEntity::new("T")
            .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key())
            .with_attribute(DbAttribute::new("RANK", SqlType::Integer)),
    );
    let model = DataMap::new("model").with_db_entity(
        DbEntity::new("T")
            .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key())
            .with_attribute(
                DbAttribute::new("RANK", SqlType::Integer)
                    .mandatory()
                    .with_default("7"),
            ),
    );

    let factory = MergerTokenFactory::new(Dialect::Sqlite);
    let plan = MergePlan::new(
        SchemaDiffer::new(&factory)
            .with_value_for_null(DefaultValueForNull)
            .diff(&db, &model, MergeDirection::ToDb),
    );

    let adapter = SqlAdapter::new(Dialect::Sqlite);
    let context = MergerContext::new(&adapter)
        .with_connections(Arc::new(SqliteConnectionFactory::new(&path)));
    let result = MergeExecutor::new(context)
        .execute(plan.tokens())
        .await
        .unwrap();
    assert!(result.is_ok());

    let conn = rusqlite::Connection::open(&path).unwrap();
    let ranks: Vec<i64> = conn
        .prepare("SELECT RANK FROM T ORDER BY ID")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(ranks, vec![7, 3]);
}

#[tokio::test]
async fn test_failed_statement_is_recorded() {
    let (_dir, path) = setup("CREATE TABLE KEEP (ID INTEGER);");

    let factory = MergerTokenFactory::new(Dialect::Sqlite);
    let tokens = vec![
        factory.drop_table_to_db(DbEntity::new("ABSENT")),
        factory.drop_table_to_db(DbEntity::new("KEEP")),
    ];

    let adapter = SqlAdapter::new(Dialect::Sqlite);
    let context = MergerContext::new(&adapter)
        .with_connections(Arc::new(SqliteConnectionFactory::new(&path)));
    let result = MergeExecutor::new(context).execute(&tokens).await.unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.failures()[0].statement, "DROP TABLE ABSENT");

    let conn = rusqlite::Connection::open(&path).unwrap();
    assert!(!table_exists(&conn, "KEEP"));
}

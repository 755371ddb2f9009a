//! Executing token batches against mock connections and in-memory models.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dbsync_merge::{
    ConnectionFactory, DdlConnection, Dialect, DiffOptions, MergeDirection, MergeError,
    MergeExecutor, MergePlan, MergeResult, MergerContext, MergerTokenFactory, ModelChange,
    ModelChangeLog, SchemaDiffer, SqlAdapter, SqlStatement,
};
use dbsync_schema::{DataMap, DbAttribute, DbEntity, DbRelationship, SqlType};
use pretty_assertions::assert_eq;

#[derive(Clone, Default)]
struct RecordingFactory {
    executed: Arc<Mutex<Vec<String>>>,
    fail_on: Option<&'static str>,
    refuse_connections: bool,
}

impl RecordingFactory {
    fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

struct RecordingConnection {
    executed: Arc<Mutex<Vec<String>>>,
    fail_on: Option<&'static str>,
}

#[async_trait]
impl ConnectionFactory for RecordingFactory {
    async fn connect(&self) -> MergeResult<Box<dyn DdlConnection>> {
        if self.refuse_connections {
            return Err(MergeError::connection("connection refused"));
        }
        Ok(Box::new(RecordingConnection {
            executed: self.executed.clone(),
            fail_on: self.fail_on,
        }))
    }
}

#[async_trait]
impl DdlConnection for RecordingConnection {
    async fn execute(&mut self, statement: &SqlStatement) -> MergeResult<u64> {
        if let Some(pattern) = self.fail_on {
            if statement.sql.contains(pattern) {
                return Err(MergeError::database("object is locked"));
            }
        }
        self.executed.lock().unwrap().push(statement.to_inline_sql());
        Ok(0)
    }
}

fn artist() -> DbEntity {
    DbEntity::new("ARTIST")
        .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key())
        .with_attribute(DbAttribute::new("NAME", SqlType::VarChar).with_max_length(100))
}

fn gallery() -> DataMap {
    DataMap::new("gallery")
        .with_db_entity(artist().with_relationship(
            DbRelationship::new("paintings", "PAINTING")
                .join("ID", "ARTIST_ID")
                .to_many()
                .with_reverse("artist"),
        ))
        .with_db_entity(
            DbEntity::new("PAINTING")
                .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key())
                .with_attribute(DbAttribute::new("ARTIST_ID", SqlType::Integer).foreign_key())
                .with_attribute(DbAttribute::new("TITLE", SqlType::VarChar).with_max_length(200))
                .with_relationship(
                    DbRelationship::new("artist", "ARTIST")
                        .join("ARTIST_ID", "ID")
                        .with_reverse("paintings"),
                ),
        )
}

#[tokio::test]
async fn test_new_table_runs_create_then_foreign_key() {
    let db = DataMap::new("db").with_db_entity(artist());
    let factory = MergerTokenFactory::new(Dialect::Postgres);
    let plan =
        MergePlan::new(SchemaDiffer::new(&factory).diff(&db, &gallery(), MergeDirection::ToDb));
    assert_eq!(plan.len(), 2);

    let adapter = SqlAdapter::new(Dialect::Postgres);
    let connections = RecordingFactory::default();
    let context = MergerContext::new(&adapter).with_connections(Arc::new(connections.clone()));
    let mut executor = MergeExecutor::new(context);

    let result = executor.execute(plan.tokens()).await.unwrap();

    assert!(result.is_ok());
    assert_eq!(
        connections.executed(),
        vec![
            concat!(
                "CREATE TABLE PAINTING (\n",
                "    ID INTEGER NOT NULL,\n",
                "    ARTIST_ID INTEGER,\n",
                "    TITLE VARCHAR(200),\n",
                "    PRIMARY KEY (ID)\n",
                ")"
            )
            .to_string(),
            "ALTER TABLE PAINTING ADD FOREIGN KEY (ARTIST_ID) REFERENCES ARTIST (ID)".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_statement_failures_accumulate() {
    let factory = MergerTokenFactory::generic();
    let tokens = vec![
        factory.drop_table_to_db(DbEntity::new("LOCKED")),
        factory.drop_table_to_db(DbEntity::new("FREE")),
    ];

    let adapter = SqlAdapter::new(Dialect::Generic);
    let connections = RecordingFactory {
        fail_on: Some("LOCKED"),
        ..Default::default()
    };
    let context = MergerContext::new(&adapter).with_connections(Arc::new(connections.clone()));
    let mut executor = MergeExecutor::new(context);

    let result = executor.execute(&tokens).await.unwrap();

    assert_eq!(result.len(), 1);
    let failure = &result.failures()[0];
    assert_eq!(failure.token, "Drop Table LOCKED");
    assert_eq!(failure.statement, "DROP TABLE LOCKED");
    assert!(failure.message.contains("object is locked"));
    assert_eq!(connections.executed(), vec!["DROP TABLE FREE".to_string()]);
}

#[tokio::test]
async fn test_connection_failure_records_every_statement() {
    let factory = MergerTokenFactory::generic();
    let token = factory.set_primary_key_to_db(
        DbEntity::new("T"),
        vec!["A".into()],
        vec!["B".into()],
        Some("PK_T".into()),
    );

    let adapter = SqlAdapter::new(Dialect::Generic);
    let connections = RecordingFactory {
        refuse_connections: true,
        ..Default::default()
    };
    let mut executor =
        MergeExecutor::new(MergerContext::new(&adapter).with_connections(Arc::new(connections)));

    let result = executor.execute(&[token]).await.unwrap();

    let statements: Vec<&str> = result.failures().iter().map(|f| f.statement.as_str()).collect();
    assert_eq!(
        statements,
        vec![
            "ALTER TABLE T DROP CONSTRAINT PK_T",
            "ALTER TABLE T ADD PRIMARY KEY (B)"
        ]
    );
}

#[tokio::test]
async fn test_database_tokens_need_connections() {
    let factory = MergerTokenFactory::generic();
    let adapter = SqlAdapter::new(Dialect::Generic);
    let mut executor = MergeExecutor::new(MergerContext::new(&adapter));

    let err = executor
        .execute(&[factory.drop_table_to_db(DbEntity::new("T"))])
        .await
        .unwrap_err();

    assert!(matches!(err, MergeError::Config(_)));
}

#[tokio::test]
async fn test_unmapped_type_aborts_batch() {
    let factory = MergerTokenFactory::generic();
    let odd = DbEntity::new("T").with_attribute(DbAttribute::new("GEOM", SqlType::Other(1111)));
    let tokens = vec![
        factory.drop_table_to_db(DbEntity::new("FIRST")),
        factory.create_table_to_db(odd),
        factory.drop_table_to_db(DbEntity::new("NEVER")),
    ];

    let adapter = SqlAdapter::new(Dialect::Generic);
    let connections = RecordingFactory::default();
    let context = MergerContext::new(&adapter).with_connections(Arc::new(connections.clone()));
    let mut executor = MergeExecutor::new(context);

    let err = executor.execute(&tokens).await.unwrap_err();

    assert!(err.to_string().contains("T.GEOM"));
    assert_eq!(connections.executed(), vec!["DROP TABLE FIRST".to_string()]);
}

#[tokio::test]
async fn test_model_converges_to_database() {
    let mut model = DataMap::new("model")
        .with_db_entity(
            DbEntity::new("ARTIST")
                .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key())
                .with_attribute(DbAttribute::new("NAME", SqlType::VarChar).with_max_length(50)),
        )
        .with_db_entity(
            DbEntity::new("LEGACY").with_attribute(DbAttribute::new("ID", SqlType::Integer)),
        );
    let db = gallery();
    let factory = MergerTokenFactory::generic();
    let differ = SchemaDiffer::new(&factory);

    let plan = MergePlan::new(differ.diff(&model, &db, MergeDirection::ToModel));
    let names: Vec<&str> = plan.tokens().iter().map(|t| t.token_name()).collect();
    assert_eq!(
        names,
        vec![
            "Drop Table",
            "Create Table",
            "Set Column Type",
            "Add Relationship",
            "Add Relationship",
        ]
    );

    let adapter = SqlAdapter::new(Dialect::Generic);
    let mut log = ModelChangeLog::default();
    {
        let context = MergerContext::new(&adapter)
            .with_data_map(&mut model)
            .with_delegate(&mut log);
        let result = MergeExecutor::new(context)
            .execute(plan.tokens())
            .await
            .unwrap();
        assert!(result.is_ok());
    }

    assert!(differ.diff(&model, &db, MergeDirection::ToModel).is_empty());
    assert!(!model.has_db_entity("LEGACY"));

    let painting = model.obj_entity("Painting").expect("object entity created");
    assert!(painting.has_attribute("title"));
    assert!(!painting.has_attribute("artistId"));

    let changes = log.changes();
    assert!(changes.contains(&ModelChange::DbEntityRemoved {
        table: "LEGACY".into()
    }));
    assert!(changes.contains(&ModelChange::DbAttributeModified {
        table: "ARTIST".into(),
        column: "NAME".into()
    }));
    assert!(changes.contains(&ModelChange::DbRelationshipAdded {
        table: "PAINTING".into(),
        relationship: "artist".into()
    }));
}

#[tokio::test]
async fn test_case_insensitive_model_merge() {
    let mut model = DataMap::new("model").with_db_entity(
        DbEntity::new("ARTIST")
            .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key())
            .with_attribute(DbAttribute::new("NAME", SqlType::VarChar).with_max_length(50))
            .with_attribute(DbAttribute::new("CODE", SqlType::Integer)),
    );
    let db = DataMap::new("db").with_db_entity(
        DbEntity::new("artist")
            .with_attribute(DbAttribute::new("id", SqlType::Integer))
            .with_attribute(
                DbAttribute::new("name", SqlType::VarChar)
                    .with_max_length(100)
                    .mandatory(),
            )
            .with_attribute(DbAttribute::new("code", SqlType::Integer).primary_key()),
    );
    let factory = MergerTokenFactory::generic();
    let differ =
        SchemaDiffer::new(&factory).with_options(DiffOptions::new().case_insensitive(true));

    let plan = MergePlan::new(differ.diff(&model, &db, MergeDirection::ToModel));
    assert!(!plan.is_empty());

    let adapter = SqlAdapter::new(Dialect::Generic);
    {
        let context = MergerContext::new(&adapter).with_data_map(&mut model);
        let result = MergeExecutor::new(context)
            .execute(plan.tokens())
            .await
            .unwrap();
        assert!(result.is_ok());
    }

    let artist = model.db_entity("ARTIST").unwrap();
    let name = artist.attribute("NAME").unwrap();
    assert_eq!(name.max_length, Some(100));
    assert!(name.mandatory);
    assert_eq!(artist.primary_key_names(), vec!["CODE".to_string()]);
    assert!(differ.diff(&model, &db, MergeDirection::ToModel).is_empty());
}

#[tokio::test]
async fn test_model_errors_abort() {
    let factory = MergerTokenFactory::generic();
    let adapter = SqlAdapter::new(Dialect::Generic);
    let mut model = DataMap::new("model");

    let context = MergerContext::new(&adapter).with_data_map(&mut model);
    let err = MergeExecutor::new(context)
        .execute(&[factory.drop_table_to_model(DbEntity::new("MISSING"))])
        .await
        .unwrap_err();

    assert!(matches!(err, MergeError::Model(_)));
}

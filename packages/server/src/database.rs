use std::time::Duration;

use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entity::{admin, answer, participant, participation, round, session, tenant};

pub async fn init_db(cfg: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(cfg.url.clone());

    // Set connection pool options
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(cfg.sqlx_logging);

    let db = Database::connect(opt).await?;
    create_schema(&db).await?;

    Ok(db)
}

/// Create every table and index that does not exist yet. Parents before children.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, tenant::Entity).await?;
    create_table(db, admin::Entity).await?;
    create_table(db, participant::Entity).await?;
    create_table(db, session::Entity).await?;
    create_table(db, round::Entity).await?;
    create_table(db, participation::Entity).await?;
    create_table(db, answer::Entity).await?;

    for stmt in composite_indexes() {
        db.execute(db.get_database_backend().build(&stmt)).await?;
    }

    info!("Database schema is up to date");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(backend.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }
    Ok(())
}

/// Indexes spanning several columns. The unique ones back the
/// one-participation-per-pair and one-answer-per-round invariants.
fn composite_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("uq_participation_participant_session")
            .table(participation::Entity)
            .col(participation::Column::ParticipantId)
            .col(participation::Column::SessionId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("uq_answer_participation_round")
            .table(answer::Entity)
            .col(answer::Column::ParticipationId)
            .col(answer::Column::RoundNumber)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("uq_round_session_number")
            .table(round::Entity)
            .col(round::Column::SessionId)
            .col(round::Column::RoundNumber)
            .unique()
            .if_not_exists()
            .to_owned(),
        // Lookup only: display name uniqueness is enforced at write time.
        Index::create()
            .name("idx_participant_tenant_name")
            .table(participant::Entity)
            .col(participant::Column::TenantId)
            .col(participant::Column::DisplayName)
            .if_not_exists()
            .to_owned(),
    ]
}

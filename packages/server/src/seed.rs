use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use tracing::info;

use crate::entity::{category, post};

/// Composite indexes backing the hot list queries, keyed by name.
fn composite_indexes() -> Vec<(&'static str, IndexCreateStatement)> {
    vec![
        // Sibling lookups: WHERE parent_id = ? ORDER BY sort_order
        (
            "idx_category_parent_order",
            Index::create()
                .if_not_exists()
                .name("idx_category_parent_order")
                .table(category::Entity)
                .col(category::Column::ParentId)
                .col(category::Column::SortOrder)
                .to_owned(),
        ),
        // Scheduled-publish sweep: WHERE status = 'draft' AND scheduled_publish_date <= ?
        (
            "idx_post_status_scheduled",
            Index::create()
                .if_not_exists()
                .name("idx_post_status_scheduled")
                .table(post::Entity)
                .col(post::Column::Status)
                .col(post::Column::ScheduledPublishDate)
                .to_owned(),
        ),
        // Admin listing: WHERE is_deleted = false ORDER BY created_at
        (
            "idx_post_deleted_created",
            Index::create()
                .if_not_exists()
                .name("idx_post_deleted_created")
                .table(post::Entity)
                .col(post::Column::IsDeleted)
                .col(post::Column::CreatedAt)
                .to_owned(),
        ),
    ]
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup. Failures are logged, not fatal.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    for (name, stmt) in composite_indexes() {
        let result = db
            .execute_unprepared(&stmt.to_string(PostgresQueryBuilder))
            .await;
        match result {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}

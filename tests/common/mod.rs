//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test utilities used across
//! multiple integration test files.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use flywheel::adapters::sqlite::create_migrated_test_pool;

/// Create an in-memory SQLite database with all migrations applied.
/// Each call is a completely isolated database instance.
pub async fn setup_test_db() -> SqlitePool {
    create_migrated_test_pool()
        .await
        .expect("failed to create test database")
}

/// Seed a project row and return its ID.
pub async fn seed_project(pool: &SqlitePool, slug: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO projects (id, workspace_id, slug, name, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(Uuid::new_v4().to_string())
    .bind(slug)
    .bind(format!("Project {slug}"))
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await
    .expect("failed to seed project");
    id
}

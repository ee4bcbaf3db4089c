//! db.rs
//! Conexión a SQLite, migraciones y clasificación de errores de constraints.

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

const MAX_CONNECTIONS: u32 = 5;

/// Abre el pool. Las foreign keys se activan en cada conexión, sin eso
/// el `ON DELETE CASCADE` de `batch_calls` no se aplica.
pub async fn setup_database(database_url: &str) -> Result<Pool<Sqlite>> {
    let in_memory = database_url.contains(":memory:");
    if !in_memory {
        ensure_parent_dir(database_url)?;
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("DATABASE_URL inválida: {}", database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    // Cada conexión a ":memory:" es una base distinta
    let max_connections = if in_memory { 1 } else { MAX_CONNECTIONS };

    log::info!("Conectando a SQLite en {}", database_url);
    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
    if in_memory {
        // Si el pool cierra la única conexión se pierde la base
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }
    let pool = pool_options
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite")?;

    Ok(pool)
}

fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("No se pudo crear directorio {:?}", parent))?;
        }
    }
    Ok(())
}

/// Corre migraciones embebidas (./migrations)
pub async fn run_migrations(db_pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(db_pool)
        .await
        .context("Fallo en migraciones")?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    Unique,
    ForeignKey,
}

pub fn constraint_violation(err: &sqlx::Error) -> Option<ConstraintViolation> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Some(ConstraintViolation::Unique)
        }
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            Some(ConstraintViolation::ForeignKey)
        }
        _ => None,
    }
}

#[cfg(test)]
pub async fn test_pool() -> Pool<Sqlite> {
    let pool = setup_database("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&pool).await.expect("migrations");
    pool
}

//! `dialogstore migrate`: bring the schema up to date and exit.

use anyhow::{Context, Result};
use console::style;

use dialogstore_infra::sqlite::migrate::MigrationRunner;
use dialogstore_infra::sqlite::pool::DatabasePool;
use dialogstore_types::config::{DatabaseConfig, Driver};

/// Apply every pending migration. Any failure is returned as-is; the
/// process exits non-zero and the dirty flag is left for the operator.
pub async fn migrate(config: &DatabaseConfig, json: bool) -> Result<()> {
    if config.driver == Driver::Memory {
        if json {
            println!("{}", serde_json::json!({ "driver": "memory", "applied": [] }));
        } else {
            println!("  The memory driver has no schema, nothing to migrate.");
        }
        return Ok(());
    }

    let pool = DatabasePool::connect(&config.data_source)
        .await
        .with_context(|| format!("cannot connect to '{}'", config.data_source))?;

    let result = MigrationRunner::new(&pool, &config.migrations_path)
        .run()
        .await;
    pool.close().await;
    let report = result?;

    if json {
        let out = serde_json::json!({
            "driver": "sqlite",
            "applied": report.applied,
            "version": report.version,
            "dirty": report.dirty,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if report.applied.is_empty() {
        println!(
            "  {} Schema already current (version {})",
            style("✓").green().bold(),
            display_version(report.version)
        );
    } else {
        for version in &report.applied {
            println!("  {} Applied migration {}", style("✓").green().bold(), version);
        }
        println!(
            "  Schema now at version {}",
            style(display_version(report.version)).bold()
        );
    }

    Ok(())
}

pub(crate) fn display_version(version: Option<i64>) -> String {
    version.map_or_else(|| "none".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn sqlite_config(dir: &Path) -> DatabaseConfig {
        DatabaseConfig {
            driver: Driver::Sqlite,
            data_source: format!("sqlite://{}?mode=rwc", dir.join("cli.db").display()),
            migrations_path: Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations"),
        }
    }

    #[tokio::test]
    async fn test_migrate_then_status() {
        let dir = tempfile::tempdir().unwrap();
        let config = sqlite_config(dir.path());

        migrate(&config, true).await.unwrap();
        // A second run finds nothing to do.
        migrate(&config, true).await.unwrap();
        crate::cli::status::status(&config, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_migrate_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = sqlite_config(dir.path());
        config.migrations_path = dir.path().join("nope");

        assert!(migrate(&config, true).await.is_err());
    }

    #[test]
    fn test_display_version() {
        assert_eq!(display_version(None), "none");
        assert_eq!(display_version(Some(1)), "1");
    }
}

//! `dialogstore status`: schema version and store reachability.

use anyhow::{Context, Result};
use console::style;

use dialogstore_infra::sqlite::migrate::MigrationRunner;
use dialogstore_infra::sqlite::pool::DatabasePool;
use dialogstore_types::config::{DatabaseConfig, Driver};

use super::migrate::display_version;

/// Report the configured driver, store health, and the recorded schema
/// version with its dirty flag.
///
/// Never writes: a missing database file is an error, not a new empty
/// database.
pub async fn status(config: &DatabaseConfig, json: bool) -> Result<()> {
    let (version, dirty, healthy) = match config.driver {
        Driver::Memory => (None, false, true),
        Driver::Sqlite => {
            let pool = DatabasePool::connect_existing(&config.data_source)
                .await
                .with_context(|| format!("cannot open '{}'", config.data_source))?;
            let healthy = pool.ping().await.is_ok();
            let state = MigrationRunner::new(&pool, &config.migrations_path)
                .version()
                .await;
            pool.close().await;
            match state? {
                Some((version, dirty)) => (Some(version), dirty, healthy),
                None => (None, false, healthy),
            }
        }
    };

    if json {
        let out = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "driver": config.driver.to_string(),
            "data_source": config.data_source,
            "schema_version": version,
            "dirty": dirty,
            "healthy": healthy,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {} Dialogstore v{}", style("●").bold(), env!("CARGO_PKG_VERSION"));
    println!();
    println!("  {}", style("── Storage ──").dim());
    println!("  Driver:  {}", style(config.driver).bold());
    if healthy {
        println!("  Health:  {}", style("ok").green());
    } else {
        println!("  Health:  {}", style("unreachable").red());
    }
    if config.driver == Driver::Sqlite {
        println!("  Source:  {}", config.data_source);
        println!("  Schema:  {}", style(display_version(version)).bold());
        if dirty {
            println!(
                "  {}",
                style("Dirty: the last migration failed, repair the schema and clear the flag")
                    .red()
            );
        }
    }
    println!();

    Ok(())
}

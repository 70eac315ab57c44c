//! `alfred doctor` — Diagnose configuration and connectivity.

use alfred_config::AppConfig;
use alfred_core::provider::Provider;
use alfred_retrieval::GuestSource;

use super::setup;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Alfred Doctor");
    println!("=============\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if config_path.exists() {
        println!("  [ok]   Config file at {}", config_path.display());
    } else {
        println!("  [warn] No config file, using defaults (run `alfred init`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  [ok]   Config valid");
            config
        }
        Err(e) => {
            println!("  [fail] Config invalid: {e}");
            println!("\n  1 issue found; fix the config before the remaining checks.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  [ok]   API key configured");
    } else {
        println!("  [fail] No API key: set ALFRED_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    match setup::guest_source(&config) {
        Ok(source) => match source.fetch().await {
            Ok(records) => println!(
                "  [ok]   Guest list reachable: {} ({} guests)",
                source.describe(),
                records.len()
            ),
            Err(e) => {
                println!("  [fail] Guest list unreachable: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  [fail] Guest source: {e}");
            issues += 1;
        }
    }

    let router = alfred_providers::build_from_config(&config);
    match router.default() {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => println!("  [ok]   Model provider '{}' reachable", provider.name()),
            Ok(false) => {
                println!("  [fail] Model provider '{}' did not answer", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  [fail] Model provider '{}': {e}", provider.name());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  [fail] {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

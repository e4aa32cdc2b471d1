//! CLI status report for the equipment store.
//!
//! # Responsibility
//! - Open the store configured by `WWTP_*` environment variables.
//! - Print row counts and the active project in a stable key=value layout.

use log::info;
use std::process::ExitCode;
use wwtp_core::{init_logging, EquipmentStore, StoreConfig};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("wwtp error={message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = StoreConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }

    let store = EquipmentStore::from_config(&config).map_err(|err| err.to_string())?;
    let stats = store.stats().map_err(|err| err.to_string())?;
    info!(
        "event=cli_status module=cli status=ok projects={} equipment={}",
        stats.projects, stats.equipment
    );

    println!("wwtp_core version={}", wwtp_core::core_version());
    println!("db_path={}", config.db_path.display());
    println!("file_root={}", config.file_root.display());
    println!(
        "projects={} equipment={} project_equipment={} quotes={} documents={}",
        stats.projects, stats.equipment, stats.project_equipment, stats.quotes, stats.documents
    );

    match store.projects().active_project().map_err(|err| err.to_string())? {
        Some(project) => println!("active_project={} name={}", project.id, project.name),
        None => println!("active_project=none"),
    }
    Ok(())
}

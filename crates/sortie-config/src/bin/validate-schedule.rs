//! Schedule validation CLI tool
//!
//! Validates a sortie schedule file and reports any errors.

use sortie_util::{default_config_path, format_date_short, format_time_of_day};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-schedule [schedule-file]");
            eprintln!();
            eprintln!("Validates a sortie schedule file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-schedule {}", default_path.display());
            eprintln!("  validate-schedule schedule.example.toml");
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Schedule file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match sortie_config::load_config(&config_path) {
        Ok(schedule) => {
            println!("✓ Schedule is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", sortie_config::CURRENT_CONFIG_VERSION);
            println!("  Poll interval: {}s", schedule.board.poll_interval.as_secs());
            println!("  Sessions: {}", schedule.sessions.len());

            if !schedule.sessions.is_empty() {
                println!();
                println!("Sessions:");
                for session in &schedule.sessions {
                    let code = session
                        .code
                        .as_ref()
                        .map(|c| c.as_str())
                        .unwrap_or("N/A");
                    let end = session
                        .end_time
                        .map(format_time_of_day)
                        .unwrap_or_else(|| "+2ч".to_string());
                    println!(
                        "  - {} [{}]: {} регистрация {}, {}-{}, закрытие за {} мин",
                        session.id,
                        code,
                        format_date_short(session.date),
                        format_time_of_day(session.registration_start_time),
                        format_time_of_day(session.start_time),
                        end,
                        session.closing_minutes
                    );
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Schedule validation failed");
            eprintln!();
            match &e {
                sortie_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                sortie_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                sortie_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                sortie_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        sortie_config::CURRENT_CONFIG_VERSION
                    );
                }
                sortie_config::ConfigError::Session(err) => {
                    eprintln!("Invalid session record: {}", err);
                }
            }
            ExitCode::from(1)
        }
    }
}

//! sortie - check-session registration board
//!
//! Loads a session schedule and shows where every session stands:
//! - One-shot status listings with filter tabs
//! - A watch loop that reports status changes as they happen
//! - The archive of completed sessions
//! - Pilot registration, checked against accepted keys when given
//! - Helpers for dispatchers: key checks, fresh codes, new session records

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sortie_api::{FilterCounts, SessionView, StatusFilter};
use sortie_config::{RawSession, Schedule, load_config, session_to_raw};
use sortie_core::{
    Board, BoardEvent, KeyCheck, SessionDraft, ValidKeys, format_session_length,
    generate_unique_session_code, normalize_key, register, session_view,
};
use sortie_util::{SessionCode, default_config_path, format_clock_time, parse_clock, parse_date};
use std::path::{Path, PathBuf};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// sortie - check-session registration board
#[derive(Parser, Debug)]
#[command(name = "sortie", version)]
#[command(about = "Registration status board for check sessions", long_about = None)]
struct Args {
    /// Schedule file path (or set SORTIE_CONFIG; default: ~/.config/sortie/schedule.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "SORTIE_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List sessions that haven't completed yet
    Status {
        /// Evaluate at this UTC instant instead of now ("YYYY-MM-DD HH:MM")
        #[arg(long, value_parser = parse_instant)]
        at: Option<DateTime<Utc>>,

        /// all, open, closing or upcoming
        #[arg(short, long, default_value = "all")]
        filter: StatusFilter,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one session card
    Show {
        /// Session id or code
        key: String,

        #[arg(long, value_parser = parse_instant)]
        at: Option<DateTime<Utc>>,

        #[arg(long)]
        json: bool,
    },

    /// Re-evaluate the board periodically and report status changes
    Watch,

    /// List completed sessions, most recent first
    Archive {
        #[arg(long, value_parser = parse_instant)]
        at: Option<DateTime<Utc>>,

        #[arg(long)]
        json: bool,
    },

    /// Register a pilot for a session whose registration is open
    Register {
        /// Session id or code
        session: String,

        /// Pilot name
        #[arg(long)]
        name: String,

        /// Pilot code, three Latin letters
        #[arg(long)]
        code: String,

        /// Accepted keys, comma separated; verifies the code when given
        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,

        #[arg(long, value_parser = parse_instant)]
        at: Option<DateTime<Utc>>,

        #[arg(long)]
        json: bool,
    },

    /// Check a pilot key against the accepted keys
    CheckKey {
        /// Accepted keys, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        keys: Vec<String>,

        key: String,
    },

    /// Print a session code not yet used in the schedule
    NewCode,

    /// Print a TOML record for a new session
    NewSession {
        /// Session date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,

        /// Session start (HH:MM)
        #[arg(long, value_parser = parse_clock_arg)]
        start: NaiveTime,

        /// Registration opens (HH:MM, default: session start)
        #[arg(long, value_parser = parse_clock_arg)]
        registration_start: Option<NaiveTime>,

        /// Session end (HH:MM, default: two hours after start)
        #[arg(long, value_parser = parse_clock_arg)]
        end: Option<NaiveTime>,

        /// Close registration this many minutes before start
        #[arg(long, allow_negative_numbers = true)]
        closing_minutes: Option<i64>,

        /// Session code (default: generated)
        #[arg(long)]
        code: Option<String>,

        #[arg(long)]
        comments: Option<String>,
    },
}

fn parse_instant(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M")
        .map(|dt| dt.and_utc())
        .map_err(|e| format!("expected \"YYYY-MM-DD HH:MM\": {}", e))
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn parse_clock_arg(s: &str) -> std::result::Result<NaiveTime, String> {
    parse_clock(s).map_err(|e| e.to_string())
}

fn load_schedule(path: &Path) -> Result<Schedule> {
    let schedule = load_config(path)
        .with_context(|| format!("Failed to load schedule from {:?}", path))?;

    info!(
        config_path = %path.display(),
        session_count = schedule.sessions.len(),
        "Schedule loaded"
    );

    Ok(schedule)
}

/// JSON shape of `sortie status --json`
#[derive(Serialize)]
struct StatusReport<'a> {
    now: DateTime<Utc>,
    filter: StatusFilter,
    counts: FilterCounts,
    sessions: &'a [SessionView],
}

fn print_views(views: &[SessionView]) {
    if views.is_empty() {
        println!("  (нет сессий)");
        return;
    }

    for view in views {
        let code = view.code.as_ref().map(|c| c.as_str()).unwrap_or("---");
        let action = if view.can_register {
            "Записаться"
        } else {
            "Запись закрыта"
        };

        println!("  {:<5} {:<18} {}", code, view.status_label, view.schedule);
        if let Some(title) = &view.title {
            println!("        {}", title);
        }
        println!("        {}", view.registration_window);
        println!("        Старт: {} | {}", view.starts_in, action);
        if let Some(comments) = &view.comments {
            println!("        {}", comments);
        }
    }
}

fn print_counts(counts: &FilterCounts, selected: StatusFilter) {
    let tabs: Vec<String> = [
        StatusFilter::All,
        StatusFilter::Open,
        StatusFilter::Closing,
        StatusFilter::Upcoming,
    ]
    .into_iter()
    .map(|f| {
        let marker = if f == selected { "*" } else { "" };
        format!("{}{} ({})", marker, f.label(), counts.get(f))
    })
    .collect();

    println!("{}", tabs.join(" | "));
}

fn cmd_status(board: &Board, now: DateTime<Utc>, filter: StatusFilter, json: bool) -> Result<()> {
    let views = board.filter(now, filter);
    let counts = board.counts(now);

    if json {
        let report = StatusReport {
            now,
            filter,
            counts,
            sessions: &views,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Сессии на {} UTC", now.format("%d.%m.%Y %H:%M"));
    print_counts(&counts, filter);
    println!();
    print_views(&views);
    Ok(())
}

fn cmd_show(board: &Board, key: &str, now: DateTime<Utc>, json: bool) -> Result<()> {
    let session = board.find(key)?;
    let view = session_view(session, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    print_views(std::slice::from_ref(&view));
    println!(
        "        Длительность: {}",
        format_session_length(session.start_time, session.end_time)
    );
    Ok(())
}

fn cmd_archive(board: &Board, now: DateTime<Utc>, json: bool) -> Result<()> {
    let views = board.archive(now);

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    println!("Архив ({})", views.len());
    print_views(&views);
    Ok(())
}

struct Registration<'a> {
    session: &'a str,
    name: &'a str,
    code: &'a str,
    keys: &'a [String],
}

fn cmd_register(board: &Board, now: DateTime<Utc>, reg: Registration<'_>, json: bool) -> Result<()> {
    let session = board.find(reg.session)?;
    let mut participant =
        register(session, now, reg.name, reg.code).context("Registration refused")?;

    if !reg.keys.is_empty() {
        participant.verify(&ValidKeys::new(reg.keys));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&participant)?);
        return Ok(());
    }

    let verdict = match participant.is_valid {
        None => "не проверен",
        Some(true) => "ключ принят",
        Some(false) => "неверный ключ",
    };
    println!(
        "{} ({}) записан, {}",
        participant.name, participant.code, verdict
    );
    Ok(())
}

fn cmd_check_key(keys: &[String], key: &str) -> Result<()> {
    let valid = ValidKeys::new(keys);
    debug!(accepted = valid.len(), "Checking key");

    match valid.check(key) {
        KeyCheck::Valid => {
            println!("Ключ принят");
            Ok(())
        }
        KeyCheck::Invalid => {
            let similar = valid.matching(&normalize_key(key).chars().take(2).collect::<String>());
            if !similar.is_empty() {
                println!("Похожие ключи: {}", similar.join(", "));
            }
            bail!("Неверный ключ")
        }
        KeyCheck::Empty => bail!("Введите ключ"),
    }
}

/// TOML wrapper so the record prints as a `[[sessions]]` table
#[derive(Serialize)]
struct SessionSnippet {
    sessions: Vec<RawSession>,
}

fn cmd_new_session(schedule: &Schedule, now: DateTime<Utc>, draft: SessionDraft) -> Result<()> {
    let session = draft
        .build(now, &mut rand::rng(), &schedule.taken_codes())
        .context("Session rejected")?;

    let snippet = SessionSnippet {
        sessions: vec![session_to_raw(&session)],
    };
    print!("{}", toml::to_string(&snippet)?);
    Ok(())
}

/// Watch loop state
struct Watcher {
    board: Board,
    config_path: PathBuf,
}

impl Watcher {
    fn new(config_path: PathBuf) -> Result<Self> {
        let schedule = load_schedule(&config_path)?;
        Ok(Self {
            board: Board::new(schedule),
            config_path,
        })
    }

    async fn run(mut self) -> Result<()> {
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup =
            signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        let mut poll_interval = self.board.schedule().board.poll_interval;
        let mut tick_timer = tokio::time::interval(poll_interval);

        info!(poll_interval_secs = poll_interval.as_secs(), "Watching schedule");

        loop {
            let mut reloaded = false;

            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, stopping");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, stopping");
                    break;
                }

                // SIGHUP - re-read the schedule file
                _ = sighup.recv() => {
                    reloaded = self.reload();
                }

                _ = tick_timer.tick() => {
                    let now = sortie_util::now();
                    for event in self.board.tick(now) {
                        Self::handle_event(&event, now);
                    }
                }
            }

            if reloaded && self.board.schedule().board.poll_interval != poll_interval {
                poll_interval = self.board.schedule().board.poll_interval;
                tick_timer = tokio::time::interval(poll_interval);
                info!(poll_interval_secs = poll_interval.as_secs(), "Poll interval changed");
            }
        }

        info!("Watch stopped");
        Ok(())
    }

    /// Keeps the current schedule if the file no longer loads
    fn reload(&mut self) -> bool {
        match load_config(&self.config_path) {
            Ok(schedule) => {
                let event = self.board.reload(schedule);
                Self::handle_event(&event, sortie_util::now());
                true
            }
            Err(e) => {
                warn!(error = %e, "Reload failed, keeping current schedule");
                false
            }
        }
    }

    fn handle_event(event: &BoardEvent, now: DateTime<Utc>) {
        match event {
            BoardEvent::StatusChanged {
                session_id,
                code,
                from,
                to,
            } => {
                let name = code
                    .as_ref()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| session_id.to_string());
                match from {
                    Some(from) => println!(
                        "[{}] {}: {} -> {}",
                        format_clock_time(&now),
                        name,
                        from.label(),
                        to.label()
                    ),
                    None => println!("[{}] {}: {}", format_clock_time(&now), name, to.label()),
                }
            }
            BoardEvent::ScheduleReloaded { session_count } => {
                println!(
                    "[{}] Расписание обновлено: {} сессий",
                    format_clock_time(&now),
                    session_count
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "sortie starting");

    if sortie_util::is_mock_time_active() {
        warn!(now = %sortie_util::now(), "Mock time active");
    }

    match args.command {
        Command::Status { at, filter, json } => {
            let board = Board::new(load_schedule(&args.config)?);
            cmd_status(&board, at.unwrap_or_else(sortie_util::now), filter, json)
        }
        Command::Show { key, at, json } => {
            let board = Board::new(load_schedule(&args.config)?);
            cmd_show(&board, &key, at.unwrap_or_else(sortie_util::now), json)
        }
        Command::Watch => Watcher::new(args.config)?.run().await,
        Command::Archive { at, json } => {
            let board = Board::new(load_schedule(&args.config)?);
            cmd_archive(&board, at.unwrap_or_else(sortie_util::now), json)
        }
        Command::Register {
            session,
            name,
            code,
            keys,
            at,
            json,
        } => {
            let board = Board::new(load_schedule(&args.config)?);
            let reg = Registration {
                session: &session,
                name: &name,
                code: &code,
                keys: &keys,
            };
            cmd_register(&board, at.unwrap_or_else(sortie_util::now), reg, json)
        }
        Command::CheckKey { keys, key } => cmd_check_key(&keys, &key),
        Command::NewCode => {
            let schedule = load_schedule(&args.config)?;
            let code = generate_unique_session_code(&mut rand::rng(), &schedule.taken_codes());
            println!("{}", code);
            Ok(())
        }
        Command::NewSession {
            date,
            start,
            registration_start,
            end,
            closing_minutes,
            code,
            comments,
        } => {
            let schedule = load_schedule(&args.config)?;
            let draft = SessionDraft {
                date,
                start_time: start,
                registration_start_time: registration_start,
                end_time: end,
                closing_minutes: closing_minutes
                    .unwrap_or(schedule.board.default_closing_minutes),
                code: code.map(SessionCode::new),
                comments,
            };
            cmd_new_session(&schedule, sortie_util::now(), draft)
        }
    }
}

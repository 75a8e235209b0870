// src/main.rs

//! ucsync: U-Cursos material and calendar sync CLI.
//!
//! Credentials come from `UCURSOS_USERNAME` / `UCURSOS_PASSWORD`; the portal
//! base URL can be overridden with `UCURSOS_URL` for testing against a
//! mirror.

use std::process::ExitCode;

use clap::Parser;
use url::Url;

use ucsync::calendar::{self, Feed};
use ucsync::error::Result;
use ucsync::models::{Config, Course, Section};
use ucsync::pipeline;
use ucsync::services::{Classifier, parse_courses};
use ucsync::session::{Credentials, Session};
use ucsync::storage::FileStore;

/// ucsync - sync U-Cursos materials and deadlines
#[derive(Parser, Debug)]
#[command(name = "ucsync", version, about = "Syncs U-Cursos materials and deadlines")]
struct Cli {
    /// Download material docente
    #[arg(short = 'm', long)]
    material: bool,

    /// Download attachments posted in novedades
    #[arg(short = 'n', long)]
    novedades: bool,

    /// Collect controls from the calendario section
    #[arg(short = 'c', long)]
    calendario: bool,

    /// Collect tareas into the calendar
    #[arg(short = 't', long)]
    tareas: bool,

    /// Only touch courses whose name or code contains this text
    #[arg(long)]
    course: Option<String>,

    /// Serve the published calendar over HTTP instead of scraping
    #[arg(long)]
    serve: bool,

    /// Host to bind in serve mode
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port to bind in serve mode
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Output root, overriding the configured one
    #[arg(short, long)]
    output: Option<String>,

    /// Path to the TOML config file
    #[arg(long, default_value = "ucsync.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Explicit flags narrow the run; no flags means everything.
    fn selection(&self) -> (bool, bool, bool, bool) {
        if self.material || self.novedades || self.calendario || self.tareas {
            (self.material, self.novedades, self.calendario, self.tareas)
        } else {
            (true, true, true, true)
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_or_default(&cli.config);
    if let Some(output) = &cli.output {
        config.output.root = output.clone();
    }
    if let Ok(base_url) = std::env::var("UCURSOS_URL") {
        config.portal.base_url = base_url;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            log::error!("One or more sections failed outright");
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every selected section produced a usable result.
async fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;
    let store = FileStore::new(&config.output.root);

    if cli.serve {
        calendar::serve(store, config.output.calendar_file, &cli.host, cli.port).await?;
        return Ok(true);
    }

    log::info!("ucsync starting against {}", config.portal.base_url);

    let credentials = Credentials::from_env()?;
    let mut session = Session::login(&config, &credentials).await?;

    // Course discovery parses the home page; load it explicitly.
    let home = session.base().to_string();
    session.navigate(&home).await?;

    let courses = select_courses(&session, cli.course.as_deref())?;
    if courses.is_empty() {
        log::warn!("No courses matched; nothing to do");
        return Ok(true);
    }
    log::info!("{} courses selected", courses.len());

    let (material, novedades, calendario, tareas) = cli.selection();
    let classifier = Classifier::new(session.base());
    let mut all_ok = true;

    if material {
        let report = pipeline::run_attachment_section(
            &session,
            &session,
            &classifier,
            &config,
            &store,
            &courses,
            Section::Material,
        )
        .await?;
        all_ok &= !report.failed_outright();
    }
    if novedades {
        let report = pipeline::run_attachment_section(
            &session,
            &session,
            &classifier,
            &config,
            &store,
            &courses,
            Section::Novedades,
        )
        .await?;
        all_ok &= !report.failed_outright();
    }

    if calendario || tareas {
        let mut feed = Feed::new();
        if calendario {
            let report =
                pipeline::collect_control_events(&session, &config, &courses, &mut feed).await?;
            all_ok &= !report.failed_outright();
        }
        if tareas {
            let report =
                pipeline::collect_tarea_events(&session, &config, &courses, &mut feed).await?;
            all_ok &= !report.failed_outright();
        }
        calendar::publish_feed(&feed, &config, &store).await?;
    }

    log::info!("ucsync finished");
    Ok(all_ok)
}

/// Courses come off the session's current page; their links resolve against
/// that page's URL.
fn select_courses(session: &Session, filter: Option<&str>) -> Result<Vec<Course>> {
    let page_url = Url::parse(session.current_url())?;
    let courses = parse_courses(session.current_page_html(), &page_url)?;
    Ok(match filter {
        Some(filter) => courses
            .into_iter()
            .filter(|course| course.matches_filter(filter))
            .collect(),
        None => courses,
    })
}

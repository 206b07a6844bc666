use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use quake_core::{
    load_settings, plates::load_plate_boundaries, HttpEventFetcher, Session, SessionCommand,
};
use serde_json::Value;
use shared::domain::{EventId, MagnitudeThreshold, TimeRangeSelector};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::JoinHandle,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod commands;
mod surfaces;

use commands::{parse_command, CliCommand, HELP};
use surfaces::{TerminalList, TerminalMap};

type TerminalSession = Session<TerminalMap, TerminalList>;

#[derive(Parser, Debug)]
#[command(about = "Browse recent earthquakes from the USGS feeds")]
struct Args {
    /// Settings file; defaults to ./quake.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    range: Option<TimeRangeSelector>,
    #[arg(long)]
    min_magnitude: Option<f64>,
    /// Recenter on this event once the first fetch completes.
    #[arg(long)]
    select: Option<String>,
    /// Fetch once, print, and exit instead of reading commands.
    #[arg(long)]
    once: bool,
    #[arg(long)]
    no_plates: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(range) = args.range {
        settings.default_range = range;
    }
    if let Some(min) = args.min_magnitude {
        settings.default_min_magnitude =
            MagnitudeThreshold::new(min).context("invalid --min-magnitude")?;
    }

    let fetcher = HttpEventFetcher::new(settings.clone())?;
    let http = fetcher.client().clone();
    let plates_url = settings.plate_boundaries_url.clone();
    let initial_range = settings.default_range;

    let mut session: TerminalSession = Session::new(
        Arc::new(fetcher),
        settings,
        TerminalMap::default(),
        TerminalList::default(),
    );

    let mut plate_task = (!args.no_plates && !args.once)
        .then(|| tokio::spawn(async move { load_plate_boundaries(&http, &plates_url).await }));

    session.change_range(initial_range)?;
    session.settle().await;
    print_views(&session);

    if let Some(id) = args.select {
        select_and_report(&mut session, EventId(id));
    }
    if args.once {
        return Ok(());
    }

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read command")? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(CliCommand::Quit)) => break,
                    Ok(Some(command)) => run_command(&mut session, command)?,
                    Ok(None) => {}
                    Err(message) => println!("{message}"),
                }
            }
            Some(completion) = session.next_completion() => {
                if session.apply_completion(completion) {
                    print_views(&session);
                }
            }
            Some(boundaries) = wait_for_plates(&mut plate_task) => {
                session.handle(SessionCommand::PlateBoundariesLoaded(boundaries))?;
            }
        }
    }

    Ok(())
}

fn run_command(session: &mut TerminalSession, command: CliCommand) -> Result<()> {
    match command {
        CliCommand::Session(SessionCommand::SelectEvent(id)) => select_and_report(session, id),
        CliCommand::Session(command) => {
            let rerenders_now = matches!(command, SessionCommand::ChangeThreshold(_));
            session.handle(command)?;
            if rerenders_now {
                print_views(session);
            } else if session.fetch_state().is_loading() {
                println!("Loading earthquakes ({})...", session.range().label());
            }
        }
        CliCommand::List => print_views(session),
        CliCommand::Help => println!("{HELP}"),
        CliCommand::Quit => {}
    }
    Ok(())
}

fn select_and_report(session: &mut TerminalSession, id: EventId) {
    if session.select(&id).is_none() {
        warn!(id = %id, "event is not in the current collection");
        println!("No earthquake with id {id} in the current range.");
    }
}

fn print_views(session: &TerminalSession) {
    println!(
        "{} | minimum magnitude {}",
        session.range().label(),
        session.threshold()
    );
    session.map().print_summary();
    session.list().print();
}

async fn wait_for_plates(task: &mut Option<JoinHandle<Option<Value>>>) -> Option<Value> {
    let Some(handle) = task.as_mut() else {
        return std::future::pending().await;
    };
    let boundaries = handle.await;
    *task = None;
    match boundaries {
        Ok(boundaries) => boundaries,
        Err(err) => {
            warn!("plate boundary task failed: {err}");
            None
        }
    }
}

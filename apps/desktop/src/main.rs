mod commands;
mod screen;

use std::{sync::Arc, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    ApiBase, CalcService, CalculatorSession, ClientError, EvaluationRequest, HttpCalcService,
    Settled, Ticket, DEFAULT_API_BASE,
};
use shared::protocol::{HistoryEntry, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, HELP};

#[derive(Parser, Debug)]
#[command(about = "Terminal keypad for the calculator service")]
struct Args {
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,
    #[arg(
        long,
        default_value_t = DEFAULT_HISTORY_LIMIT,
        value_parser = clap::value_parser!(u32).range(1..=MAX_HISTORY_LIMIT as i64)
    )]
    history_limit: u32,
}

enum AppEvent {
    Line(String),
    Evaluated {
        ticket: Ticket,
        outcome: Result<HistoryEntry, ClientError>,
    },
    InputClosed,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let base = ApiBase::parse(&args.api_base).context("invalid --api-base")?;
    info!(base = base.as_str(), "starting calculator front-end");

    let http = Arc::new(HttpCalcService::new(base));
    let service: Arc<dyn CalcService> = http.clone();
    let mut session = CalculatorSession::new(service).with_history_limit(args.history_limit);

    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_input_reader(tx.clone());

    println!("{HELP}\n");
    session.refresh_history().await;
    screen::print_lines(&screen::history_panel(&session));
    screen::print_lines(&screen::frame_lines(&session, Instant::now()));

    let mut input_closed = false;
    while let Some(event) = rx.recv().await {
        let mut show_history = false;
        match event {
            AppEvent::Line(line) => match Command::parse(&line) {
                Ok(Command::Keys(inputs)) => {
                    for input in inputs {
                        if let Some(request) = session.press(input) {
                            spawn_evaluation(session.service(), request, tx.clone());
                        }
                    }
                }
                Ok(Command::RefreshHistory) => {
                    session.refresh_history().await;
                    show_history = true;
                }
                Ok(Command::ClearHistory) => {
                    show_history = session.clear_history().await;
                }
                Ok(Command::SetBase(raw)) => match ApiBase::parse(&raw) {
                    Ok(base) => {
                        session.set_status(format!("Service: {}", base.as_str()));
                        http.set_base(base).await;
                        show_history = session.refresh_history().await;
                    }
                    Err(err) => session.set_status(format!("Error: {err}")),
                },
                Ok(Command::Help) => println!("{HELP}"),
                Ok(Command::Quit) => break,
                Err(err) => session.set_status(format!("Error: {err}")),
            },
            AppEvent::Evaluated { ticket, outcome } => {
                if let Settled::Applied(_) = session.finish_evaluation(ticket, outcome) {
                    show_history = session.refresh_history().await;
                }
            }
            AppEvent::InputClosed => input_closed = true,
        }

        if show_history {
            screen::print_lines(&screen::history_panel(&session));
        }
        screen::print_lines(&screen::frame_lines(&session, Instant::now()));

        if input_closed && !session.calculator().is_evaluating() {
            break;
        }
    }

    debug!("front-end exiting");
    Ok(())
}

fn spawn_input_reader(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(AppEvent::Line(line)).is_err() {
                        return;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!(%err, "stdin read failed");
                    break;
                }
            }
        }
        let _ = tx.send(AppEvent::InputClosed);
    });
}

fn spawn_evaluation(
    service: Arc<dyn CalcService>,
    request: EvaluationRequest,
    tx: mpsc::UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        let outcome = service.evaluate(&request.to_calc_request()).await;
        let _ = tx.send(AppEvent::Evaluated {
            ticket: request.ticket,
            outcome,
        });
    });
}

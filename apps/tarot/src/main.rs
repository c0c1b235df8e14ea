mod config;
mod render;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use reading_core::{
    HttpReadingBackend, IntentOutcome, MissingReadingBackend, Provenance, ReadingBackend,
    SessionEvent, StageController, SAVE_ACKNOWLEDGEMENT,
};
use shared::domain::{ChatRole, Stage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, normalize_base_url, Settings};

#[derive(Parser, Debug)]
#[command(name = "tarot", about = "Interactive major arcana tarot reading")]
struct Args {
    /// Optional TOML settings file.
    #[arg(long, default_value = "tarot.toml")]
    config: PathBuf,
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Skip the reading service and use local templates only.
    #[arg(long)]
    offline: bool,
    #[arg(long)]
    log_filter: Option<String>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.api_base_url {
            settings.api_base_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.request_timeout_secs = secs;
        }
        if self.offline {
            settings.offline = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    args.apply(&mut settings);

    let filter = match &args.log_filter {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&settings.log_filter))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let backend = connect_backend(&settings).await?;
    let controller = StageController::new(backend)?;
    tokio::spawn(report_progress(controller.clone()));

    run(controller).await
}

async fn connect_backend(settings: &Settings) -> Result<Arc<dyn ReadingBackend>> {
    if settings.offline {
        info!("offline mode; readings use local templates");
        return Ok(Arc::new(MissingReadingBackend));
    }

    let base_url = normalize_base_url(&settings.api_base_url)?;
    let backend = HttpReadingBackend::new(
        base_url.clone(),
        Duration::from_secs(settings.request_timeout_secs),
    )?;
    if backend.health().await {
        info!(%base_url, "reading service is healthy");
    } else {
        warn!(%base_url, "reading service did not answer the health probe; local fallback may be used");
    }
    Ok(Arc::new(backend))
}

/// Prints the waiting indicators while remote calls are in flight.
async fn report_progress(controller: Arc<StageController>) {
    let mut events = controller.subscribe_events();
    loop {
        match events.recv().await {
            Ok(SessionEvent::StageChanged {
                to: Stage::Result, ..
            }) => println!("🔮 AI가 카드를 해석하고 있습니다..."),
            Ok(SessionEvent::ChatAppended(message)) if message.role == ChatRole::User => {
                println!("💭 답변을 준비하고 있습니다...")
            }
            Ok(SessionEvent::InterpretationReady {
                provenance: Provenance::LocalFallback,
            }) => warn!("interpretation produced by local templates"),
            Ok(_) => {}
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "progress reporter lagged behind session events");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn run(controller: Arc<StageController>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}\n", render::COMMAND_HELP);

    loop {
        let snapshot = controller.snapshot().await;
        println!("\n{}", render::render(&snapshot));

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        let outcome = match input.split_once(' ').map_or((input, ""), |(c, rest)| (c, rest.trim())) {
            ("/quit", _) => break,
            ("/back", _) => controller.back().await,
            ("/reset", _) => controller.reset().await,
            ("/category", id) => controller.select_category(id).await,
            ("/save", _) => {
                let outcome = controller.save().await;
                if outcome.is_applied() {
                    println!("{SAVE_ACKNOWLEDGEMENT}");
                }
                outcome
            }
            _ => dispatch_input(&controller, snapshot.stage(), input).await,
        };

        if let IntentOutcome::Ignored(rejection) = outcome {
            println!("⚠️  {rejection}");
        }
    }

    Ok(())
}

async fn dispatch_input(controller: &StageController, stage: Stage, input: &str) -> IntentOutcome {
    match stage {
        Stage::Welcome => controller.start().await,
        Stage::Question => controller.next(input).await,
        Stage::Spread => match render::parse_spread_choice(input) {
            Some(spread) => controller.select_spread(spread).await,
            None => {
                println!("1 또는 2를 입력하세요.");
                IntentOutcome::Applied
            }
        },
        Stage::Shuffle => {
            let snapshot = controller.snapshot().await;
            let picked = input
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| snapshot.deck().get(i));
            match picked {
                Some(card) => controller.select_card(card.id).await,
                None => {
                    println!("1-{} 사이의 번호를 입력하세요.", snapshot.deck().len());
                    IntentOutcome::Applied
                }
            }
        }
        Stage::Result => controller.submit_follow_up(input).await,
    }
}

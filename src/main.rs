use anyhow::{Context, Result};
use clap::Parser;
use fairgo_voice::host::{ConsolePage, ConsoleRecognizer, ConsoleSynthesizer};
use fairgo_voice::{ControllerEvent, Platform, VoiceConfig, VoiceController};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Drive FairGo voice navigation from the terminal: each typed line is a spoken command
#[derive(Parser, Debug)]
#[command(name = "fairgo-voice", version)]
struct Args {
    /// Config file (defaults to <config dir>/fairgo/voice.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the delay before acting on a transcript, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Print controller events as JSON lines
    #[arg(long)]
    json: bool,

    /// Behave like a host without speech synthesis
    #[arg(long)]
    mute: bool,

    /// Behave like a host without speech recognition
    #[arg(long)]
    no_recognition: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fairgo_voice=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = VoiceConfig::load_or_default(args.config.as_deref())
        .context("Failed to load voice config")?;
    if let Some(delay) = args.delay_ms {
        config = config.with_dispatch_delay(Duration::from_millis(delay));
    }

    info!("Starting FairGo voice navigation");

    let recognizer = Arc::new(ConsoleRecognizer::new());
    let mut platform = Platform::new(Arc::new(ConsolePage::new(config.sections.all())));
    if !args.no_recognition {
        platform = platform.with_recognizer(recognizer.clone());
    }
    if !args.mute {
        platform = platform.with_synthesizer(Arc::new(ConsoleSynthesizer));
    }

    let (controller, worker) = VoiceController::new(config, platform)?;
    let worker = worker.start();

    println!("Say (type) a command: \"book ride\", \"show pricing\", \"contact us\", \"go to home\"");

    'sessions: while !recognizer.is_input_closed() {
        if let Err(e) = controller.start_listening() {
            println!("{}", e.user_message());
            break;
        }

        loop {
            let event = controller.recv_event()?;
            if args.json {
                println!("{}", serde_json::to_string(&event)?);
            } else if let Some(status) = controller.status() {
                println!("{}", status);
            }

            match event {
                ControllerEvent::SessionReset { .. } => break,
                ControllerEvent::Notice { message } => {
                    println!("{}", message);
                    break 'sessions;
                }
                ControllerEvent::Shutdown => break 'sessions,
                _ => {}
            }
        }
    }

    controller.shutdown()?;
    let _ = worker.join();
    info!("FairGo voice navigation stopped");
    Ok(())
}

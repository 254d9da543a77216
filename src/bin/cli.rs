//! CLI binary for dost.

use clap::Parser;
use dost::voice::{NullRecognition, NullSynthesis};
use dost::{AppConfig, ChatClient, ChatController, ChatEvent, Persona, Role};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;

/// Dost: voice-enabled multilingual AI chat companion.
#[derive(Parser)]
#[command(name = "dost", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Persona to start with (hinglish, english, hindi).
    #[arg(short, long)]
    persona: Option<Persona>,

    /// Speak replies aloud from the start.
    #[arg(long)]
    speak: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing — suppress noisy dependency logs by default.
    // Users can override with RUST_LOG=debug to see everything.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dost=info,ureq=warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = if let Some(ref path) = cli.config {
        AppConfig::from_file(path)?
    } else {
        let path = AppConfig::default_config_path();
        if path.exists() {
            AppConfig::from_file(&path)?
        } else {
            AppConfig::default()
        }
    };
    if let Some(persona) = cli.persona {
        config.persona = persona;
    }

    // A required-but-unresolvable provider credential halts here, before any
    // conversation state exists.
    let client = Arc::new(ChatClient::new(&config.llm)?);

    let (mut controller, mut recognizer_events) = ChatController::new(
        client,
        &config,
        Arc::new(NullRecognition),
        Arc::new(NullSynthesis),
    );
    if cli.speak && !controller.audio_output_enabled() {
        controller.toggle_audio_output();
    }

    println!(
        "Dost v{} — {} persona",
        env!("CARGO_PKG_VERSION"),
        controller.persona()
    );
    println!("Type a message. Commands: /persona <hinglish|english|hindi>, /audio, /mic, /quit\n");

    // Render model turns and the composing indicator from the event stream so
    // typed and voice-initiated sends display identically.
    let mut events = controller.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ChatEvent::TurnAppended(turn) if turn.role == Role::Model => {
                    println!("dost> {}\n", turn.text);
                }
                ChatEvent::AwaitingReply { active: true } => {
                    println!("dost is typing...");
                }
                ChatEvent::TranscriptCleared => {
                    println!("(conversation reset)");
                }
                _ => {}
            }
        }
    });

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(&mut controller, line.trim()).await {
                    break;
                }
            }
            Some(event) = recognizer_events.recv() => {
                controller.handle_recognizer_event(event).await;
            }
        }
    }

    Ok(())
}

/// Process one input line. Returns `false` to quit.
async fn handle_line(controller: &mut ChatController, line: &str) -> bool {
    match line {
        "" => true,
        "/quit" | "/exit" => false,
        "/audio" => {
            let on = controller.toggle_audio_output();
            println!("audio output {}", if on { "on" } else { "off" });
            true
        }
        "/mic" => {
            controller.press_microphone();
            true
        }
        _ if line.starts_with("/persona") => {
            match line.trim_start_matches("/persona").trim().parse::<Persona>() {
                Ok(persona) => controller.set_persona(persona),
                Err(e) => println!("{e}"),
            }
            true
        }
        _ if line.starts_with('/') => {
            println!("unknown command: {line}");
            true
        }
        text => {
            controller.set_draft(text);
            controller.submit().await;
            true
        }
    }
}

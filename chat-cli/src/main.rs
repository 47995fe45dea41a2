//! chat CLI: seed, page through, send to and clear the local message history.
//! Config from env (`.env` honored) and optional CLI args.

use anyhow::{Context, Result};
use chat_cli::{build_session, Cli, Commands};
use chat_core::{init_tracing, ChatConfig};
use chat_session::{LoadOutcome, MessageStyle, SeedOutcome, SessionController};
use clap::Parser;
use storage::{MessageRecord, MessageStore};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ChatConfig::load().context("Load config from env")?;
    init_tracing(&config.log_file).context("Initialize tracing")?;

    let session = build_session(&config, cli.page_size).await?;
    info!(store = ?config.store_type, page_size = session.snapshot().page_size, "Session ready");

    match cli.command {
        Commands::Seed => handle_seed(&session).await,
        Commands::History { pages } => handle_history(&session, pages).await,
        Commands::Send { text } => handle_send(&session, text).await,
        Commands::Count => {
            let count = session.store().count().await.context("Count messages")?;
            println!("{}", count);
            Ok(())
        }
        Commands::Clear => {
            session.clear_history().await.context("Clear message history")?;
            println!("History cleared.");
            Ok(())
        }
    }
}

async fn handle_seed(session: &SessionController) -> Result<()> {
    match session.ensure_seeded().await {
        SeedOutcome::Seeded(n) => println!("Seeded {} messages.", n),
        SeedOutcome::AlreadySeeded => println!("Store already has messages; nothing to seed."),
        SeedOutcome::Failed(e) => anyhow::bail!("Seeding failed: {}", e),
    }
    Ok(())
}

async fn handle_history(session: &SessionController, pages: usize) -> Result<()> {
    if let LoadOutcome::Failed(e) = session.load_initial().await {
        anyhow::bail!("Loading history failed: {}", e);
    }
    for _ in 1..pages {
        if !session.can_load_more() {
            break;
        }
        if let LoadOutcome::Failed(e) = session.load_more().await {
            anyhow::bail!("Loading older history failed: {}", e);
        }
    }

    let snapshot = session.snapshot();
    if snapshot.messages.is_empty() {
        println!("No messages.");
        return Ok(());
    }

    for message in &snapshot.messages {
        print_message(session, message);
    }
    println!(
        "\n{} of {} message(s) loaded{}",
        snapshot.loaded_count(),
        snapshot.total_count,
        if snapshot.has_more { "; older messages available" } else { "" }
    );
    Ok(())
}

async fn handle_send(session: &SessionController, text: String) -> Result<()> {
    let record = session.send(text).await.context("Send message")?;
    println!("Sent {} at {}", record.id, record.timestamp.format("%Y-%m-%d %H:%M:%S"));
    Ok(())
}

fn print_message(session: &SessionController, message: &MessageRecord) {
    let who = match session.configure_for_message(message) {
        MessageStyle::Outgoing => "me".to_string(),
        MessageStyle::Incoming => message
            .author_display_name
            .clone()
            .unwrap_or_else(|| "them".to_string()),
    };
    let image = message
        .image_ref
        .as_deref()
        .map(|url| format!(" [image: {}]", url))
        .unwrap_or_default();
    println!(
        "{} {:>10}: {}{}",
        message.timestamp.format("%Y-%m-%d %H:%M"),
        who,
        message.text.as_deref().unwrap_or(""),
        image
    );
}

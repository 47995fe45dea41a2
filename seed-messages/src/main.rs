//! Binary: load env, generate the seed history, write JSON to stdout.

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let count = std::env::var("SEED_MESSAGES_COUNT")
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(seed_messages::DEFAULT_SEED_COUNT);
    let messages = seed_messages::generate_messages(count, chrono::Utc::now())?;
    let json = serde_json::to_string_pretty(&messages)?;
    println!("{}", json);
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use fitroom_application::Stylist;
use fitroom_core::keystore::KeyStore;
use fitroom_infrastructure::{FileKeyStore, FitroomPaths, GeminiClient, fetch};
use std::path::PathBuf;
use std::sync::Arc;

mod repl;
mod render;

#[derive(Parser)]
#[command(name = "fitroom")]
#[command(about = "FitRoom - virtual try-on styling from your terminal", long_about = None)]
struct Cli {
    /// Override the data directory (API key, wardrobe file, exports)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// API key for the image service; overrides the stored key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Image model to use instead of the default
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let paths = FitroomPaths::new(cli.data_dir.clone());
    let key_store = FileKeyStore::new(&paths)?;

    let api_key = resolve_api_key(&key_store, cli.api_key).await?;
    let wardrobe = fetch::load_wardrobe(&paths).await?;

    let mut client = GeminiClient::new(api_key.as_str())?;
    if let Some(model) = &cli.model {
        client = client.with_model(model.as_str());
    }
    let stylist = Stylist::new(Arc::new(client));

    repl::run(stylist, wardrobe, paths, key_store, cli.model).await
}

/// Finds the API key: flag/env first, then the stored key, then an
/// interactive prompt. A newly entered key is persisted for later runs.
async fn resolve_api_key(key_store: &FileKeyStore, flag: Option<String>) -> Result<String> {
    if let Some(key) = flag {
        let key = key.trim().to_string();
        if !key.is_empty() {
            key_store.store(&key).await?;
            return Ok(key);
        }
    }

    if let Some(key) = key_store.load().await? {
        return Ok(key);
    }

    println!("{}", "FitRoom needs a Gemini API key to generate images.".bold());
    println!("Get one at https://aistudio.google.com/app/apikey - it is stored locally.");
    let mut editor = rustyline::DefaultEditor::new()?;
    loop {
        let line = editor
            .readline("API key: ")
            .context("no API key provided")?;
        let key = line.trim();
        if key.is_empty() {
            println!("{}", "The key cannot be empty.".red());
            continue;
        }
        key_store.store(key).await?;
        return Ok(key.to_string());
    }
}

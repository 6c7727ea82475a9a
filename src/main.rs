mod advisor;
mod catalog;
mod config;
mod error;
mod llm;
mod translate;
mod web;

#[cfg(test)]
mod test_util;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info};

use crate::advisor::Advisor;
use crate::catalog::FormOptions;
use crate::config::Config;
use crate::web::AppState;

#[tokio::main]
async fn main() {
    // Load .env file (if present) before anything reads env vars
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    if args.iter().any(|a| a == "--default-config") {
        print!("{}", Config::default_config_contents());
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from);

    let config = match Config::load(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!("failed to load config: {e}");
            std::process::exit(1);
        }
    };

    if args.iter().any(|a| a == "--check") {
        run_checks(&config);
        return;
    }

    // The credential is read once; without it nothing can be served.
    let api_key = match Config::gemini_api_key() {
        Ok(k) => k,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    info!(
        bind = %config.bind,
        model = %config.llm.model,
        prompt_style = ?config.form.prompt_style,
        "ecofertil starting"
    );

    let llm = match llm::build_backend(&config, api_key) {
        Ok(b) => b,
        Err(e) => {
            error!("failed to initialize LLM backend: {e}");
            std::process::exit(1);
        }
    };

    let translator = match translate::build_translator(&config) {
        Ok(t) => t,
        Err(e) => {
            error!("failed to initialize translator: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState {
        advisor: Arc::new(Advisor::new(&config, llm, translator)),
        options: Arc::new(FormOptions::from_config(&config)),
    };

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let server_handle = {
        let bind = config.bind.clone();
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) = web::serve(&bind, state, shutdown_rx).await {
                error!("web server error: {e}");
                std::process::exit(1);
            }
        })
    };

    info!("ecofertil is running, press Ctrl+C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl+c: {e}");
    }

    info!("shutdown signal received, stopping...");
    let _ = shutdown_tx.send(());
    let _ = server_handle.await;
    info!("ecofertil stopped");
}

fn run_checks(config: &Config) {
    info!("running pre-flight checks...");

    info!("config: OK");
    info!("  bind: {}", config.bind);
    info!("  model: {}", config.llm.model);
    info!("  llm base_url: {}", config.llm.base_url);
    info!(
        "  sampling: temperature={} top_p={} top_k={} max_output_tokens={}",
        config.llm.temperature, config.llm.top_p, config.llm.top_k, config.llm.max_output_tokens
    );
    info!("  translate base_url: {}", config.translate.base_url);
    info!("  default_language: {}", config.translate.default_language);
    info!("  prompt_style: {:?}", config.form.prompt_style);

    if catalog::find_language(&config.translate.default_language).is_none() {
        error!(
            "default_language \"{}\" is not one of the offered languages",
            config.translate.default_language
        );
    }

    match Config::gemini_api_key() {
        Ok(_) => info!("GEMINI_API_KEY: set"),
        Err(_) => error!("GEMINI_API_KEY: NOT SET (required)"),
    }
}

fn print_usage() {
    println!(
        "ecofertil: sustainable farming & fertilizer recommendation form

USAGE:
    ecofertil [OPTIONS]

OPTIONS:
    --config <PATH>     Path to config file (default: ~/.config/ecofertil/config.toml)
    --default-config    Print default config to stdout and exit
    --check             Validate config and credentials, then exit
    -h, --help          Print this help message

ENVIRONMENT:
    GEMINI_API_KEY        Required. Google AI Studio API key.
    GEMINI_MODEL          Override llm.model
    GEMINI_BASE_URL       Override llm.base_url
    TRANSLATE_BASE_URL    Override translate.base_url
    ECOFERTIL_BIND        Override bind address
    RUST_LOG              Optional. Tracing filter (default: info).
"
    );
}

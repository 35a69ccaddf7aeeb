//! EcoFit filter extraction HTTP server binary

use ecofit_filters::{EngineConfig, FilterEngine};

mod server {
    pub use ecofit_filters::server::*;
}

const DEFAULT_PORT: u16 = 8081;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    println!("EcoFit Filter Assistant");
    println!("   Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    // --keyword-only ignores any configured API key
    let keyword_only = std::env::args().any(|arg| arg == "--keyword-only");

    let engine = if keyword_only {
        println!("✓ Mode: keyword extraction only");
        FilterEngine::local_only()
    } else {
        let config = EngineConfig::from_env();
        if config.remote_enabled() {
            println!("✓ Mode: remote extraction ({}) with keyword fallback", config.model);
            println!("✓ Completion endpoint: {}", config.base_url);
            println!("✓ Timeout: {:?}", config.timeout);
        } else {
            println!("✓ Mode: keyword extraction only");
            println!("   (set GEMINI_API_KEY to enable remote extraction)");
        }
        FilterEngine::new(&config)
    };

    let port = match std::env::var("PORT") {
        Ok(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
            eprintln!("⚠️  Ignoring invalid PORT value '{}'", raw);
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    };

    println!("✓ Filter engine initialized");
    println!("✓ Starting HTTP server on port {}...", port);
    println!();

    server::run_server(engine, port).await?;

    Ok(())
}

use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::sleep;

use mediabot::catalog::{MovieCatalog, TmdbClient};
use mediabot::cli::{Cli, Commands};
use mediabot::core::config::{self, Config};
use mediabot::core::{init_logger, log_cookies_configuration};
use mediabot::download::cookies::prepare_cookies;
use mediabot::download::{resolve_quality, DownloadRequest, PhotoPostClient, Quality, YtDlp};
use mediabot::storage::{MemoryLinkStore, MemorySearchStore};
use mediabot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Log panics from handler tasks instead of losing them on stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Load environment variables from .env if present
    let _ = dotenv();
    let config = Config::from_env()?;

    // Initialize logger (console + file)
    init_logger(&config.log_file_path)?;

    match cli.command {
        Some(Commands::Run) | None => {
            log::info!("Running bot in long polling mode");
            run_bot(config).await
        }
        Some(Commands::Info { url, json }) => run_cli_info(&config, &url, json).await,
        Some(Commands::Download { url, quality }) => run_cli_download(&config, &url, &quality).await,
        Some(Commands::Movie { query }) => run_cli_movie(&config, &query.join(" ")).await,
    }
}

/// Creates the download directory and the yt-dlp adapter with resolved cookies.
fn build_ytdlp(config: &Config) -> Result<YtDlp> {
    std::fs::create_dir_all(&config.ytdlp.download_dir).map_err(|e| {
        anyhow::anyhow!(
            "Failed to create download directory {}: {}",
            config.ytdlp.download_dir.display(),
            e
        )
    })?;
    let cookies = prepare_cookies(&config.ytdlp.cookies, &config.ytdlp.download_dir)?;
    Ok(YtDlp::new(config.ytdlp.clone(), cookies))
}

/// Run CLI info command
async fn run_cli_info(config: &Config, url: &str, json: bool) -> Result<()> {
    let ytdlp = build_ytdlp(config)?;

    if json {
        let value = ytdlp.fetch_metadata_json(url).await?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let info = ytdlp.fetch_metadata(url).await?;
    println!("ID:        {}", info.id);
    println!("Title:     {}", info.title);
    println!("Duration:  {}", info.duration_label.as_deref().unwrap_or("unknown"));
    println!("Thumbnail: {}", info.thumbnail_url.as_deref().unwrap_or("-"));
    let heights: Vec<String> = info.available_heights.iter().map(|h| format!("{}p", h)).collect();
    println!("Heights:   {}", heights.join(", "));
    Ok(())
}

/// Run CLI download command
async fn run_cli_download(config: &Config, url: &str, quality: &str) -> Result<()> {
    let quality = Quality::parse(quality)
        .ok_or_else(|| anyhow::anyhow!("Unsupported quality: {}. Use 720, 480, 360, best or mp3.", quality))?;
    let ytdlp = build_ytdlp(config)?;

    println!("URL: {}", url);
    let info = ytdlp.fetch_metadata(url).await?;
    println!("Title: {}", info.title);

    let resolved = resolve_quality(quality, &info.available_heights);
    if resolved.is_adjusted() {
        println!("{} is not available, using {}", quality, resolved.label());
    }

    let request = DownloadRequest {
        url,
        quality,
        title: &info.title,
        content_id: &info.id,
        available_heights: &info.available_heights,
    };
    let file = ytdlp.download(&request).await?;
    println!("Saved {} ({} bytes)", file.path.display(), file.size_bytes);
    Ok(())
}

/// Run CLI movie search command
async fn run_cli_movie(config: &Config, query: &str) -> Result<()> {
    let catalog = TmdbClient::new(config.tmdb.clone())?;
    let items = catalog.search(query).await?;

    if items.is_empty() {
        println!("Nothing found for {:?}", query);
        return Ok(());
    }
    for (i, movie) in items.iter().enumerate() {
        println!("{}. {} ({}) ⭐ {}", i + 1, movie.title, movie.year, movie.rating);
        if let Some(poster) = &movie.poster_url {
            println!("   {}", poster);
        }
    }
    Ok(())
}

/// Starts the bot in long polling mode
async fn run_bot(config: Config) -> Result<()> {
    let bot_init_start = std::time::Instant::now();
    log::info!("Starting bot...");

    // Log cookies configuration at startup
    log_cookies_configuration(&config.ytdlp);

    let ytdlp = build_ytdlp(&config)?;
    match ytdlp.version().await {
        Ok(version) => log::info!("yt-dlp version: {}", version),
        Err(e) => log::warn!("Failed to check yt-dlp version: {}. Continuing anyway.", e),
    }

    // Create bot instance
    let bot = create_bot(&config)?;

    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    // Retry if Bot API is still initializing (returns "restart" error)
    let bot_info = {
        let startup_max_retries = config::retry::STARTUP_MAX_RETRIES;
        let mut startup_retry = 0;
        loop {
            match bot.get_me().await {
                Ok(info) => break info,
                Err(e) => {
                    let err_str = e.to_string();
                    let is_retryable = err_str.contains("restart")
                        || err_str.contains("network")
                        || err_str.contains("connection")
                        || err_str.contains("timed out")
                        || err_str.contains("Connection refused");

                    startup_retry += 1;
                    if startup_retry >= startup_max_retries || !is_retryable {
                        return Err(anyhow::anyhow!(
                            "Failed to connect to Bot API after {} retries: {}",
                            startup_retry,
                            e
                        ));
                    }

                    log::warn!(
                        "Bot API not ready (attempt {}/{}): {}. Retrying in 5 seconds...",
                        startup_retry,
                        startup_max_retries,
                        err_str
                    );
                    sleep(Duration::from_secs(5)).await;
                }
            }
        }
    };
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username.as_deref(), bot_info.id);

    // Set up bot commands for all languages
    setup_bot_commands(&bot).await?;

    if config.tmdb.api_key.is_none() {
        log::warn!("TMDB_API_KEY is not set; /movie will reply with a configuration error");
    }
    let catalog = Arc::new(TmdbClient::new(config.tmdb.clone())?);

    let handler_deps = HandlerDeps::new(
        Arc::new(ytdlp),
        Arc::new(PhotoPostClient::new()?),
        Arc::new(MemoryLinkStore::new(config::stores::ttl())),
        Arc::new(MemorySearchStore::new(config::stores::ttl())),
        catalog,
    );

    // Create the dispatcher handler tree using the modular schema
    let handler = schema(handler_deps);

    log::info!("================================================");
    log::info!(
        "🎉 Bot initialization complete in {:.2}s",
        bot_init_start.elapsed().as_secs_f64()
    );
    log::info!("📡 Ready to receive updates!");
    log::info!("================================================");

    // Run the dispatcher with retry logic
    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // A separate task isolates dispatcher panics; they surface through the JoinHandle
        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            // Create polling listener that drops pending updates on start
            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    log::error!("Dispatcher panicked: {}", join_err);

                    if retry_count < max_retries {
                        retry_count += 1;
                        log::info!(
                            "Retrying dispatcher connection after panic (attempt {}/{})...",
                            retry_count,
                            max_retries
                        );
                        exponential_backoff(retry_count).await;
                    } else {
                        log::error!("Max retries reached after panic. Exiting...");
                        break;
                    }
                } else {
                    log::warn!("Dispatcher task was cancelled: {}", join_err);
                    break;
                }
            }
        }

        // Add a delay between retries to avoid overwhelming the API
        if retry_count > 0 {
            sleep(config::retry::dispatcher_delay()).await;
        }
    }

    Ok(())
}

async fn exponential_backoff(retry_count: u32) {
    let delay = Duration::from_secs(config::retry::EXPONENTIAL_BACKOFF_BASE.pow(retry_count));
    sleep(delay).await;
}

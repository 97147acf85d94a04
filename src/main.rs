use anyhow::Context;
use ayat_bot::adapters::{run_console, ConsoleSender};
use ayat_bot::core::format::{lookup_message, not_found_message};
use ayat_bot::core::{ConfigProvider, MessageSender};
use ayat_bot::utils::{logger, validation::Validate};
use ayat_bot::{
    AppConfig, BroadcastScheduler, CliArgs, Dispatcher, Mode, SubscriberRegistry, Translator,
    VerseCache, VerseFetcher, VerseReference,
};
use clap::Parser;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    logger::init_logger(args.verbose, args.json_logs);
    tracing::info!("🚀 Starting ayat-bot");

    let mut config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    args.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    let cache = Arc::new(VerseCache::new());
    let fetcher = Arc::new(
        VerseFetcher::from_config(&config, cache).context("failed to set up the verse fetcher")?,
    );

    match args.mode.clone().unwrap_or(Mode::Serve) {
        Mode::Lookup {
            reference,
            translator,
            json,
        } => lookup(&fetcher, &config, &reference, translator, json).await,
        Mode::Serve => {
            serve(fetcher, &config).await;
            // tokio's stdin reads on a blocking thread that the runtime would wait for on drop
            std::process::exit(0);
        }
    }
}

async fn lookup(
    fetcher: &VerseFetcher,
    config: &AppConfig,
    input: &str,
    translator: Option<Translator>,
    json: bool,
) -> anyhow::Result<()> {
    let default_translator = translator.unwrap_or_else(|| config.default_translator());
    let reference = VerseReference::parse_with_default(input, default_translator)?;

    let Some(record) = fetcher.resolve(&reference).await else {
        eprintln!("{}", not_found_message(&reference));
        std::process::exit(2);
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&*record).context("failed to encode the verse")?
        );
    } else {
        println!("{}", lookup_message(&reference, &record));
    }
    Ok(())
}

async fn serve(fetcher: Arc<VerseFetcher>, config: &AppConfig) {
    let registry = Arc::new(SubscriberRegistry::new());
    let sender: Arc<dyn MessageSender> = Arc::new(ConsoleSender::stdout());
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&fetcher),
        Arc::clone(&registry),
        config.default_translator(),
    ));

    let broadcast = if config.broadcast.enabled {
        let scheduler = BroadcastScheduler::new(
            fetcher,
            registry,
            Arc::clone(&sender),
            &config.broadcast_config(),
        );
        Some(scheduler.spawn())
    } else {
        tracing::info!("Broadcast disabled");
        None
    };

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("🛑 Interrupt received");
                cancel.cancel();
            }
        })
    };

    tracing::info!("💬 Reading commands from stdin (`[chat_id] text` per line)");
    run_console(
        BufReader::new(tokio::io::stdin()),
        dispatcher,
        sender,
        config.console.default_chat_id,
        cancel.clone(),
    )
    .await;

    if let Some(handle) = broadcast {
        if !cancel.is_cancelled() {
            tracing::info!("Console closed, broadcasting until interrupted");
            cancel.cancelled().await;
        }
        handle.shutdown().await;
    }
    ctrl_c.abort();

    tracing::info!("✅ ayat-bot stopped");
}

use clap::Parser;
use lineup_playlist::utils::logger;
use lineup_playlist::utils::progress::ConsoleReporter;
use lineup_playlist::{
    CliArgs, HtmlLineupSource, PipelineError, PlaylistEngine, Settings, SpotifyAuth, SpotifyClient,
};

async fn run(settings: Settings, quiet: bool) -> Result<(), PipelineError> {
    let lineup = HtmlLineupSource::new(&settings.lineup)?;
    let auth = SpotifyAuth::new(&settings.endpoints.accounts_base, settings.credentials.clone())?;
    let token = auth.authorize_interactive().await?;
    let spotify = SpotifyClient::new(&settings.endpoints.api_base, token.access_token)?;

    if !quiet {
        println!("🎸 Lineup source: {}", lineup.url());
    }

    let engine = PlaylistEngine::new(lineup, spotify, settings.playlist.clone(), settings.run)
        .with_observer(ConsoleReporter::new(quiet));
    let summary = engine.run().await?;

    tracing::info!("Run summary: {:?}", summary);
    if !quiet {
        println!(
            "📀 {} of {} artists found, {} tracks written to {}",
            summary.artists_resolved, summary.artists_found, summary.tracks_written, settings.playlist
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose, args.quiet);
    }

    // Configuration problems are reported before any network call.
    let settings = match args.to_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = run(settings, args.quiet).await {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    println!("✅ Done!");
    Ok(())
}

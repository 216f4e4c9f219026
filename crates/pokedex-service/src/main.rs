use clap::Parser;
use pokedex_core::{DexAction, LeaderboardView, PlayerId, UpdateRequest};
use pokedex_logging::{DexSubscriberBuilder, PlayerContextGuard};
use pokedex_service::{Cli, Command, DexService, ServiceConfig, TargetArgs, open_store};
use serde::Serialize;
use tracing::{Instrument, Span};

fn update_request(target: TargetArgs, action: DexAction) -> UpdateRequest {
    UpdateRequest {
        region: target.region,
        regional_id: target.regional_id,
        global_id: target.global_id,
        action: action.as_str().to_string(),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(service: &DexService, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Register { player } => {
            print_json(&service.register_player(PlayerId(player)).await?)?;
        }

        Command::Catch { player, target } => {
            let request = update_request(target, DexAction::Catch);
            print_json(&service.update(PlayerId(player), &request).await?)?;
        }

        Command::See { player, target } => {
            let request = update_request(target, DexAction::See);
            print_json(&service.update(PlayerId(player), &request).await?)?;
        }

        Command::Summary { player } => {
            print_json(&service.summary(PlayerId(player)).await?)?;
        }

        Command::Region { player, region } => {
            print_json(&service.fetch_regional_record(PlayerId(player), &region).await?)?;
        }

        Command::Leaderboard { public } => {
            let view = if public {
                LeaderboardView::Public
            } else {
                LeaderboardView::Gameplay
            };
            print_json(&service.leaderboard(view).await?)?;
        }

        Command::Popularity { global_id } => {
            print_json(&service.entry_popularity(global_id).await?)?;
        }

        Command::Analytics => {
            print_json(&service.analytics().await?)?;
        }

        Command::Regions => {
            print_json(&service.regions())?;
        }
    }

    Ok(())
}

// Single-threaded so the thread-local player context stays with the command
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    }
    .apply_overrides(&cli);

    let _log_guard = DexSubscriberBuilder::new()
        .with_config(config.log_config())
        .init();

    let store = open_store(&config)?;
    let service: DexService = DexService::with_config(store, &config);

    let player_ctx = cli
        .command
        .player()
        .map(|player| PlayerContextGuard::new(PlayerId(player)));
    let span = player_ctx
        .as_ref()
        .map_or_else(Span::none, PlayerContextGuard::span);

    run(&service, cli.command).instrument(span).await
}

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tilawa::app::AppContext;
use tilawa::cli::commands::{self, ReadOptions};
use tilawa::cli::{Cli, Commands, KhatmahAction, SettingsAction};
use tilawa::config::Config;
use tilawa::domain::UnitKind;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(workers) = cli.workers {
        config.download.workers = workers;
    }

    let ctx = AppContext::new(cli.db, config)?;
    commands::welcome(&ctx).await?;

    match cli.command {
        Commands::Surahs { refresh } => {
            commands::list_surahs(&ctx, refresh).await?;
        }
        Commands::Search { query, azkar } => {
            commands::search(&ctx, &query, azkar).await?;
        }
        Commands::Read {
            unit,
            number,
            from,
            resume,
            scroll,
            height,
            limit,
        } => {
            let opts = ReadOptions {
                from,
                resume,
                scroll,
                height,
                limit,
            };
            commands::read_unit(&ctx, unit.into(), number, opts).await?;
        }
        Commands::LastRead => {
            commands::show_last_read(&ctx).await?;
        }
        Commands::Khatmah { action } => match action {
            KhatmahAction::Status => commands::khatmah_status(&ctx).await?,
            KhatmahAction::Toggle { surah } => commands::khatmah_toggle(&ctx, surah).await?,
            KhatmahAction::Reset => commands::khatmah_reset(&ctx).await?,
        },
        Commands::Azkar { category, count } => {
            commands::azkar(&ctx, category.as_deref(), count).await?;
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::show_settings(&ctx).await?,
            SettingsAction::Set { key, value } => {
                commands::set_setting(&ctx, &key, &value).await?
            }
            SettingsAction::Reset => commands::reset_settings(&ctx).await?,
        },
        Commands::Theme { name } => {
            commands::theme(&ctx, name.as_deref()).await?;
        }
        Commands::Download { juz } => {
            let kind = if juz { UnitKind::Juz } else { UnitKind::Surah };
            commands::download(&ctx, kind).await?;
        }
        Commands::Cached => {
            commands::show_cached(&ctx).await?;
        }
        Commands::Wipe { yes } => {
            commands::wipe(&ctx, yes).await?;
        }
    }

    Ok(())
}

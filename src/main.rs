use anyhow::Result;
use clap::{Parser, Subcommand};
use i18n_embed_fl::fl;
use marketprefs::{
    i18n::{FluentLocaleSwitcher, LANGUAGES, LANGUAGE_LOADER},
    FileStorage, PreferenceConfig, PreferenceProvider, Theme,
};
use std::{path::PathBuf, sync::Arc};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// JSON file overriding the storage keys and retention policies
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "marketprefs.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List bundled translations
    Languages,
    SetLanguage {
        code: String,
    },
    Show,
    ToggleTheme,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PreferenceConfig::load(path)?,
        None => PreferenceConfig::default(),
    };

    let storage = Arc::new(FileStorage::open(&cli.store));

    let provider = PreferenceProvider::new(config, storage, Arc::new(FluentLocaleSwitcher::new()));

    match cli.command {
        Command::Languages => {
            println!("{}", fl!(LANGUAGE_LOADER, "available-languages"));

            let current = provider.preferences().language;
            for language in LANGUAGES {
                let marker = if language.id == current.as_str() { "*" } else { " " };

                println!("{} {:<3} {}", marker, language.id, language.label);
            }
        }
        Command::SetLanguage { code } => {
            provider.locale_store().set_language(code);

            let language = provider.preferences().language.to_string();
            println!("{}", fl!(LANGUAGE_LOADER, "language-changed", language = language));
        }
        Command::Show => {
            let preferences = provider.preferences();

            println!(
                "{}",
                fl!(LANGUAGE_LOADER, "current-theme", theme = theme_label(preferences.theme))
            );
            println!(
                "{}",
                fl!(
                    LANGUAGE_LOADER,
                    "current-language",
                    language = preferences.language.to_string()
                )
            );
        }
        Command::ToggleTheme => {
            let theme = provider.theme_store().toggle_theme();

            println!("{}", fl!(LANGUAGE_LOADER, "theme-toggled", theme = theme_label(theme)));
        }
    }

    Ok(())
}

fn theme_label(theme: Theme) -> String {
    match theme {
        Theme::Light => fl!(LANGUAGE_LOADER, "theme-light"),
        Theme::Dark => fl!(LANGUAGE_LOADER, "theme-dark"),
    }
}

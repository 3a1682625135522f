//! # ovl
//!
//! Drive an overlay session from the command line.
//!
//! ```bash
//! # List fonts from the catalog (built-in families if it is down)
//! ovl fonts
//!
//! # Ask the AI service for overlays and write the merged session
//! ovl generate session.json --out session.ai.json
//!
//! # Composite every element and print the final image URL
//! ovl --config ovl.json export session.json
//! ```
//!
//! A session file is `{ image_url, image_width, image_height, elements?,
//! campaign? }`. The config file holds optional `editor` and `services`
//! sections; `OVL_API_BASE` and `OVL_FONT_CSS_BASE` override the latter.

use clap::{Parser, Subcommand};
use ovl_client::{
    ClientError, FontLoader, HttpServices, ServiceConfig, export_session, generate_overlays, load_catalog,
};
use ovl_editor::{EditorConfig, EditorSession, SessionInput};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overlay Studio command-line tool
#[derive(Parser, Debug)]
#[command(name = "ovl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config with optional `editor` and `services` sections
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the font catalog
    Fonts {
        /// Also register each family's stylesheet and report its status
        #[arg(long)]
        check: bool,
    },

    /// Generate AI overlays for a session and merge them in
    Generate {
        session: PathBuf,

        /// Where to write the merged session (stdout if omitted)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Composite all elements onto the image
    Export { session: PathBuf },
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CliConfig {
    editor: EditorConfig,
    services: ServiceConfig,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ClientError> {
    let text = std::fs::read_to_string(path).map_err(|e| ClientError::Config(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| ClientError::Config(format!("{}: {e}", path.display())))
}

fn load_config(path: Option<&Path>) -> Result<CliConfig, ClientError> {
    let mut config = match path {
        Some(path) => read_json::<CliConfig>(path)?,
        None => CliConfig::default(),
    };
    config.editor.validate()?;
    config.services = config.services.with_env();
    Ok(config)
}

fn open_session(path: &Path, config: &CliConfig) -> Result<EditorSession, ClientError> {
    let input: SessionInput = read_json(path)?;
    Ok(EditorSession::new(input, config.editor.clone()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ClientError> {
    serde_json::to_string_pretty(value).map_err(|e| ClientError::Config(e.to_string()))
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    let config = load_config(cli.config.as_deref())?;
    let services = HttpServices::new(config.services.clone())?;

    match cli.command {
        Commands::Fonts { check } => {
            let fonts = load_catalog(&services).await;
            if check {
                let loader = FontLoader::new(services.clone(), config.services.font_css_base.clone());
                for font in &fonts {
                    let status = loader.ensure(&font.family).await;
                    println!("{}\t{}\t{:?}", font.family, font.display, status);
                }
            } else {
                for font in &fonts {
                    println!("{}\t{}", font.family, font.display);
                }
            }
        }

        Commands::Generate { session, out } => {
            let mut editor = open_session(&session, &config)?;
            let ids = generate_overlays(&mut editor, &services).await?;
            log::info!("added {} generated elements", ids.len());

            let mut merged: SessionInput = read_json(&session)?;
            merged.elements = editor.elements().to_vec();
            let json = to_json(&merged)?;
            match out {
                Some(path) => std::fs::write(&path, json)
                    .map_err(|e| ClientError::Config(format!("{}: {e}", path.display())))?,
                None => println!("{json}"),
            }
        }

        Commands::Export { session } => {
            let mut editor = open_session(&session, &config)?;
            let loader = FontLoader::new(services.clone(), config.services.font_css_base.clone());
            loader.ensure_all(editor.elements()).await;

            export_session(&mut editor, &services, &services, |url, elements| {
                log::info!("export finished with {} elements", elements.len());
                println!("{url}");
            })
            .await?;
        }
    }
    Ok(())
}

//! Command-line surface.
//!
//! Thin wrappers only: every command resolves inputs, calls into the
//! library, and prints the result.

use crate::config::{self, Settings};
use crate::delivery::{ClipboardSink, DeliveryReceipt, FigmaSink};
use crate::error::ExportError;
use crate::export::{Exporter, RetryPolicy};
use crate::geometry::Canvas;
use crate::render::{figma, svg};
use crate::synth::synthesize;
use crate::vision::DetectionFile;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "figsnap", version, about = "Screenshot detections to SVG or Figma nodes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render detections to SVG or Figma JSON without delivering them
    Render(RenderArgs),
    /// Run the full export pipeline to the clipboard or Figma
    Export(ExportArgs),
    /// Inspect or update stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Screenshot the detections were made against
    pub image: PathBuf,
    /// Detections JSON produced by the vision helper
    #[arg(long, short)]
    pub detections: PathBuf,
    #[arg(long, value_enum, default_value_t = RenderFormat::Svg)]
    pub format: RenderFormat,
    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Document name for Figma output (defaults to a timestamp)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    pub image: PathBuf,
    #[arg(long, short)]
    pub detections: PathBuf,
    #[arg(long, value_enum)]
    pub to: Target,
    #[arg(long)]
    pub file_key: Option<String>,
    #[arg(long)]
    pub token: Option<String>,
    /// Total delivery attempts for transient failures
    #[arg(long)]
    pub attempts: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved settings (token masked)
    Show,
    /// Store the Figma token in the OS keychain
    SetToken { token: String },
    /// Store the target Figma file key in the settings file
    SetFileKey { file_key: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Svg,
    Figma,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Clipboard,
    Figma,
}

/// Execute a parsed command. Errors are returned as display strings.
pub fn execute(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Render(args) => render(args),
        Commands::Export(args) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|e| format!("Failed to start async runtime: {}", e))?;
            runtime.block_on(export(args))
        }
        Commands::Config { action } => configure(action),
    }
}

fn render(args: RenderArgs) -> Result<(), String> {
    let canvas = Canvas::from_image_path(&args.image).map_err(|e| e.to_string())?;
    let regions = DetectionFile::new(&args.detections).load()?.into_regions();
    let elements = synthesize(&regions, &canvas);

    let output = match args.format {
        RenderFormat::Svg => svg::render(&canvas, &elements),
        RenderFormat::Figma => {
            let name = args
                .name
                .unwrap_or_else(|| figma::export_name(chrono::Utc::now()));
            figma::render(&canvas, &elements, &name).map_err(|e| e.to_string())?
        }
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, &output)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            log::info!("[CLI] Wrote {} elements to {}", elements.len(), path.display());
        }
        None => print!("{}", output),
    }
    Ok(())
}

async fn export(args: ExportArgs) -> Result<(), String> {
    let mut settings = Settings::load();
    if args.file_key.is_some() {
        settings.file_key = args.file_key;
    }
    if args.token.is_some() {
        settings.token = args.token;
    }

    let retry = RetryPolicy {
        max_attempts: args.attempts.or(settings.max_attempts).unwrap_or(1),
        backoff: settings
            .retry_backoff_ms
            .map(Duration::from_millis)
            .unwrap_or(RetryPolicy::default().backoff),
    };
    let exporter = Arc::new(
        Exporter::new()
            .with_retry(retry)
            .with_observer(|status| eprintln!("[figsnap] {:?}", status)),
    );

    let canceller = exporter.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    let image = match image::open(&args.image) {
        Ok(img) => Some(img),
        Err(e) => {
            log::warn!("[CLI] Cannot open {}: {}", args.image.display(), e);
            None
        }
    };
    let analyzer = DetectionFile::new(&args.detections);

    let result: Result<DeliveryReceipt, ExportError> = match args.to {
        Target::Clipboard => {
            exporter
                .export_image(image.as_ref(), &analyzer, &ClipboardSink::new())
                .await
        }
        Target::Figma => {
            let sink = FigmaSink::new(settings.figma_config()).map_err(|e| e.to_string())?;
            exporter.export_image(image.as_ref(), &analyzer, &sink).await
        }
    };

    let receipt = result.map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&receipt).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn configure(action: ConfigAction) -> Result<(), String> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load();
            let masked = Settings {
                token: settings.token.as_deref().map(mask_token),
                ..settings
            };
            println!("# {}", config::config_path().display());
            let json = serde_json::to_string_pretty(&masked).map_err(|e| e.to_string())?;
            println!("{}", json);
            Ok(())
        }
        ConfigAction::SetToken { token } => config::save_keychain_token(&token),
        ConfigAction::SetFileKey { file_key } => {
            let path = config::config_path();
            let mut settings = Settings::load_from(&path);
            settings.file_key = Some(file_key);
            settings.save_to(&path)
        }
    }
}

/// Keep only the last four characters visible.
fn mask_token(token: &str) -> String {
    let visible: String = token
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{}", visible)
}

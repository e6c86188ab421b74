//! `endtag` entrypoint: scan one file and print its end tags.
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use endtag_clike::{CLikeHost, Language};
use endtag_core::options::load_from;
use endtag_core::{EndTagOptions, EndTagView, Region, TextSnapshot, jump_target, scan};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "endtag", version, about = "Print the end tags of a C-family source file")]
struct Args {
    /// Source file to scan.
    pub path: PathBuf,
    /// Optional options file path (overrides discovery of `endtag.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Language override: cs, java, js or c. Defaults to the file extension.
    #[arg(long = "language")]
    pub language: Option<String>,
    /// Also tag blocks whose header is on the closing-brace line.
    #[arg(long = "all")]
    pub all: bool,
}

fn configure_logging() {
    // Ignore the error: a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn host_for(args: &Args) -> Result<CLikeHost> {
    if let Some(name) = args.language.as_deref() {
        let language = Language::from_extension(name)
            .ok_or_else(|| anyhow!("unknown language `{name}`"))?;
        return Ok(CLikeHost::new(language)?);
    }
    CLikeHost::for_path(&args.path)
        .ok_or_else(|| {
            anyhow!(
                "cannot infer a language for {}; pass --language",
                args.path.display()
            )
        })?
        .map_err(Into::into)
}

/// One output line: `<closing line>: <tag> (-> <header line>)`, lines one-based.
fn format_region(region: &Region, snapshot: &dyn TextSnapshot, options: &EndTagOptions) -> String {
    let view = EndTagView::new(region, options);
    let tag = match (view.icon, view.text) {
        (Some(icon), Some(text)) => format!("[{}] {text}", icon.name()),
        (Some(icon), None) => format!("[{}]", icon.name()),
        (None, Some(text)) => text,
        (None, None) => view.tooltip,
    };
    let close_line = snapshot.line_of(region.close_brace()) + 1;
    let target = jump_target(region, snapshot);
    format!("{close_line}: {tag} (-> {})", target.line + 1)
}

fn main() -> Result<()> {
    configure_logging();
    let args = Args::parse();

    let mut options = load_from(args.config.clone());
    if args.all {
        options.update(|o| o.skip_same_line = false);
    }
    let host = host_for(&args)?;
    if !options.is_language_enabled(host.content_type()) {
        info!(target: "endtag.cli", language = host.content_type(), "language_disabled");
        return Ok(());
    }

    let text = std::fs::read_to_string(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;
    let services = host.services(&text, 1);
    let generation = scan(&services, &options, &CancellationToken::new())?;
    info!(
        target: "endtag.cli",
        path = %args.path.display(),
        regions = generation.len(),
        "scan_finished"
    );

    for region in generation.regions() {
        println!("{}", format_region(region, services.snapshot.as_ref(), &options));
    }
    Ok(())
}

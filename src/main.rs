// Permalink preview
//
// Loads options from a JSON option file and prints what each given URL
// becomes on the public site. Mirrors the settings page's "test URL" button:
// previews run through the testing entry point, so they show real output
// even when the stored settings would only apply to public requests.
//
// With --content, HTML is read from stdin and printed as a rewritten content
// block for a public request.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use permalink_domain::{EngineConfig, JsonFileBackend, RequestSignals, Site};

#[derive(Parser, Debug)]
#[command(name = "permalink-preview")]
#[command(about = "Preview how stored permalink settings rewrite public URLs")]
struct Args {
    /// JSON option file ({"site": {...}, "network": {...}})
    options_path: PathBuf,

    /// Canonical URL of the site
    site_url: String,

    /// Installation runs in network (multisite) mode
    #[arg(long)]
    network: bool,

    /// Read HTML from stdin and print it as a rewritten content block
    #[arg(long)]
    content: bool,

    /// URLs to preview
    urls: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let config = EngineConfig::builder()
        .site_url(&args.site_url)
        .network_mode(args.network)
        .build()?;
    let site = Site::new(config, Arc::new(JsonFileBackend::new(&args.options_path)));

    let transformer = site.begin_request(RequestSignals::public());
    let settings = transformer.resolver().resolve();
    log::info!(
        "Effective domain '{}' ({:?}), relative URLs {} ({:?})",
        settings.domain.domain,
        settings.domain.source,
        settings.relative.enabled,
        settings.relative.source
    );

    if args.content {
        let mut html = String::new();
        std::io::stdin()
            .read_to_string(&mut html)
            .context("Failed to read HTML from stdin")?;
        print!("{}", transformer.transform_content_block(&html));
        return Ok(());
    }

    if args.urls.is_empty() {
        bail!("no URLs given");
    }

    for url in &args.urls {
        println!("{url} -> {}", transformer.transform_for_testing(url));
    }

    Ok(())
}

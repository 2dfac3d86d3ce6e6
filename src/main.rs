//! `sitemirror <config.json>` or `sitemirror <site-base> [storage-dir]`

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use sitemirror::{MirrorConfig, mirror_site};

const USAGE: &str = "usage: sitemirror <config.json> | sitemirror <site-base> [storage-dir]";

fn load_config(args: &[String]) -> Result<MirrorConfig> {
    match args {
        [path] if path.ends_with(".json") => MirrorConfig::from_json_file(Path::new(path)),
        [site_base] => MirrorConfig::builder()
            .storage_dir("mirror")
            .site_base(site_base)
            .build(),
        [site_base, storage_dir] => MirrorConfig::builder()
            .storage_dir(PathBuf::from(storage_dir))
            .site_base(site_base)
            .build(),
        _ => bail!("{USAGE}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("chromiumoxide::handler", log::LevelFilter::Off)
        .filter_module("chromiumoxide::conn", log::LevelFilter::Off)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(&args).context("Invalid configuration")?;

    let summary = mirror_site(config).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

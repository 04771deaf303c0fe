use std::path::PathBuf;

use anyhow::Result;
use eventlens_core::EventLensConfig;

pub fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => EventLensConfig::config_path()?,
    };

    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}\n\
            Use --force to overwrite it.",
            path.display()
        );
    }

    EventLensConfig::create_default_config(&path)?;
    println!("Wrote {}", path.display());

    Ok(())
}

pub fn path() -> Result<()> {
    println!("{}", EventLensConfig::config_path()?.display());
    Ok(())
}

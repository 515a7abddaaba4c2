use anyhow::{Context, Result};
use colored::Colorize;

use crate::GlobalArgs;
use crate::bootstrap::{config_service, effective_config};
use higia_infrastructure::HigiaPaths;

pub fn init(global: &GlobalArgs) -> Result<()> {
    let service = config_service(global)?;
    let path = service.path();

    if service.init()? {
        println!("{} Wrote {}", "✓".green(), path.display());
    } else {
        println!("{} already exists", path.display());
    }
    Ok(())
}

pub fn show(global: &GlobalArgs) -> Result<()> {
    let paths = HigiaPaths::new(global.config_dir.clone());
    let config = effective_config(global, &paths)?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;

    println!("{}", format!("# {}", config_service(global)?.path().display()).dimmed());
    print!("{rendered}");
    Ok(())
}

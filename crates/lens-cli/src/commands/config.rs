use anyhow::{Context, Result};
use colored::Colorize;
use lens_core::secret::SecretService;
use lens_infrastructure::ConfigService;

use super::context::{AppContext, GlobalOptions};

pub fn init(globals: &GlobalOptions) -> Result<()> {
    let context = AppContext::open(globals)?;
    let service = ConfigService::new(&context.paths)?;

    if service.init()? {
        println!("{} {}", "Created".green(), service.path().display());
    } else {
        println!("{} {}", "Exists".yellow(), service.path().display());
    }

    let secret_file = context
        .paths
        .ensure_secret_file()
        .context("Failed to create secret.json")?;
    println!("{} {}", "Secrets".green(), secret_file.display());
    Ok(())
}

pub async fn path(globals: &GlobalOptions) -> Result<()> {
    let context = AppContext::open(globals)?;
    let secrets_present = context.secret_service()?.secret_file_exists().await;

    println!("config   {}", context.paths.config_file()?.display());
    println!(
        "secrets  {}{}",
        context.paths.secret_file()?.display(),
        if secrets_present { "" } else { " (missing)" }
    );
    println!("storage  {}", context.storage_dir()?.display());
    Ok(())
}

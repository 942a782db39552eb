use anyhow::Result;

use crate::config;
use crate::paths;
use crate::ui;
use crate::Context;

pub fn run(ctx: &Context, path_only: bool) -> Result<()> {
    if path_only {
        let path = match &ctx.config {
            Some(path) => path.clone(),
            None => paths::config_file()?,
        };
        println!("{}", path.display());
        return Ok(());
    }

    let loaded = config::load(ctx.config.as_deref())?;

    if !ctx.quiet {
        ui::header("Reconciler Configuration");
        match &loaded.source {
            Some(path) => ui::kv("Source", &path.display().to_string()),
            None => ui::kv("Source", "built-in defaults"),
        }
        println!();
    }
    print!("{}", config::to_toml(&loaded.config)?);
    Ok(())
}

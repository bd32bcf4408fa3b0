//! config command - Get, set, or list configuration values

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::core::config::Config;
use crate::ui::output;

/// Print the effective value of a key.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let value = ctx.config.get(key)?;
    if !value.is_empty() {
        output::result(value);
    }
    Ok(())
}

/// Set a key in the loaded config file, or in the canonical one.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let path = match ctx.config.loaded_from() {
        Some(path) => path.to_path_buf(),
        None => Config::global_config_path()?,
    };
    let mut config = ctx.config.clone();
    config.set(key, value)?;
    Config::write_atomic(&path, &config.file).context("Failed to write config")?;

    output::print(format!("Set {} = {}", key, value), ctx.verbosity);
    Ok(())
}

/// List every key with its effective value.
pub fn list(ctx: &Context) -> Result<()> {
    output::print("# Effective configuration", ctx.verbosity);
    for (key, value) in ctx.config.entries() {
        let shown = if value.is_empty() { "(engine default)".to_string() } else { value };
        output::result(format!("{} = {}", key, shown));
    }
    Ok(())
}

/// Print where the config was loaded from, or where `set` would write.
pub fn path(ctx: &Context) -> Result<()> {
    match ctx.config.loaded_from() {
        Some(path) => output::result(path.display()),
        None => {
            output::result(Config::global_config_path()?.display());
            output::print("(not created yet)", ctx.verbosity);
        }
    }
    Ok(())
}

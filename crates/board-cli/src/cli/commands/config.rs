//! Config command handlers.

use anyhow::{Context, Result};
use board_core::config::{self, AuthBackendKind};

pub fn path() {
    println!("{}", config::paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

pub fn backend(backend: AuthBackendKind) -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::save_auth_backend_to(&config_path, backend)
        .with_context(|| format!("update config at {}", config_path.display()))?;
    println!("Auth backend set to {}", backend.id());
    Ok(())
}

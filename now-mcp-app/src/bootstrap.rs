//! Startup wiring: config → auth → registry → packages → dispatcher.

use now_mcp_auth::AuthManager;
use now_mcp_core::{ConfigError, ServerConfig};
use now_mcp_tools::{
    builtin_groups, Dispatcher, PackageCatalog, ToolContext, ToolGroup, ToolRegistry,
};
use std::sync::Arc;
use tracing::info;

/// Builds the dispatcher over every compiled-in tool group.
pub fn build_dispatcher(config: ServerConfig) -> Result<Dispatcher, ConfigError> {
    build_with_groups(config, builtin_groups())
}

pub fn build_with_groups(
    config: ServerConfig,
    groups: Vec<ToolGroup>,
) -> Result<Dispatcher, ConfigError> {
    info!("Connecting to {}", config.instance_url);
    let auth = Arc::new(AuthManager::from_config(&config)?);
    let registry = Arc::new(ToolRegistry::discover(groups)?);
    let catalog = PackageCatalog::load(&config.package_config_path)?;
    let exposed = catalog.resolve(config.tool_package.as_deref(), &registry);

    info!(
        "{} of {} tools exposed by package '{}'",
        exposed.len(),
        registry.len(),
        exposed.package()
    );

    let ctx = ToolContext::new(Arc::new(config), auth)?;
    Ok(Dispatcher::new(
        registry,
        Arc::new(catalog),
        Arc::new(exposed),
        ctx,
    ))
}

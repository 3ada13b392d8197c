//! CLI command implementations

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::Value;
use std::fs;
use tokio::sync::broadcast;

use crate::api::ResourceKind;
use crate::app::App;
use crate::auth::{self, Access, Theme};
use crate::cli::{
    confirm, error, info, print_event, print_fetch_error, print_record_table, success, warn,
    ListFilters, OutputFormat,
};
use crate::config::{self, loader::CONFIG_FILENAME};
use crate::events::Event;

/// Initialize a new marine-axis.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    fs::write(config_path, config::loader::default_config_content())?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Set api.base_url and run 'marine-axis login --email <email>'");

    Ok(())
}

/// Sign in
pub async fn login(email: &str, password: Option<String>) -> Result<()> {
    let app = connect().await?;

    let password = match password {
        Some(p) => p,
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password")?,
    };

    match app.client.login(email, &password).await {
        Ok(user) => {
            success(&format!("Signed in as {} ({})", user.display_name(), user.role));
            Ok(())
        }
        Err(e) => {
            error(&format!("Login failed: {}", e));
            Err(e.into())
        }
    }
}

/// Sign out
pub async fn logout() -> Result<()> {
    let app = connect().await?;
    app.client.logout().await?;
    success("Signed out");
    Ok(())
}

/// Show the current session
pub async fn whoami() -> Result<()> {
    let app = connect().await?;

    let Some(session) = app.session.session().await else {
        warn("Not signed in");
        return Ok(());
    };

    let now = chrono::Utc::now().timestamp();
    let user = app.session.current_user().await;

    println!("{}", "Session".bold().underline());
    println!();
    if let Some(user) = &user {
        println!("  {} {}", "User:".bold(), user.display_name());
        if let Some(email) = &user.email {
            println!("  {} {}", "Email:".bold(), email);
        }
    }
    println!(
        "  {} {}",
        "Role:".bold(),
        session
            .role
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );
    let expires = chrono::DateTime::from_timestamp(session.expires_at, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| session.expires_at.to_string());
    println!(
        "  {} {} (in {} min)",
        "Expires:".bold(),
        expires,
        (session.expires_at - now) / 60
    );

    Ok(())
}

/// List records of a collection
pub async fn list(resource: ResourceKind, filters: ListFilters, format: OutputFormat) -> Result<()> {
    let app = connect().await?;
    require_session(&app, resource).await?;

    let controller = app.controller::<Value>(resource);
    let mut events = controller.subscribe();

    let mut query = controller.filters().await;
    query.merge(filters.to_filter_set());
    controller.fetch_items(query).await;
    drain_events(&mut events);

    let state = controller.snapshot().await;
    if let Some(err) = &state.error {
        print_fetch_error(err);
        bail!("Failed to list {}", resource);
    }

    match format {
        OutputFormat::Table => {
            print_record_table(resource, &state.items, state.pagination.as_ref());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&state.items)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&state.items)?);
        }
    }

    Ok(())
}

/// Show one record
pub async fn get(resource: ResourceKind, id: &str) -> Result<()> {
    let app = connect().await?;
    require_session(&app, resource).await?;

    let controller = app.controller::<Value>(resource);
    let mut events = controller.subscribe();
    let record = controller.get_item(id).await;
    drain_events(&mut events);

    println!("{}", serde_json::to_string_pretty(&record?)?);
    Ok(())
}

/// Create a record
pub async fn create(resource: ResourceKind, data: &str) -> Result<()> {
    let body = parse_body(data)?;
    let app = connect().await?;
    require_session(&app, resource).await?;

    let controller = app.controller::<Value>(resource);
    let mut events = controller.subscribe();
    let result = controller.create_item(body).await;
    drain_events(&mut events);

    let record = result?;
    info(&format!("id: {}", crate::cli::field(&record, &["id", "_id"])));
    Ok(())
}

/// Update a record
pub async fn update(resource: ResourceKind, id: &str, data: &str) -> Result<()> {
    let body = parse_body(data)?;
    let app = connect().await?;
    require_session(&app, resource).await?;

    let controller = app.controller::<Value>(resource);
    let mut events = controller.subscribe();
    let result = controller.update_item(id, body).await;
    drain_events(&mut events);

    result?;
    Ok(())
}

/// Delete a record
pub async fn delete(resource: ResourceKind, id: &str, force: bool) -> Result<()> {
    if !force && !confirm(&format!("Delete {} {}?", resource.label().to_lowercase(), id)) {
        info("Cancelled");
        return Ok(());
    }

    let app = connect().await?;
    require_session(&app, resource).await?;

    let controller = app.controller::<Value>(resource);
    let mut events = controller.subscribe();
    let result = controller.delete_item(id).await;
    drain_events(&mut events);

    result?;
    Ok(())
}

/// Print dashboard analytics
pub async fn stats() -> Result<()> {
    let app = connect().await?;
    let mut events = app.events.subscribe();
    if !matches!(auth::guard(&app.session, "/dashboard", &[]).await, Access::Allow) {
        bail!(crate::Error::NotAuthenticated);
    }

    let result = app.client.dashboard_stats().await;
    drain_events(&mut events);

    println!("{}", serde_json::to_string_pretty(&result?)?);
    Ok(())
}

/// Show or update preferences
pub async fn prefs(theme: Option<Theme>, sidebar_collapsed: Option<bool>) -> Result<()> {
    let app = connect().await?;

    if let Some(theme) = theme {
        app.session.set_theme(theme).await?;
    }
    if let Some(collapsed) = sidebar_collapsed {
        app.session.set_sidebar_collapsed(collapsed).await?;
    }

    println!("  {} {}", "Theme:".bold(), app.session.theme().await);
    println!(
        "  {} {}",
        "Sidebar collapsed:".bold(),
        app.session.sidebar_collapsed().await
    );
    Ok(())
}

async fn connect() -> Result<App> {
    let config = config::load_config_or_default()?;
    Ok(App::connect(config).await?)
}

async fn require_session(app: &App, resource: ResourceKind) -> Result<()> {
    let path = resource.path();
    match auth::guard(&app.session, path, &[]).await {
        Access::Allow => Ok(()),
        Access::RedirectToLogin { from } => {
            warn(&format!("Sign in required to open {}", from));
            bail!(crate::Error::NotAuthenticated)
        }
        Access::Forbidden => bail!("Your role cannot access {}", path),
    }
}

fn parse_body(data: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(data).context("--data must be valid JSON")?;
    if !value.is_object() {
        bail!("--data must be a JSON object");
    }
    Ok(value)
}

fn drain_events(rx: &mut broadcast::Receiver<Event>) {
    while let Ok(event) = rx.try_recv() {
        print_event(&event);
    }
}

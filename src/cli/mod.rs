//! CLI interface for Marine-Axis

pub mod commands;
mod output;

pub use output::*;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::api::ResourceKind;
use crate::auth::Theme;
use crate::crud::{filters, FilterSet};

#[derive(Parser)]
#[command(name = "marine-axis")]
#[command(author = "Marine-Axis")]
#[command(version)]
#[command(about = "Administer the Marine-Axis marketplace from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a marine-axis.toml configuration file
    Init,

    /// Sign in and store the session
    Login {
        #[arg(short, long, env = "MARINE_AXIS_EMAIL")]
        email: String,

        /// Prompted for when omitted
        #[arg(short, long, env = "MARINE_AXIS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show the signed-in user and session expiry
    Whoami,

    /// List records of a collection
    List {
        resource: ResourceKind,

        #[command(flatten)]
        filters: ListFilters,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one record
    Get {
        resource: ResourceKind,
        id: String,
    },

    /// Create a record from a JSON document
    Create {
        resource: ResourceKind,

        /// JSON body, e.g. '{"name":"Harbour Tugs"}'
        #[arg(short, long)]
        data: String,
    },

    /// Update a record from a JSON document
    Update {
        resource: ResourceKind,
        id: String,

        #[arg(short, long)]
        data: String,
    },

    /// Delete a record
    Delete {
        resource: ResourceKind,
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show dashboard analytics
    Stats,

    /// Show or change UI preferences
    Prefs {
        #[arg(long)]
        theme: Option<Theme>,

        #[arg(long)]
        sidebar_collapsed: Option<bool>,
    },
}

/// Filters accepted by `list`
#[derive(Args, Debug, Default)]
pub struct ListFilters {
    #[arg(short, long)]
    pub search: Option<String>,

    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub page: Option<u32>,

    #[arg(short, long)]
    pub limit: Option<u32>,

    #[arg(long, value_parser = ["asc", "desc"])]
    pub sort_order: Option<String>,
}

impl ListFilters {
    pub fn to_filter_set(&self) -> FilterSet {
        let mut set = FilterSet::new();
        if let Some(search) = &self.search {
            set.set(filters::SEARCH, search.as_str());
        }
        if let Some(status) = &self.status {
            set.set(filters::STATUS, status.as_str());
        }
        if let Some(page) = self.page {
            set.set(filters::PAGE, page.to_string());
        }
        if let Some(limit) = self.limit {
            set.set(filters::LIMIT, limit.to_string());
        }
        if let Some(order) = &self.sort_order {
            set.set(filters::SORT_ORDER, order.as_str());
        }
        set
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

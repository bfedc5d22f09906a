use clap::{Args, Subcommand};

use crate::admin::{
    ContentKind, ContentSortKey, ContentStatus, PluginSortKey, PluginStatus, SettingsSection,
    SortDirection, UserSortKey, UserStatus,
};

/// Sort order flags shared by the list commands.
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderArgs {
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

impl OrderArgs {
    pub fn direction(self) -> SortDirection {
        if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

/// Plugin management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PluginCommands {
    /// List plugins
    List {
        /// Match name, slug, description or author
        #[arg(long, default_value = "")]
        search: String,
        /// active, inactive, error, not_installed
        #[arg(long)]
        status: Option<PluginStatus>,
        #[arg(long)]
        category: Option<String>,
        /// name, downloads, rating, updated
        #[arg(long, default_value = "name")]
        sort: PluginSortKey,
        #[command(flatten)]
        order: OrderArgs,
    },
    /// Install a plugin from the marketplace
    Install {
        slug: String,
    },
    /// Activate one or more plugins
    Activate {
        #[arg(required = true)]
        slugs: Vec<String>,
    },
    /// Deactivate one or more plugins
    Deactivate {
        #[arg(required = true)]
        slugs: Vec<String>,
    },
    /// Uninstall one or more plugins
    Uninstall {
        #[arg(required = true)]
        slugs: Vec<String>,
    },
}

/// User management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum UserCommands {
    /// List users
    List {
        /// Match username, email or full name
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        role: Option<String>,
        /// active, inactive, suspended
        #[arg(long)]
        status: Option<UserStatus>,
        /// username, email, created, last_login
        #[arg(long, default_value = "username")]
        sort: UserSortKey,
        #[command(flatten)]
        order: OrderArgs,
    },
    /// Create a user account
    Create {
        username: String,
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        /// Initial password
        #[arg(long, env = "MODULAR_USER_PASSWORD", hide_env_values = true)]
        password: String,
        /// Role to grant (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,
    },
    /// Activate accounts by id or username
    Activate {
        #[arg(required = true)]
        users: Vec<String>,
    },
    /// Suspend accounts by id or username
    Suspend {
        #[arg(required = true)]
        users: Vec<String>,
    },
    /// Delete accounts by id or username
    Delete {
        #[arg(required = true)]
        users: Vec<String>,
    },
    /// Replace a user's roles
    SetRoles {
        user: String,
        #[arg(required = true)]
        roles: Vec<String>,
    },
    /// Create a role
    CreateRole {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// resource:action (repeatable)
        #[arg(long = "permission")]
        permissions: Vec<String>,
    },
}

/// Post and page subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ContentCommands {
    /// List posts or pages
    List {
        /// posts or pages
        kind: ContentKind,
        /// Match title, slug or author
        #[arg(long, default_value = "")]
        search: String,
        /// draft, published, scheduled, archived
        #[arg(long)]
        status: Option<ContentStatus>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// title, status, created, updated (default: newest first)
        #[arg(long)]
        sort: Option<ContentSortKey>,
        #[command(flatten)]
        order: OrderArgs,
    },
    /// Publish entries by id or slug
    Publish {
        kind: ContentKind,
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// Move published or scheduled entries back to draft
    Unpublish {
        kind: ContentKind,
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// Archive entries by id or slug
    Archive {
        kind: ContentKind,
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// Delete entries by id or slug
    Delete {
        kind: ContentKind,
        #[arg(required = true)]
        entries: Vec<String>,
    },
}

/// Site settings subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingsCommands {
    /// Show one settings section (general, security, email)
    Get { section: SettingsSection },
    /// Change one field of a settings section
    Set {
        section: SettingsSection,
        /// Field name, e.g. siteTitle or smtpPort
        field: String,
        value: String,
    },
}

//! Admin screens state: plugin, user and content tables with bulk actions,
//! user and role forms, and typed settings sections.

mod bulk;
mod content;
mod forms;
mod plugins;
mod settings;
mod users;

pub use bulk::{BulkOutcome, SortDirection};
pub use content::{
    ContentAction, ContentApi, ContentFilter, ContentKind, ContentRecord, ContentSort,
    ContentSortKey, ContentStatus, ContentTable,
};
pub use forms::{FormMode, RoleForm, UserForm};
pub use plugins::{
    PluginAction, PluginFilter, PluginRecord, PluginSort, PluginSortKey, PluginStatus,
    PluginTable, PluginsApi,
};
pub use settings::{
    EmailSettings, GeneralSettings, SecuritySettings, Settings, SettingsApi, SettingsSection,
};
pub use users::{
    Role, UserAction, UserFilter, UserRecord, UserSort, UserSortKey, UserStatus, UserTable,
    UsersApi,
};

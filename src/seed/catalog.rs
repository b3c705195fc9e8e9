//! Reference data catalog
//!
//! The built-in entries are persisted configuration: their names and codes
//! must stay exactly as written here.

use std::path::Path;

use sea_orm::prelude::DateTimeUtc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::entity::{form, module, permission, role};
use crate::store::{CatalogKind, Tracked};

/// One catalog entry that can be looked up by natural key and turned into a
/// new row
pub trait SeedEntry {
    const KIND: CatalogKind;

    fn key(&self) -> &str;

    fn to_record(&self, now: DateTimeUtc) -> Tracked;
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoleSeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PermissionSeed {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModuleSeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FormSeed {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl SeedEntry for RoleSeed {
    const KIND: CatalogKind = CatalogKind::Role;

    fn key(&self) -> &str {
        &self.name
    }

    fn to_record(&self, now: DateTimeUtc) -> Tracked {
        Tracked::Role(role::ActiveModel {
            name: Set(self.name.clone()),
            description: Set(self.description.clone()),
            active: Set(true),
            create_at: Set(now),
            delete_at: Set(None),
            ..Default::default()
        })
    }
}

impl SeedEntry for PermissionSeed {
    const KIND: CatalogKind = CatalogKind::Permission;

    fn key(&self) -> &str {
        &self.code
    }

    fn to_record(&self, now: DateTimeUtc) -> Tracked {
        Tracked::Permission(permission::ActiveModel {
            code: Set(self.code.clone()),
            name: Set(self.name.clone()),
            description: Set(self.description.clone()),
            active: Set(true),
            create_at: Set(now),
            delete_at: Set(None),
            ..Default::default()
        })
    }
}

impl SeedEntry for ModuleSeed {
    const KIND: CatalogKind = CatalogKind::Module;

    fn key(&self) -> &str {
        &self.name
    }

    fn to_record(&self, now: DateTimeUtc) -> Tracked {
        Tracked::Module(module::ActiveModel {
            name: Set(self.name.clone()),
            description: Set(self.description.clone()),
            active: Set(true),
            create_at: Set(now),
            delete_at: Set(None),
            ..Default::default()
        })
    }
}

impl SeedEntry for FormSeed {
    const KIND: CatalogKind = CatalogKind::Form;

    fn key(&self) -> &str {
        &self.code
    }

    fn to_record(&self, now: DateTimeUtc) -> Tracked {
        Tracked::Form(form::ActiveModel {
            code: Set(self.code.clone()),
            name: Set(self.name.clone()),
            description: Set(self.description.clone()),
            active: Set(true),
            create_at: Set(now),
            delete_at: Set(None),
            ..Default::default()
        })
    }
}

/// Immutable table of reference rows, seeded in field order
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Catalog {
    #[serde(default)]
    pub roles: Vec<RoleSeed>,
    #[serde(default)]
    pub permissions: Vec<PermissionSeed>,
    #[serde(default)]
    pub modules: Vec<ModuleSeed>,
    #[serde(default)]
    pub forms: Vec<FormSeed>,
}

fn role_seed(name: &str, description: &str) -> RoleSeed {
    RoleSeed {
        name: name.to_string(),
        description: description.to_string(),
    }
}

fn permission_seed(code: &str, name: &str, description: &str) -> PermissionSeed {
    PermissionSeed {
        code: code.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    }
}

fn module_seed(name: &str, description: &str) -> ModuleSeed {
    ModuleSeed {
        name: name.to_string(),
        description: description.to_string(),
    }
}

fn form_seed(code: &str, name: &str, description: &str) -> FormSeed {
    FormSeed {
        code: code.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            roles: vec![
                role_seed("Admin", "Full access to every module"),
                role_seed("User", "Standard application user"),
            ],
            permissions: vec![
                permission_seed("READ", "Read", "View records"),
                permission_seed("WRITE", "Write", "Create records"),
                permission_seed("UPDATE", "Update", "Edit existing records"),
                permission_seed("DELETE", "Delete", "Remove records"),
                permission_seed("ADMIN", "Administer", "Manage security settings"),
            ],
            modules: vec![
                module_seed("Users", "User accounts"),
                module_seed("Roles", "Role management"),
                module_seed("Permissions", "Permission management"),
                module_seed("Settings", "System settings"),
            ],
            forms: vec![
                form_seed("LOGIN_FORM", "Login", "Sign-in form"),
                form_seed("REGISTER_FORM", "Register", "Account registration form"),
                form_seed("USER_FORM", "Users", "User maintenance form"),
                form_seed("ROLE_FORM", "Roles", "Role maintenance form"),
            ],
        }
    }
}

impl Catalog {
    /// Load a catalog from a TOML file. Sections left out of the file are
    /// empty, so the file replaces the built-in catalog as a whole.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn keys(&self, kind: CatalogKind) -> Vec<&str> {
        match kind {
            CatalogKind::Role => self.roles.iter().map(SeedEntry::key).collect(),
            CatalogKind::Permission => self.permissions.iter().map(SeedEntry::key).collect(),
            CatalogKind::Module => self.modules.iter().map(SeedEntry::key).collect(),
            CatalogKind::Form => self.forms.iter().map(SeedEntry::key).collect(),
        }
    }

    pub fn contains(&self, kind: CatalogKind, key: &str) -> bool {
        self.keys(kind).contains(&key)
    }
}

use serde::Serialize;
use std::fmt;

use crate::setup::{DEFAULT_MIN_PASSWORD_LENGTH, ErrorMap, is_email, is_present};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Empty password keeps the current one.
    Edit,
}

/// User create/edit form. Serialized as the `POST /api/users` body.
#[derive(Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
}

impl fmt::Debug for UserForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

impl UserForm {
    pub fn validate(&self, mode: FormMode) -> ErrorMap {
        let mut errors = ErrorMap::new();
        let mut fail = |field: &str, message: &str| {
            errors
                .entry(format!("user.{field}"))
                .or_insert_with(|| message.to_string());
        };

        if !is_present(&self.username) {
            fail("username", "Username is required");
        }
        if !is_present(&self.email) {
            fail("email", "Email is required");
        } else if !is_email(&self.email) {
            fail("email", "Email address is invalid");
        }
        if !is_present(&self.first_name) {
            fail("firstName", "First name is required");
        }
        if !is_present(&self.last_name) {
            fail("lastName", "Last name is required");
        }

        let changing_password = mode == FormMode::Create || !self.password.is_empty();
        if changing_password {
            if self.password.is_empty() {
                fail("password", "Password is required");
            } else if self.password.chars().count() < DEFAULT_MIN_PASSWORD_LENGTH {
                fail("password", "Password must be at least 8 characters");
            }
            if self.confirm_password != self.password {
                fail("confirmPassword", "Passwords do not match");
            }
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleForm {
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}

impl RoleForm {
    pub fn validate(&self) -> ErrorMap {
        let mut errors = ErrorMap::new();
        if !is_present(&self.name) {
            errors.insert("role.name".into(), "Role name is required".into());
        }
        if self.permissions.is_empty() {
            errors.insert(
                "role.permissions".into(),
                "Select at least one permission".into(),
            );
        } else if let Some(bad) = self.permissions.iter().find(|p| !is_permission(p)) {
            errors.insert(
                "role.permissions".into(),
                format!("Permission \"{bad}\" must look like resource:action"),
            );
        }
        errors
    }
}

fn is_permission(raw: &str) -> bool {
    let valid = |part: &str| {
        !part.is_empty()
            && (part == "*"
                || part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'))
    };
    matches!(raw.split_once(':'), Some((resource, action)) if valid(resource) && valid(action))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> UserForm {
        UserForm {
            username: "editor".into(),
            email: "editor@example.com".into(),
            password: "longenough".into(),
            confirm_password: "longenough".into(),
            first_name: "Ed".into(),
            last_name: "Itor".into(),
            roles: vec!["editor".into()],
        }
    }

    #[test]
    fn complete_form_is_valid() {
        assert!(filled().validate(FormMode::Create).is_empty());
    }

    #[test]
    fn create_requires_password() {
        let mut form = filled();
        form.password.clear();
        form.confirm_password.clear();
        let errors = form.validate(FormMode::Create);
        assert_eq!(errors["user.password"], "Password is required");
        assert!(!errors.contains_key("user.confirmPassword"));
    }

    #[test]
    fn edit_allows_empty_password() {
        let mut form = filled();
        form.password.clear();
        form.confirm_password.clear();
        assert!(form.validate(FormMode::Edit).is_empty());
    }

    #[test]
    fn edit_still_checks_new_password() {
        let mut form = filled();
        form.password = "short".into();
        form.confirm_password = "other".into();
        let errors = form.validate(FormMode::Edit);
        assert_eq!(
            errors["user.password"],
            "Password must be at least 8 characters"
        );
        assert_eq!(errors["user.confirmPassword"], "Passwords do not match");
    }

    #[test]
    fn email_shape_is_checked() {
        let mut form = filled();
        form.email = "not-an-email".into();
        assert_eq!(
            form.validate(FormMode::Create)["user.email"],
            "Email address is invalid"
        );
    }

    #[test]
    fn serialized_form_omits_confirmation() {
        let json = serde_json::to_value(filled()).unwrap();
        assert_eq!(json["firstName"], "Ed");
        assert!(json.get("confirmPassword").is_none());

        let mut form = filled();
        form.password.clear();
        assert!(serde_json::to_value(form).unwrap().get("password").is_none());
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", filled());
        assert!(!rendered.contains("longenough"));
    }

    #[test]
    fn role_needs_name_and_permissions() {
        let errors = RoleForm::default().validate();
        assert_eq!(errors["role.name"], "Role name is required");
        assert_eq!(errors["role.permissions"], "Select at least one permission");
    }

    #[test]
    fn role_permissions_must_be_resource_action() {
        let mut form = RoleForm {
            name: "Editors".into(),
            description: String::new(),
            permissions: vec!["content:write".into(), "users:*".into()],
        };
        assert!(form.validate().is_empty());

        form.permissions.push("publish".into());
        assert!(form.validate()["role.permissions"].contains("\"publish\""));

        form.permissions = vec!["content:".into()];
        assert!(form.validate().contains_key("role.permissions"));
    }
}

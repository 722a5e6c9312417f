use serde::{Deserialize, Serialize};

/// Role flags carried by every user. All default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFlags {
    pub is_admin: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl RoleFlags {
    #[must_use]
    pub const fn staff() -> Self {
        Self {
            is_admin: false,
            is_staff: true,
            is_superuser: false,
        }
    }

    #[must_use]
    pub const fn superuser() -> Self {
        Self {
            is_admin: true,
            is_staff: true,
            is_superuser: true,
        }
    }
}

/// Input for creating a user.
///
/// `phone_number` is the login identifier; `username` and `email` are the
/// other required fields. Without a password the account gets an unusable
/// one and cannot pass a password check until `set_password` is called.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default)]
    pub flags: RoleFlags,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            phone_number: phone_number.into(),
            password: None,
            flags: RoleFlags::default(),
        }
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: RoleFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Profile fields that may change after creation. The phone number is not
/// among them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

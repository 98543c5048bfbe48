//! Demo accounts and the login banners the store shows for them.

use serde::{Deserialize, Serialize};

/// Password shared by every demo account
pub const PASSWORD: &str = "secret_sauce";

/// Regular account
pub const STANDARD_USER: &str = "standard_user";
/// Account that is refused with the locked-out banner
pub const LOCKED_OUT_USER: &str = "locked_out_user";
/// Account with broken product images
pub const PROBLEM_USER: &str = "problem_user";
/// Account whose login takes several seconds
pub const PERFORMANCE_GLITCH_USER: &str = "performance_glitch_user";
/// Account that hits errors in the checkout flow
pub const ERROR_USER: &str = "error_user";
/// Account with visual defects
pub const VISUAL_USER: &str = "visual_user";

/// Every account the store accepts with [`PASSWORD`]
pub const ACCEPTED_USERS: [&str; 6] = [
    STANDARD_USER,
    LOCKED_OUT_USER,
    PROBLEM_USER,
    PERFORMANCE_GLITCH_USER,
    ERROR_USER,
    VISUAL_USER,
];

/// A username/password pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username typed into the form
    pub username: String,
    /// Password typed into the form
    pub password: String,
}

impl Credentials {
    /// Create a credential pair
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `standard_user` / `secret_sauce`
    #[must_use]
    pub fn standard() -> Self {
        Self::new(STANDARD_USER, PASSWORD)
    }
}

/// Error banners on the login page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoginFailure {
    /// Username left empty
    UsernameRequired,
    /// Username given, password left empty
    PasswordRequired,
    /// Unknown user or wrong password
    Mismatch,
    /// Correct credentials for `locked_out_user`
    LockedOut,
    /// Inventory requested without a session
    InventoryRequiresLogin,
}

impl LoginFailure {
    /// Literal banner text
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::UsernameRequired => "Epic sadface: Username is required",
            Self::PasswordRequired => "Epic sadface: Password is required",
            Self::Mismatch => {
                "Epic sadface: Username and password do not match any user in this service"
            }
            Self::LockedOut => "Epic sadface: Sorry, this user has been locked out.",
            Self::InventoryRequiresLogin => {
                "Epic sadface: You can only access '/inventory.html' when you are logged in."
            }
        }
    }

    /// Recognize a banner text
    #[must_use]
    pub fn from_message(text: &str) -> Option<Self> {
        [
            Self::UsernameRequired,
            Self::PasswordRequired,
            Self::Mismatch,
            Self::LockedOut,
            Self::InventoryRequiresLogin,
        ]
        .into_iter()
        .find(|failure| failure.message() == text.trim())
    }

    /// What the store answers for a submitted form.
    ///
    /// Username is validated before password, and the password is checked
    /// before the lock, so a locked account with a wrong password gets
    /// [`Mismatch`](Self::Mismatch).
    #[must_use]
    pub fn check(credentials: &Credentials) -> Option<Self> {
        if credentials.username.is_empty() {
            return Some(Self::UsernameRequired);
        }
        if credentials.password.is_empty() {
            return Some(Self::PasswordRequired);
        }
        if credentials.password != PASSWORD
            || !ACCEPTED_USERS.contains(&credentials.username.as_str())
        {
            return Some(Self::Mismatch);
        }
        if credentials.username == LOCKED_OUT_USER {
            return Some(Self::LockedOut);
        }
        None
    }
}

impl std::fmt::Display for LoginFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::user::errors::EmailError;
use crate::user::errors::FullNameError;
use crate::user::errors::PaginationError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::RoleError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// Represents a registered account. Email and username are unique across
/// all users; uniqueness is enforced by storage.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub username: Username,
    pub full_name: Option<FullName>,
    pub password_hash: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User fields before storage assigns an id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: EmailAddress,
    pub username: Username,
    pub full_name: Option<FullName>,
    pub password_hash: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub role: Role,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl UserId {
    /// Parse a user ID from string.
    ///
    /// # Arguments
    /// * `s` - Decimal id, as carried in the token subject or URL path
    ///
    /// # Returns
    /// Parsed UserId
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a positive integer
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        match s.parse::<i64>() {
            Ok(id) if id > 0 => Ok(UserId(id)),
            Ok(id) => Err(UserIdError::InvalidFormat(id.to_string())),
            Err(e) => Err(UserIdError::InvalidFormat(e.to_string())),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// 3-50 characters, starting with an ASCII letter or digit, followed by ASCII
/// letters, digits, underscores, and hyphens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 50;

    const RESERVED: [&'static str; 11] = [
        "admin",
        "root",
        "system",
        "api",
        "www",
        "mail",
        "support",
        "info",
        "help",
        "moderator",
        "administrator",
    ];

    /// Create a new valid username.
    ///
    /// Validates length and character constraints only; stored usernames
    /// (including the bootstrap superuser's) go through here.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 50 characters
    /// * `InvalidCharacters` - Bad first character or characters outside the allowed set
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    /// Create a username chosen by a user.
    ///
    /// Same as `new`, additionally rejecting reserved names.
    ///
    /// # Errors
    /// * `Reserved` - Username is reserved (case-insensitive)
    pub fn new_unreserved(username: String) -> Result<Self, UsernameError> {
        let username = Self::new(username)?;
        let lowered = username.0.to_lowercase();

        if Self::RESERVED.contains(&lowered.as_str()) {
            return Err(UsernameError::Reserved(username.0));
        }

        Ok(username)
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        let mut chars = username.chars();
        let starts_alphanumeric = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
        let rest_valid = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if starts_alphanumeric && rest_valid {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    /// Get username as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_string();
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name.
///
/// Runs of whitespace collapse to a single space. Letters, spaces, hyphens,
/// and apostrophes only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName(String);

impl FullName {
    const MAX_LENGTH: usize = 255;

    pub fn new(full_name: String) -> Result<Self, FullNameError> {
        let normalized = full_name.split_whitespace().collect::<Vec<_>>().join(" ");

        if normalized.is_empty() {
            return Err(FullNameError::Empty);
        }

        let length = normalized.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(FullNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        if !normalized
            .chars()
            .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'')
        {
            return Err(FullNameError::InvalidCharacters);
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
    Moderator,
    Staff,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::Admin, Role::Moderator, Role::Staff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Staff => "staff",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| RoleError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strength rules applied to passwords chosen by users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digits: bool,
    pub require_special: bool,
}

impl PasswordPolicy {
    pub const MAX_LENGTH: usize = 128;
    const SPECIAL_CHARACTERS: &'static str = "!@#$%^&*(),.?\":{}|<>";
    const COMMON_PASSWORDS: [&'static str; 10] = [
        "password",
        "password123",
        "12345678",
        "qwerty",
        "abc123",
        "admin",
        "admin123",
        "letmein",
        "welcome",
        "monkey",
    ];

    /// Check a plaintext password against the policy.
    ///
    /// # Errors
    /// First violated rule, checked in order: length, character classes, common list
    pub fn validate(&self, password: &str) -> Result<(), PasswordPolicyError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min: self.min_length,
                actual: length,
            });
        }
        if length > Self::MAX_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(PasswordPolicyError::MissingUppercase);
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(PasswordPolicyError::MissingLowercase);
        }
        if self.require_digits && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingDigit);
        }
        if self.require_special && !password.chars().any(|c| Self::SPECIAL_CHARACTERS.contains(c))
        {
            return Err(PasswordPolicyError::MissingSpecial);
        }

        if Self::COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
            return Err(PasswordPolicyError::TooCommon);
        }

        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_digits: true,
            require_special: true,
        }
    }
}

/// Partial update a user applies to their own profile.
///
/// Only provided fields are changed.
#[derive(Default)]
pub struct UpdateProfileCommand {
    pub email: Option<EmailAddress>,
    pub username: Option<Username>,
    pub full_name: Option<FullName>,
    pub password: Option<String>,
}

impl fmt::Debug for UpdateProfileCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateProfileCommand")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("password", &redacted(&self.password))
            .finish()
    }
}

/// Password change requested by the account owner.
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub new_password: String,
}

impl fmt::Debug for ChangePasswordCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePasswordCommand")
            .field("current_password", &"<redacted>")
            .field("new_password", &"<redacted>")
            .finish()
    }
}

/// Partial update applied by a superuser to any account.
#[derive(Default)]
pub struct AdminUpdateUserCommand {
    pub email: Option<EmailAddress>,
    pub username: Option<Username>,
    pub full_name: Option<FullName>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<Role>,
}

impl fmt::Debug for AdminUpdateUserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminUpdateUserCommand")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("password", &redacted(&self.password))
            .field("is_active", &self.is_active)
            .field("role", &self.role)
            .finish()
    }
}

fn redacted(password: &Option<String>) -> Option<&'static str> {
    password.as_ref().map(|_| "<redacted>")
}

/// Validated page coordinates (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub const MAX_PAGE_SIZE: u32 = 100;

    pub fn new(page: u32, page_size: u32) -> Result<Self, PaginationError> {
        if page < 1 {
            return Err(PaginationError::InvalidPage);
        }
        if page_size < 1 || page_size > Self::MAX_PAGE_SIZE {
            return Err(PaginationError::InvalidPageSize {
                max: Self::MAX_PAGE_SIZE,
                actual: page_size,
            });
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

/// One page of users plus totals.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub pages: i64,
}

impl UserPage {
    pub fn new(users: Vec<User>, total: i64, request: PageRequest) -> Self {
        let page_size = i64::from(request.page_size());
        Self {
            users,
            total,
            page: request.page(),
            page_size: request.page_size(),
            pages: (total + page_size - 1) / page_size,
        }
    }

    pub fn has_next(&self) -> bool {
        i64::from(self.page) < self.pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

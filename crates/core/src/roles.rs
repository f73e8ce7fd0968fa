//! Well-known role name constants.
//!
//! These must match the `ck_users_role` check constraint in the users
//! migration.

pub const ROLE_ADMINISTRATOR: &str = "Administrator";
pub const ROLE_OPERATOR: &str = "Operator";
pub const ROLE_AUDITOR: &str = "Auditor";

/// Role assigned to accounts created through signup.
pub const DEFAULT_ROLE: &str = ROLE_OPERATOR;


/// Every role the users table accepts.
pub const ALL_ROLES: [&str; 3] = [ROLE_ADMINISTRATOR, ROLE_OPERATOR, ROLE_AUDITOR];

pub fn is_known_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

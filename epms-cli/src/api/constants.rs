//! Backend paths and storage keys

/// Root of the OData V4 service
pub const ODATA_BASE: &str = "/odata";

/// Service document describing the entity sets
pub const ODATA_METADATA_PATH: &str = "/odata/$metadata";

/// Credential exchange endpoint. A 401 from here means bad credentials, not an
/// expired session.
pub const LOGIN_PATH: &str = "/auth/login";

/// Self-service password change for the signed-in user
pub const PROFILE_PASSWORD_PATH: &str = "/api/profile/password";

/// Namespace the persisted session is stored under
pub const SESSION_STORAGE_KEY: &str = "epms-auth";

/// Directory name used under the platform config and data dirs
pub const APP_DIR_NAME: &str = "epms-cli";

/// Router Module Index
///
/// Organizes the routing surface into security-segregated modules so access
/// control is applied explicitly at the module level (via Axum layers)
/// rather than per-handler by convention.

/// Routes accessible to all clients: reading posts and the auth endpoints.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware. Requires a
/// validated session; post mutations additionally enforce ownership inside
/// the handlers.
pub mod authenticated;

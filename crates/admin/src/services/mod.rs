//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Username/password login for admins
//! - `orders` - Order lifecycle, cancellation decisions and reporting

pub mod auth;
pub mod orders;

pub use auth::{AdminAuthError, AdminAuthService, CredentialVerifier};
pub use orders::{OrderService, OrderServiceError};

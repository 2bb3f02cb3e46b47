//! Registration service client.
//!
//! The workflows never talk HTTP directly; they go through the
//! [`RegistryService`] trait. [`HttpRegistry`] implements it against the
//! service's REST API, and tests plug in an in-memory double.
//!
//! # Example
//!
//! ```rust,ignore
//! use zkauth::client::{HttpRegistry, RegistryService};
//!
//! let registry = HttpRegistry::with_defaults()?;
//! let record = registry.verify("0x1234".to_string()).await?;
//! if record.is_registered {
//!     println!("registered by {:?}", record.author_address);
//! }
//! ```

mod http;
mod service;
mod types;

pub use http::HttpRegistry;
pub use service::RegistryService;
pub use types::{FileRecord, HealthStatus, UploadFile, UploadResult};

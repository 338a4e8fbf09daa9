//! caseload-scope: the tenant isolation layer.
//!
//! Every unit of work resolves exactly one tenant id and obtains a data
//! handle bound to it; all entity operations issued through that handle are
//! intercepted and tenant-constrained, so route handlers cannot forget the
//! constraint and cannot override it.
//!
//! The three pieces, leaf-first:
//! - [`TenantResolver`] turns an authenticated caller identity into the one
//!   tenant id governing the unit of work;
//! - [`ScopedStore`] wraps a registered collection's store and injects the
//!   tenant constraint into every operation;
//! - [`DataGateway`] is the factory: `scoped(tenant)` for normal request
//!   handling, `unscoped()` as the explicit escape hatch for genuinely
//!   cross-tenant administration.

pub mod gateway;
pub mod resolver;
pub mod scoped;

pub use gateway::{DataGateway, DataHandle, GatewayBuilder};
pub use resolver::{EntityOverrides, TenantResolver, DEFAULT_OVERRIDE_FIELD};
pub use scoped::{PageLimits, ScopedStore};

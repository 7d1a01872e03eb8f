//! `siteproc-suppliers` — contracts for the external retail/wholesale
//! backends.
//!
//! Each backend is driven by one [`SupplierAdapter`]: price lookup, order
//! placement, connectivity test. Adapters are opaque implementations of that
//! contract; their internal automation is not modeled here. The set of known
//! backends is the closed [`SupplierKind`] union, and tenant configuration
//! maps onto it through the [`AdapterRegistry`].

pub mod adapter;
pub mod credentials;
pub mod geo;
pub mod kind;
pub mod registry;

pub use adapter::{ConnectionStatus, Placement, PlacementRequest, SupplierAdapter};
pub use credentials::{Credentials, PaymentBlob};
pub use geo::{haversine_km, Branch, BranchDirectory, BranchMatch, Coordinates, Geocoder};
pub use kind::SupplierKind;
pub use registry::{AdapterRegistry, PoolEntry, SupplierAccount};

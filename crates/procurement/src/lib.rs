//! `siteproc-procurement` — the procurement domain model.
//!
//! Pure domain types and rules: the material-request lifecycle, job-site
//! budgets and threshold-crossing detection, supplier orders with their
//! cancellation windows, and tenant settings. No IO and no async here; the
//! engine that moves these types lives in `siteproc-infra`.

pub mod budget;
pub mod cancellation;
pub mod job_site;
pub mod order;
pub mod request;
pub mod settings;

pub use budget::{is_large_order, threshold_crossings, BudgetAlert, BudgetAlertKind};
pub use cancellation::{
    CancelToken, CancellationError, CancellationWindow, CANCELLATION_WINDOW_MINUTES,
};
pub use job_site::{BudgetCommit, JobSite};
pub use order::{OrderStatus, SupplierOrder};
pub use request::{Request, RequestStatus, Urgency};
pub use settings::{CompanySettings, DeliveryMode, SupplierPreference};

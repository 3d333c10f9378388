pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod ports;
pub mod pricing;

pub use domain::customer::{Customer, CustomerField};
pub use domain::quotation::{Criterion, CriterionValue, Quotation, QuotationId};
pub use domain::rating::{County, EmissionsClass, InsuranceCategory, RatedAttribute, Sex};
pub use domain::vehicle::VehicleMake;
pub use errors::{DocumentError, PresentationError, StoreError, WorkflowError};
pub use flows::{SummaryTable, WorkflowEngine, WorkflowState};
pub use ports::{DocumentService, ExpiringKind, PresentationPort, QuotationStore};
pub use pricing::{DeterministicPricingEngine, PremiumQuote, PricingEngine};

//! Quotation store clients: the HTTP backend used in production and an
//! in-memory store for local sessions and tests.

pub mod envelope;
pub mod http;
pub mod memory;

pub use envelope::ServiceResponse;
pub use http::HttpQuotationStore;
pub use memory::InMemoryQuotationStore;

//! Contracts the workflow consumes. Implementations live in the store,
//! documents and cli crates.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::quotation::{Quotation, QuotationId};
use crate::errors::{DocumentError, PresentationError, StoreError};
use crate::flows::summary::SummaryTable;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpiringKind {
    Quotations,
    Policies,
}

impl ExpiringKind {
    pub fn report_label(self) -> &'static str {
        match self {
            Self::Quotations => "Quotations Expiring (Next 3 Days)",
            Self::Policies => "Policies Expiring (Next 30 Days)",
        }
    }

    /// Look-ahead window the store applies.
    pub fn window_days(self) -> i64 {
        match self {
            Self::Quotations => 3,
            Self::Policies => 30,
        }
    }
}

#[async_trait]
pub trait QuotationStore: Send + Sync {
    async fn get_quotation(&self, id: QuotationId) -> Result<Option<Quotation>, StoreError>;

    async fn get_policy(&self, id: QuotationId) -> Result<Option<Quotation>, StoreError>;

    /// Persists a new quotation; the returned copy carries the assigned id.
    async fn save_quotation(&self, quotation: &Quotation)
        -> Result<Option<Quotation>, StoreError>;

    async fn convert_to_policy(&self, id: QuotationId) -> Result<Option<Quotation>, StoreError>;

    async fn list_expiring(&self, kind: ExpiringKind) -> Result<Vec<Quotation>, StoreError>;
}

#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn create_certificate(&self, policy: &Quotation) -> Result<PathBuf, DocumentError>;

    async fn create_expiring_report(
        &self,
        quotations: &[Quotation],
        label: &str,
    ) -> Result<PathBuf, DocumentError>;
}

pub type IntValidator<'a> = &'a dyn Fn(i64) -> Result<(), String>;

/// Terminal surface the workflow drives. Every prompt blocks until the
/// operator answers.
pub trait PresentationPort {
    /// Section heading, drawn as a rule.
    fn banner(&mut self, title: &str) -> Result<(), PresentationError>;

    fn notify_error(&mut self, message: &str) -> Result<(), PresentationError>;

    fn render_summary(&mut self, table: &SummaryTable) -> Result<(), PresentationError>;

    fn render_quotation(&mut self, quotation: &Quotation) -> Result<(), PresentationError>;

    fn render_expiring(
        &mut self,
        quotations: &[Quotation],
        label: &str,
    ) -> Result<(), PresentationError>;

    /// Returns the index of the chosen option.
    fn prompt_choice(&mut self, prompt: &str, options: &[&str])
        -> Result<usize, PresentationError>;

    fn prompt_text(&mut self, prompt: &str) -> Result<String, PresentationError>;

    /// Re-prompts until `validate` accepts the value.
    fn prompt_int(
        &mut self,
        prompt: &str,
        validate: IntValidator<'_>,
    ) -> Result<i64, PresentationError>;

    fn confirm(&mut self, prompt: &str) -> Result<bool, PresentationError>;
}

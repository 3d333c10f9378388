//! Template-facing projections of quotations.

use chrono::Months;
use serde::Serialize;

use mmi_core::domain::quotation::{Criterion, Quotation};
use mmi_core::errors::DocumentError;
use mmi_core::flows::summary::{format_cost, format_date};

#[derive(Clone, Debug, Serialize)]
pub struct CertificateView {
    pub policy_number: String,
    pub sex: String,
    pub age: String,
    pub county: String,
    pub model: String,
    pub emissions: String,
    pub insurance_category: String,
    pub total_cost: String,
    pub start_date: String,
    pub end_date: String,
    pub customer_name: String,
}

impl CertificateView {
    pub fn from_policy(policy: &Quotation) -> Result<Self, DocumentError> {
        let policy_number = policy.id.ok_or(DocumentError::MissingPolicyNumber)?;
        // Policies run one year, ending on the stored expiry.
        let start_date = policy.valid_until.and_then(|end| end.checked_sub_months(Months::new(12)));

        Ok(Self {
            policy_number: policy_number.to_string(),
            sex: policy.display(Criterion::Sex),
            age: policy.display(Criterion::Age),
            county: policy.display(Criterion::County),
            model: policy.display(Criterion::Model),
            emissions: policy.display(Criterion::Emissions),
            insurance_category: policy.display(Criterion::InsuranceCategory),
            total_cost: format_cost(policy.total_cost),
            start_date: format_date(start_date),
            end_date: format_date(policy.valid_until),
            customer_name: policy.customer_name(),
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ReportRow {
    pub id: String,
    pub customer: String,
    pub model: String,
    pub insurance_category: String,
    pub total_cost: String,
    pub valid_until: String,
    pub phone_number: String,
}

impl ReportRow {
    pub fn from_quotation(quotation: &Quotation) -> Self {
        Self {
            id: quotation.id.map(|id| id.to_string()).unwrap_or_default(),
            customer: quotation.customer_name(),
            model: quotation.display(Criterion::Model),
            insurance_category: quotation.display(Criterion::InsuranceCategory),
            total_cost: format_cost(quotation.total_cost),
            valid_until: format_date(quotation.valid_until),
            phone_number: quotation
                .customer
                .as_ref()
                .map(|customer| customer.phone_number.clone())
                .unwrap_or_default(),
        }
    }
}

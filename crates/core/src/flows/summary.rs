use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::customer::{Customer, CustomerField};
use crate::domain::quotation::{Criterion, Quotation};

pub const TOTAL_COST_ROW: &str = "Total Cost";
pub const VALID_UNTIL_ROW: &str = "Valid Until";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

/// Two-column table kept on screen while a quotation or customer is edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub title: String,
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn new<'a>(title: impl Into<String>, labels: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            title: title.into(),
            rows: labels
                .into_iter()
                .map(|label| SummaryRow { label: label.to_string(), value: String::new() })
                .collect(),
        }
    }

    pub fn for_quotation(quotation: &Quotation) -> Self {
        let labels = Criterion::ALL
            .iter()
            .map(|criterion| criterion.label())
            .chain([TOTAL_COST_ROW, VALID_UNTIL_ROW]);
        let mut table = Self::new("Quotation Criteria", labels);
        for criterion in Criterion::ALL {
            table.set(criterion.label(), quotation.display(*criterion));
        }
        table.set(TOTAL_COST_ROW, format_cost(quotation.total_cost));
        table.set(VALID_UNTIL_ROW, format_date(quotation.valid_until));
        table
    }

    pub fn for_customer(customer: Option<&Customer>) -> Self {
        let mut table =
            Self::new("Customer Details", CustomerField::ALL.iter().map(|field| field.label()));
        if let Some(customer) = customer {
            for field in CustomerField::ALL {
                table.set(field.label(), customer.get(*field));
            }
        }
        table
    }

    /// Updates one cell. Returns false when the table has no such row.
    pub fn set(&mut self, label: &str, value: impl Into<String>) -> bool {
        match self.rows.iter_mut().find(|row| row.label == label) {
            Some(row) => {
                row.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows.iter().find(|row| row.label == label).map(|row| row.value.as_str())
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }
}

pub fn format_cost(total_cost: i64) -> String {
    format!("€{total_cost}")
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format("%d/%m/%Y").to_string()).unwrap_or_default()
}

use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Serialize;

use mmi_core::domain::quotation::{Criterion, Quotation};
use mmi_core::domain::rating::{County, EmissionsClass, InsuranceCategory, RatedAttribute, Sex};
use mmi_core::flows::validate_age;
use mmi_core::pricing::{price_quotation, PremiumQuote};

use crate::commands::CommandResult;

#[derive(Debug, Clone, Args)]
pub struct PriceArgs {
    #[arg(long, value_parser = parse_label::<Sex>, help = "Male or Female")]
    pub sex: Option<Sex>,
    #[arg(long, help = "Driver age, 17 to 87")]
    pub age: Option<u32>,
    #[arg(long, value_parser = parse_label::<County>)]
    pub county: Option<County>,
    #[arg(long, help = "Vehicle model, e.g. Corsa or \"Gran Turismo\"")]
    pub model: Option<String>,
    #[arg(long, value_parser = parse_label::<EmissionsClass>, help = "Low, Medium or High")]
    pub emissions: Option<EmissionsClass>,
    #[arg(
        long,
        value_parser = parse_label::<InsuranceCategory>,
        help = "\"Fully Comprehensive\" or \"Third Party Fire and Theft\""
    )]
    pub category: Option<InsuranceCategory>,
    #[arg(long, help = "Pricing date (YYYY-MM-DD); defaults to today")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct PriceOutput {
    criteria: Vec<CriterionOutput>,
    quote: PremiumQuote,
}

#[derive(Debug, Serialize)]
struct CriterionOutput {
    criterion: &'static str,
    value: String,
}

fn parse_label<A: RatedAttribute>(raw: &str) -> Result<A, String> {
    A::from_label(raw).ok_or_else(|| {
        let labels: Vec<&str> = A::ALL.iter().map(|value| value.label()).collect();
        format!("expected one of: {}", labels.join(", "))
    })
}

pub fn quotation_from(args: &PriceArgs) -> Result<Quotation, String> {
    if let Some(age) = args.age {
        validate_age(i64::from(age))?;
    }

    Ok(Quotation {
        sex: args.sex,
        age: args.age.unwrap_or_default(),
        county: args.county,
        model: args.model.clone().unwrap_or_default(),
        emissions: args.emissions,
        insurance_category: args.category,
        ..Quotation::default()
    })
}

pub fn run(args: &PriceArgs) -> CommandResult {
    let quotation = match quotation_from(args) {
        Ok(quotation) => quotation,
        Err(message) => return CommandResult::failure("price", "invalid_criteria", message, 2),
    };
    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    let output = PriceOutput {
        criteria: Criterion::ALL
            .iter()
            .map(|criterion| CriterionOutput {
                criterion: criterion.label(),
                value: quotation.display(*criterion),
            })
            .collect(),
        quote: price_quotation(&quotation, today),
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => CommandResult { exit_code: 0, output: json },
        Err(error) => CommandResult::failure("price", "serialization", error.to_string(), 1),
    }
}

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::quotation::{Criterion, Quotation};
use crate::domain::rating::{County, EmissionsClass, InsuranceCategory, Sex};

pub const BASE_PREMIUM: i64 = 1000;
/// Quotations stay valid for this many days from the last repricing.
pub const VALIDITY_DAYS: u64 = 31;
/// Loading applied from age 80 upward. Prices the risk out rather than rejecting it.
pub const PROHIBITIVE_AGE_LOADING: i64 = 999_999;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumAdjustment {
    pub factor: String,
    pub amount: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumQuote {
    pub base: i64,
    pub adjustments: Vec<PremiumAdjustment>,
    pub total_cost: i64,
    pub valid_until: NaiveDate,
}

pub trait PricingEngine: Send + Sync {
    fn price(&self, quotation: &Quotation, today: NaiveDate) -> PremiumQuote;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(&self, quotation: &Quotation, today: NaiveDate) -> PremiumQuote {
        price_quotation(quotation, today)
    }
}

pub fn price_quotation(quotation: &Quotation, today: NaiveDate) -> PremiumQuote {
    let adjustments: Vec<PremiumAdjustment> = Criterion::ALL
        .iter()
        .map(|criterion| PremiumAdjustment {
            factor: criterion.label().to_string(),
            amount: adjustment(quotation, *criterion),
        })
        .collect();
    let total_cost = BASE_PREMIUM + adjustments.iter().map(|step| step.amount).sum::<i64>();

    PremiumQuote { base: BASE_PREMIUM, adjustments, total_cost, valid_until: valid_until(today) }
}

pub fn valid_until(today: NaiveDate) -> NaiveDate {
    today.checked_add_days(Days::new(VALIDITY_DAYS)).unwrap_or(NaiveDate::MAX)
}

fn adjustment(quotation: &Quotation, criterion: Criterion) -> i64 {
    match criterion {
        Criterion::Sex => sex_adjustment(quotation.sex),
        Criterion::Age => age_adjustment(quotation.sex, quotation.age),
        Criterion::County => quotation.county.map(county_adjustment).unwrap_or(0),
        Criterion::Model => model_adjustment(&quotation.model),
        Criterion::Emissions => quotation.emissions.map(emissions_adjustment).unwrap_or(0),
        Criterion::InsuranceCategory => {
            quotation.insurance_category.map(insurance_adjustment).unwrap_or(0)
        }
    }
}

fn sex_adjustment(sex: Option<Sex>) -> i64 {
    match sex {
        Some(Sex::Male) => 1000,
        Some(Sex::Female) => 800,
        None => 0,
    }
}

/// Anyone not recorded as male is rated on the lower age bands.
fn age_adjustment(sex: Option<Sex>, age: u32) -> i64 {
    let male = sex == Some(Sex::Male);
    match (age, male) {
        (0, _) => 0,
        (80.., _) => PROHIBITIVE_AGE_LOADING,
        (1..=19, true) => 400,
        (1..=19, false) => 160,
        (20..=35, true) => -800,
        (20..=35, false) => -320,
        (_, true) => -1300,
        (_, false) => -520,
    }
}

fn county_adjustment(county: County) -> i64 {
    match county {
        County::Cork => 50,
        County::Clare => 225,
        County::Kerry => 50,
        County::Limerick => -75,
        County::Tipperary => -80,
        County::Waterford => -100,
    }
}

fn model_adjustment(model: &str) -> i64 {
    match model {
        "Convertible" => 200,
        "Gran Turismo" => 250,
        "X6" => 300,
        "Z4 Roadster" => 175,
        "Corsa" => 50,
        "Astra" => 105,
        "Vectra" => 150,
        "Yaris" => 50,
        "Auris" => 75,
        "Corolla" => 100,
        "Avensis" => 125,
        "Renault" => 100,
        "Megane" => 75,
        "Clio" => 50,
        _ => 0,
    }
}

fn emissions_adjustment(emissions: EmissionsClass) -> i64 {
    match emissions {
        EmissionsClass::High => 300,
        EmissionsClass::Medium => 150,
        EmissionsClass::Low => -75,
    }
}

fn insurance_adjustment(category: InsuranceCategory) -> i64 {
    match category {
        InsuranceCategory::FullyComprehensive => 200,
        InsuranceCategory::ThirdPartyFireAndTheft => -120,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{price_quotation, DeterministicPricingEngine, PricingEngine, BASE_PREMIUM};
    use crate::domain::quotation::Quotation;
    use crate::domain::rating::{County, EmissionsClass, InsuranceCategory, Sex};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    fn quotation(
        sex: Option<Sex>,
        age: u32,
        county: Option<County>,
        model: &str,
        emissions: Option<EmissionsClass>,
        insurance_category: Option<InsuranceCategory>,
    ) -> Quotation {
        Quotation {
            sex,
            age,
            county,
            model: model.to_string(),
            emissions,
            insurance_category,
            ..Quotation::default()
        }
    }

    #[test]
    fn male_thirty_cork_corsa_scenario() {
        let premium = price_quotation(
            &quotation(
                Some(Sex::Male),
                30,
                Some(County::Cork),
                "Corsa",
                Some(EmissionsClass::Low),
                Some(InsuranceCategory::FullyComprehensive),
            ),
            today(),
        );

        assert_eq!(premium.total_cost, 1425);
    }

    #[test]
    fn female_seventeen_clare_x6_scenario() {
        let premium = price_quotation(
            &quotation(
                Some(Sex::Female),
                17,
                Some(County::Clare),
                "X6",
                Some(EmissionsClass::High),
                Some(InsuranceCategory::ThirdPartyFireAndTheft),
            ),
            today(),
        );

        assert_eq!(premium.total_cost, 2665);
    }

    #[test]
    fn empty_quotation_prices_at_base() {
        let premium = price_quotation(&Quotation::default(), today());
        assert_eq!(premium.total_cost, BASE_PREMIUM);
        assert!(premium.adjustments.iter().all(|step| step.amount == 0));
    }

    #[test]
    fn total_is_base_plus_every_adjustment() {
        let premium = price_quotation(
            &quotation(
                Some(Sex::Female),
                50,
                Some(County::Waterford),
                "Avensis",
                Some(EmissionsClass::Medium),
                Some(InsuranceCategory::FullyComprehensive),
            ),
            today(),
        );

        let amounts: Vec<i64> = premium.adjustments.iter().map(|step| step.amount).collect();
        assert_eq!(amounts, vec![800, -520, -100, 125, 150, 200]);
        assert_eq!(premium.total_cost, 1000 + 800 - 520 - 100 + 125 + 150 + 200);
    }

    #[test]
    fn age_bands_follow_sex() {
        let cases = [
            (Some(Sex::Male), 19, 1000 + 1000 + 400),
            (Some(Sex::Male), 20, 1000 + 1000 - 800),
            (Some(Sex::Male), 35, 1000 + 1000 - 800),
            (Some(Sex::Male), 36, 1000 + 1000 - 1300),
            (Some(Sex::Male), 79, 1000 + 1000 - 1300),
            (Some(Sex::Female), 19, 1000 + 800 + 160),
            (Some(Sex::Female), 36, 1000 + 800 - 520),
            (None, 25, 1000 - 320),
            (None, 0, 1000),
        ];

        for (sex, age, expected) in cases {
            let premium = price_quotation(&quotation(sex, age, None, "", None, None), today());
            assert_eq!(premium.total_cost, expected, "sex {sex:?} age {age}");
        }
    }

    #[test]
    fn eighty_and_over_is_priced_out() {
        for (sex, age) in [(Some(Sex::Male), 80), (Some(Sex::Female), 87), (None, 120)] {
            let premium = price_quotation(
                &quotation(
                    sex,
                    age,
                    Some(County::Waterford),
                    "Clio",
                    Some(EmissionsClass::Low),
                    Some(InsuranceCategory::ThirdPartyFireAndTheft),
                ),
                today(),
            );
            assert!(premium.total_cost >= 999_999, "age {age} total {}", premium.total_cost);
        }
    }

    #[test]
    fn unknown_models_and_the_generic_renault_entry() {
        let fleunce = price_quotation(&quotation(None, 0, None, "Fleunce", None, None), today());
        let renault = price_quotation(&quotation(None, 0, None, "Renault", None, None), today());

        assert_eq!(fleunce.total_cost, BASE_PREMIUM);
        assert_eq!(renault.total_cost, BASE_PREMIUM + 100);
    }

    #[test]
    fn insurance_category_is_priced_from_its_own_field() {
        let high_emissions_only = price_quotation(
            &quotation(None, 0, None, "", Some(EmissionsClass::High), None),
            today(),
        );
        assert_eq!(high_emissions_only.total_cost, BASE_PREMIUM + 300);
    }

    #[test]
    fn valid_until_is_thirty_one_days_from_computation_date() {
        let mut stale = Quotation::default();
        stale.valid_until = NaiveDate::from_ymd_opt(2020, 1, 1);

        let premium = DeterministicPricingEngine.price(&stale, today());
        assert_eq!(premium.valid_until, NaiveDate::from_ymd_opt(2026, 11, 19).expect("date"));
    }

    #[test]
    fn pricing_is_deterministic() {
        let subject = quotation(
            Some(Sex::Male),
            44,
            Some(County::Tipperary),
            "Gran Turismo",
            Some(EmissionsClass::Medium),
            Some(InsuranceCategory::FullyComprehensive),
        );

        assert_eq!(price_quotation(&subject, today()), price_quotation(&subject, today()));
    }
}

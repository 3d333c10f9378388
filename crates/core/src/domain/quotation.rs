use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::customer::Customer;
use crate::domain::rating::{self, County, EmissionsClass, InsuranceCategory, Sex};
use crate::domain::vehicle::VehicleMake;
use crate::pricing::{PremiumQuote, BASE_PREMIUM};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuotationId(pub i64);

impl fmt::Display for QuotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A priced insurance offer. With `is_policy` set it represents an accepted policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Quotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<QuotationId>,
    #[serde(with = "rating::label")]
    pub sex: Option<Sex>,
    pub age: u32,
    #[serde(with = "rating::label")]
    pub county: Option<County>,
    pub model: String,
    #[serde(with = "rating::label")]
    pub emissions: Option<EmissionsClass>,
    #[serde(with = "rating::label")]
    pub insurance_category: Option<InsuranceCategory>,
    pub total_cost: i64,
    #[serde(with = "wire_date")]
    pub valid_until: Option<NaiveDate>,
    pub is_policy: bool,
    pub customer: Option<Customer>,
}

impl Default for Quotation {
    fn default() -> Self {
        Self {
            id: None,
            sex: None,
            age: 0,
            county: None,
            model: String::new(),
            emissions: None,
            insurance_category: None,
            total_cost: BASE_PREMIUM,
            valid_until: None,
            is_policy: false,
            customer: None,
        }
    }
}

/// One rated attribute of a quotation, identified without its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Criterion {
    Sex,
    Age,
    County,
    Model,
    Emissions,
    InsuranceCategory,
}

impl Criterion {
    pub const ALL: &'static [Self] = &[
        Self::Sex,
        Self::Age,
        Self::County,
        Self::Model,
        Self::Emissions,
        Self::InsuranceCategory,
    ];

    /// Row label in the quotation summary table.
    pub fn label(self) -> &'static str {
        match self {
            Self::Sex => "Sex",
            Self::Age => "Age",
            Self::County => "County",
            Self::Model => "Vehicle Model",
            Self::Emissions => "Emissions Class",
            Self::InsuranceCategory => "Insurance Category",
        }
    }
}

/// A rated attribute together with the value the operator picked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CriterionValue {
    Sex(Sex),
    Age(u32),
    County(County),
    Model { make: VehicleMake, model: String },
    Emissions(EmissionsClass),
    InsuranceCategory(InsuranceCategory),
}

impl CriterionValue {
    pub fn criterion(&self) -> Criterion {
        match self {
            Self::Sex(_) => Criterion::Sex,
            Self::Age(_) => Criterion::Age,
            Self::County(_) => Criterion::County,
            Self::Model { .. } => Criterion::Model,
            Self::Emissions(_) => Criterion::Emissions,
            Self::InsuranceCategory(_) => Criterion::InsuranceCategory,
        }
    }

    /// Text shown in the summary cell. Models show as `make-model`.
    pub fn display(&self) -> String {
        match self {
            Self::Sex(sex) => sex.to_string(),
            Self::Age(age) => age.to_string(),
            Self::County(county) => county.to_string(),
            Self::Model { make, model } => make.describe(model),
            Self::Emissions(emissions) => emissions.to_string(),
            Self::InsuranceCategory(category) => category.to_string(),
        }
    }
}

impl Quotation {
    /// Writes a rated attribute. Callers reprice afterwards.
    pub fn apply(&mut self, value: &CriterionValue) {
        match value {
            CriterionValue::Sex(sex) => self.sex = Some(*sex),
            CriterionValue::Age(age) => self.age = *age,
            CriterionValue::County(county) => self.county = Some(*county),
            CriterionValue::Model { model, .. } => self.model = model.clone(),
            CriterionValue::Emissions(emissions) => self.emissions = Some(*emissions),
            CriterionValue::InsuranceCategory(category) => {
                self.insurance_category = Some(*category)
            }
        }
    }

    pub fn apply_premium(&mut self, premium: &PremiumQuote) {
        self.total_cost = premium.total_cost;
        self.valid_until = Some(premium.valid_until);
    }

    /// Attaches an empty customer the first time; later calls keep what was entered.
    pub fn attach_customer(&mut self) -> &mut Customer {
        self.customer.get_or_insert_with(Customer::default)
    }

    /// Current display text for a criterion, empty when unset.
    pub fn display(&self, criterion: Criterion) -> String {
        match criterion {
            Criterion::Sex => self.sex.map(|sex| sex.to_string()).unwrap_or_default(),
            Criterion::Age if self.age == 0 => String::new(),
            Criterion::Age => self.age.to_string(),
            Criterion::County => self.county.map(|county| county.to_string()).unwrap_or_default(),
            Criterion::Model => match VehicleMake::of_model(&self.model) {
                Some(make) => make.describe(&self.model),
                None => self.model.clone(),
            },
            Criterion::Emissions => {
                self.emissions.map(|emissions| emissions.to_string()).unwrap_or_default()
            }
            Criterion::InsuranceCategory => {
                self.insurance_category.map(|category| category.to_string()).unwrap_or_default()
            }
        }
    }

    pub fn customer_name(&self) -> String {
        self.customer.as_ref().map(Customer::full_name).unwrap_or_default()
    }
}

/// Serde adapter for the store's `validUntil` timestamps.
///
/// Dates go out as midnight timestamps. Incoming values may be timestamps
/// (with or without offset) or bare dates; the year-one sentinel the store
/// uses for "never set" decodes as unset.
pub mod wire_date {
    use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value.and_then(|date| date.and_hms_opt(0, 0, 0)) {
            Some(timestamp) => serializer.serialize_str(&timestamp.format(WIRE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let date = parse(raw)
            .ok_or_else(|| de::Error::custom(format!("invalid validUntil timestamp `{raw}`")))?;
        Ok((date.year() > 1).then_some(date))
    }

    fn parse(raw: &str) -> Option<NaiveDate> {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(timestamp.date());
        }
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
            return Some(timestamp.date_naive());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::{Criterion, CriterionValue, Quotation, QuotationId};
    use crate::domain::rating::{County, EmissionsClass, InsuranceCategory, Sex};
    use crate::domain::vehicle::VehicleMake;

    #[test]
    fn new_quotation_has_no_identity_or_customer() {
        let quotation = Quotation::default();
        assert_eq!(quotation.id, None);
        assert_eq!(quotation.customer, None);
        assert!(!quotation.is_policy);
        assert_eq!(quotation.total_cost, 1000);
    }

    #[test]
    fn applying_values_updates_only_the_matching_field() {
        let mut quotation = Quotation::default();
        quotation.apply(&CriterionValue::Model {
            make: VehicleMake::Bmw,
            model: "Z4 Roadster".to_string(),
        });
        quotation.apply(&CriterionValue::County(County::Kerry));

        assert_eq!(quotation.model, "Z4 Roadster");
        assert_eq!(quotation.county, Some(County::Kerry));
        assert_eq!(quotation.sex, None);
        assert_eq!(quotation.display(Criterion::Model), "BMW-Z4 Roadster");
        assert_eq!(quotation.display(Criterion::Age), "");
    }

    #[test]
    fn attach_customer_keeps_existing_details() {
        let mut quotation = Quotation::default();
        quotation.attach_customer().first_name = "Sean".to_string();
        quotation.attach_customer();

        assert_eq!(quotation.customer_name(), "Sean");
    }

    #[test]
    fn encodes_the_store_wire_shape() {
        let mut quotation = Quotation::default();
        quotation.sex = Some(Sex::Female);
        quotation.age = 42;
        quotation.insurance_category = Some(InsuranceCategory::ThirdPartyFireAndTheft);
        quotation.valid_until = NaiveDate::from_ymd_opt(2026, 11, 19);

        let encoded = serde_json::to_value(&quotation).expect("encode quotation");

        assert_eq!(encoded.get("id"), None);
        assert_eq!(encoded["sex"], "Female");
        assert_eq!(encoded["county"], "");
        assert_eq!(encoded["insuranceCategory"], "Third Party Fire and Theft");
        assert_eq!(encoded["validUntil"], "2026-11-19T00:00:00");
        assert_eq!(encoded["isPolicy"], false);
    }

    #[test]
    fn decodes_store_payloads() {
        let quotation: Quotation = serde_json::from_value(json!({
            "id": 17,
            "sex": "Male",
            "age": 30,
            "county": "Cork",
            "model": "Corsa",
            "emissions": "Low",
            "insuranceCategory": "Fully Comprehensive",
            "totalCost": 1425,
            "validUntil": "2027-10-19T00:00:00",
            "isPolicy": true,
            "customer": { "id": 3, "firstName": "Ciara", "surname": "Walsh" }
        }))
        .expect("decode quotation");

        assert_eq!(quotation.id, Some(QuotationId(17)));
        assert_eq!(quotation.emissions, Some(EmissionsClass::Low));
        assert_eq!(quotation.valid_until, NaiveDate::from_ymd_opt(2027, 10, 19));
        assert_eq!(quotation.customer_name(), "Ciara Walsh");
        assert!(quotation.is_policy);
    }

    #[test]
    fn year_one_sentinel_and_unknown_labels_decode_as_unset() {
        let quotation: Quotation = serde_json::from_value(json!({
            "county": "Dublin",
            "validUntil": "0001-01-01T00:00:00"
        }))
        .expect("decode quotation");

        assert_eq!(quotation.county, None);
        assert_eq!(quotation.valid_until, None);
        assert_eq!(quotation.total_cost, 1000);
    }
}

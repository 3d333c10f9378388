//! Rated attributes of a quotation.
//!
//! Every enumerated attribute travels over the wire and appears on screen as
//! its display label, so each one implements [`RatedAttribute`] and shares the
//! same label lookup and serde handling.

use std::fmt;

pub trait RatedAttribute: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.iter().copied().find(|value| value.label().eq_ignore_ascii_case(raw))
    }
}

macro_rules! rated_attribute {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl RatedAttribute for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

rated_attribute!(Sex {
    Male => "Male",
    Female => "Female",
});

// Menu order.
rated_attribute!(County {
    Limerick => "Limerick",
    Tipperary => "Tipperary",
    Cork => "Cork",
    Clare => "Clare",
    Kerry => "Kerry",
    Waterford => "Waterford",
});

rated_attribute!(EmissionsClass {
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

rated_attribute!(InsuranceCategory {
    FullyComprehensive => "Fully Comprehensive",
    ThirdPartyFireAndTheft => "Third Party Fire and Theft",
});

/// Serde adapter for `Option<A>` where an unset attribute is the empty string.
///
/// Labels the client does not recognise decode as unset; they price at zero
/// either way.
pub mod label {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::RatedAttribute;

    pub fn serialize<A, S>(value: &Option<A>, serializer: S) -> Result<S::Ok, S::Error>
    where
        A: RatedAttribute,
        S: Serializer,
    {
        serializer.serialize_str(value.map(RatedAttribute::label).unwrap_or(""))
    }

    pub fn deserialize<'de, A, D>(deserializer: D) -> Result<Option<A>, D::Error>
    where
        A: RatedAttribute,
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(A::from_label))
    }
}

#[cfg(test)]
mod tests {
    use super::{County, EmissionsClass, InsuranceCategory, RatedAttribute, Sex};

    #[test]
    fn labels_resolve_case_insensitively() {
        assert_eq!(Sex::from_label("male"), Some(Sex::Male));
        assert_eq!(County::from_label(" Waterford "), Some(County::Waterford));
        assert_eq!(
            InsuranceCategory::from_label("Third Party Fire and Theft"),
            Some(InsuranceCategory::ThirdPartyFireAndTheft)
        );
    }

    #[test]
    fn unknown_and_empty_labels_are_unset() {
        assert_eq!(County::from_label("Dublin"), None);
        assert_eq!(EmissionsClass::from_label(""), None);
    }

    #[test]
    fn menu_order_is_stable() {
        let counties: Vec<_> = County::ALL.iter().map(|county| county.label()).collect();
        assert_eq!(counties, ["Limerick", "Tipperary", "Cork", "Clare", "Kerry", "Waterford"]);
    }
}

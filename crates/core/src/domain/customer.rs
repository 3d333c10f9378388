use serde::{Deserialize, Serialize};

/// The customer a quotation is written for. Every field is free text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Assigned by the store; carried through round trips only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub county: String,
    #[serde(default)]
    pub eircode: String,
    #[serde(default)]
    pub phone_number: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CustomerField {
    FirstName,
    Surname,
    Street,
    County,
    Eircode,
    PhoneNumber,
}

impl CustomerField {
    pub const ALL: &'static [Self] = &[
        Self::FirstName,
        Self::Surname,
        Self::Street,
        Self::County,
        Self::Eircode,
        Self::PhoneNumber,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::Surname => "Surname",
            Self::Street => "Street",
            Self::County => "County",
            Self::Eircode => "Eircode",
            Self::PhoneNumber => "Phone Number",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Self::FirstName => "First Name:",
            Self::Surname => "Surname:",
            Self::Street => "Address Street:",
            Self::County => "Address County:",
            Self::Eircode => "Address Eircode:",
            Self::PhoneNumber => "Phone Number:",
        }
    }
}

impl Customer {
    pub fn get(&self, field: CustomerField) -> &str {
        match field {
            CustomerField::FirstName => &self.first_name,
            CustomerField::Surname => &self.surname,
            CustomerField::Street => &self.street,
            CustomerField::County => &self.county,
            CustomerField::Eircode => &self.eircode,
            CustomerField::PhoneNumber => &self.phone_number,
        }
    }

    pub fn set(&mut self, field: CustomerField, value: String) {
        let slot = match field {
            CustomerField::FirstName => &mut self.first_name,
            CustomerField::Surname => &mut self.surname,
            CustomerField::Street => &mut self.street,
            CustomerField::County => &mut self.county,
            CustomerField::Eircode => &mut self.eircode,
            CustomerField::PhoneNumber => &mut self.phone_number,
        };
        *slot = value;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.surname).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{Customer, CustomerField};

    #[test]
    fn set_and_get_address_the_same_field() {
        let mut customer = Customer::default();
        for field in CustomerField::ALL {
            customer.set(*field, field.label().to_uppercase());
        }

        assert_eq!(customer.get(CustomerField::Eircode), "EIRCODE");
        assert_eq!(customer.phone_number, "PHONE NUMBER");
        assert_eq!(customer.full_name(), "FIRST NAME SURNAME");
    }

    #[test]
    fn decodes_store_payload_with_missing_fields() {
        let customer: Customer =
            serde_json::from_str(r#"{"id":4,"firstName":"Aoife","phoneNumber":"087 123"}"#)
                .expect("customer json");

        assert_eq!(customer.id, Some(4));
        assert_eq!(customer.first_name, "Aoife");
        assert!(customer.surname.is_empty());
    }
}

use crate::domain::customer::CustomerField;
use crate::domain::quotation::{Criterion, Quotation};
use crate::ports::ExpiringKind;

/// A closed set of options offered by one menu.
pub trait MenuChoice: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;
}

macro_rules! menu {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl MenuChoice for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }
    };
}

menu!(MainMenuChoice {
    GenerateQuotation => "Generate New Quotation",
    SearchQuotation => "Search for Quotation",
    SearchPolicy => "Search for Policy",
    Reports => "Reports",
    Exit => "Exit",
});

menu!(CriteriaMenuChoice {
    Sex => "Sex",
    Age => "Age",
    County => "County",
    Model => "Model",
    EmissionsCategory => "Emissions Category",
    InsuranceCategory => "Insurance Category",
    SaveQuotation => "Save Quotation",
    MainMenu => "Main Menu",
});

menu!(CustomerMenuChoice {
    FirstName => "First Name",
    Surname => "Surname",
    Street => "Street",
    County => "County",
    Eircode => "Eircode",
    PhoneNumber => "Phone Number",
    SaveQuotation => "Save Quotation",
    Back => "Back",
    MainMenu => "Main Menu",
});

menu!(SearchMenuChoice {
    SearchById => "Search By ID",
    MainMenu => "Main Menu",
});

menu!(PolicyFoundChoice {
    SearchById => "Search By ID",
    GenerateCertificate => "Generate Policy Certificate",
    MainMenu => "Main Menu",
});

menu!(ConvertChoice {
    ConvertToPolicy => "Convert to Policy",
    MainMenu => "Main Menu",
});

menu!(CertificateChoice {
    GenerateCertificate => "Generate Certificate",
    MainMenu => "Main Menu",
});

menu!(ReportsMenuChoice {
    ExpiringPolicies => "Expiring Policies",
    ExpiringQuotations => "Expiring Quotations",
    MainMenu => "Main Menu",
});

menu!(ReportActionChoice {
    SaveReport => "Save Report",
    Back => "Back",
    MainMenu => "Main Menu",
});

impl CriteriaMenuChoice {
    pub fn criterion(self) -> Option<Criterion> {
        match self {
            Self::Sex => Some(Criterion::Sex),
            Self::Age => Some(Criterion::Age),
            Self::County => Some(Criterion::County),
            Self::Model => Some(Criterion::Model),
            Self::EmissionsCategory => Some(Criterion::Emissions),
            Self::InsuranceCategory => Some(Criterion::InsuranceCategory),
            Self::SaveQuotation | Self::MainMenu => None,
        }
    }
}

impl CustomerMenuChoice {
    pub fn field(self) -> Option<CustomerField> {
        match self {
            Self::FirstName => Some(CustomerField::FirstName),
            Self::Surname => Some(CustomerField::Surname),
            Self::Street => Some(CustomerField::Street),
            Self::County => Some(CustomerField::County),
            Self::Eircode => Some(CustomerField::Eircode),
            Self::PhoneNumber => Some(CustomerField::PhoneNumber),
            Self::SaveQuotation | Self::Back | Self::MainMenu => None,
        }
    }
}

/// Where the session is. States that work on a quotation own it; leaving
/// them without passing it on discards it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkflowState {
    MainMenu,
    CriteriaMenu(Quotation),
    EditCriterion(Quotation, Criterion),
    CustomerMenu(Quotation),
    EditCustomer(Quotation, CustomerField),
    SaveConfirm(Quotation),
    SearchQuotationMenu,
    SearchQuotationById,
    SearchPolicyMenu,
    SearchPolicyById,
    PolicyFound(Quotation),
    ConvertToPolicy(Quotation),
    GenerateCertificate(Quotation),
    ReportsMenu,
    ExpiringReport(ExpiringKind),
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateKind {
    MainMenu,
    CriteriaMenu,
    EditCriterion,
    CustomerMenu,
    EditCustomer,
    SaveConfirm,
    SearchQuotationMenu,
    SearchQuotationById,
    SearchPolicyMenu,
    SearchPolicyById,
    PolicyFound,
    ConvertToPolicy,
    GenerateCertificate,
    ReportsMenu,
    ExpiringReport,
    Exit,
}

impl WorkflowState {
    pub fn kind(&self) -> StateKind {
        match self {
            Self::MainMenu => StateKind::MainMenu,
            Self::CriteriaMenu(_) => StateKind::CriteriaMenu,
            Self::EditCriterion(..) => StateKind::EditCriterion,
            Self::CustomerMenu(_) => StateKind::CustomerMenu,
            Self::EditCustomer(..) => StateKind::EditCustomer,
            Self::SaveConfirm(_) => StateKind::SaveConfirm,
            Self::SearchQuotationMenu => StateKind::SearchQuotationMenu,
            Self::SearchQuotationById => StateKind::SearchQuotationById,
            Self::SearchPolicyMenu => StateKind::SearchPolicyMenu,
            Self::SearchPolicyById => StateKind::SearchPolicyById,
            Self::PolicyFound(_) => StateKind::PolicyFound,
            Self::ConvertToPolicy(_) => StateKind::ConvertToPolicy,
            Self::GenerateCertificate(_) => StateKind::GenerateCertificate,
            Self::ReportsMenu => StateKind::ReportsMenu,
            Self::ExpiringReport(_) => StateKind::ExpiringReport,
            Self::Exit => StateKind::Exit,
        }
    }

    /// The quotation this state carries, if any.
    pub fn quotation(&self) -> Option<&Quotation> {
        match self {
            Self::CriteriaMenu(quotation)
            | Self::EditCriterion(quotation, _)
            | Self::CustomerMenu(quotation)
            | Self::EditCustomer(quotation, _)
            | Self::SaveConfirm(quotation)
            | Self::PolicyFound(quotation)
            | Self::ConvertToPolicy(quotation)
            | Self::GenerateCertificate(quotation) => Some(quotation),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exit)
    }
}

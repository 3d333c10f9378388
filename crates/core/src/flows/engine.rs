use chrono::{Local, NaiveDate};
use tracing::{debug, error, info, warn};

use crate::domain::customer::CustomerField;
use crate::domain::quotation::{Criterion, CriterionValue, Quotation, QuotationId};
use crate::domain::rating::{County, EmissionsClass, InsuranceCategory, RatedAttribute, Sex};
use crate::domain::vehicle::VehicleMake;
use crate::errors::{PresentationError, StoreError, WorkflowError};
use crate::flows::states::{
    CertificateChoice, ConvertChoice, CriteriaMenuChoice, CustomerMenuChoice, MainMenuChoice,
    MenuChoice, PolicyFoundChoice, ReportActionChoice, ReportsMenuChoice, SearchMenuChoice,
    WorkflowState,
};
use crate::flows::summary::{
    format_cost, format_date, SummaryTable, TOTAL_COST_ROW, VALID_UNTIL_ROW,
};
use crate::ports::{DocumentService, ExpiringKind, PresentationPort, QuotationStore};
use crate::pricing::{DeterministicPricingEngine, PricingEngine};

pub const MIN_AGE: i64 = 17;
pub const MAX_AGE: i64 = 87;

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;
type Step = Result<WorkflowState, PresentationError>;

/// Age prompt rule: drivers from 17 up to and including 87.
pub fn validate_age(age: i64) -> Result<(), String> {
    if age < MIN_AGE {
        return Err(format!("Must be {MIN_AGE} or older."));
    }
    if age > MAX_AGE {
        return Err(format!("Must be younger than {}.", MAX_AGE + 1));
    }
    Ok(())
}

/// Re-checks an answer from the age prompt; a presenter that skipped the
/// validator gets an error instead of an unset age.
fn accepted_age(age: i64) -> Result<u32, PresentationError> {
    validate_age(age)
        .and_then(|()| u32::try_from(age).map_err(|error| error.to_string()))
        .map_err(|reason| PresentationError::RejectedValue { value: age, reason })
}

fn accept_any_id(_id: i64) -> Result<(), String> {
    Ok(())
}

/// Lookup kinds share the retry routing; only wording and the store call differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lookup {
    Quotation,
    Policy,
}

impl Lookup {
    fn noun(self) -> &'static str {
        match self {
            Self::Quotation => "Quotation",
            Self::Policy => "Policy",
        }
    }

    fn retry_state(self) -> WorkflowState {
        match self {
            Self::Quotation => WorkflowState::SearchQuotationById,
            Self::Policy => WorkflowState::SearchPolicyById,
        }
    }

    fn abandon_state(self) -> WorkflowState {
        match self {
            Self::Quotation => WorkflowState::SearchQuotationMenu,
            Self::Policy => WorkflowState::SearchPolicyMenu,
        }
    }

    fn found_state(self, quotation: Quotation) -> WorkflowState {
        match self {
            Self::Quotation => WorkflowState::ConvertToPolicy(quotation),
            Self::Policy => WorkflowState::PolicyFound(quotation),
        }
    }
}

/// Drives one operator session from the main menu until exit.
///
/// The quotation being worked on travels inside [`WorkflowState`]; the
/// engine itself only holds the collaborators and the two summary tables
/// the screens keep in sync with it.
pub struct WorkflowEngine<P, S, D, E = DeterministicPricingEngine> {
    presenter: P,
    store: S,
    documents: D,
    pricing: E,
    clock: Clock,
    quotation_table: SummaryTable,
    customer_table: SummaryTable,
}

impl<P, S, D> WorkflowEngine<P, S, D, DeterministicPricingEngine>
where
    P: PresentationPort,
    S: QuotationStore,
    D: DocumentService,
{
    pub fn new(presenter: P, store: S, documents: D) -> Self {
        Self::with_pricing(presenter, store, documents, DeterministicPricingEngine)
    }
}

impl<P, S, D, E> WorkflowEngine<P, S, D, E>
where
    P: PresentationPort,
    S: QuotationStore,
    D: DocumentService,
    E: PricingEngine,
{
    pub fn with_pricing(presenter: P, store: S, documents: D, pricing: E) -> Self {
        let fresh = Quotation::default();
        Self {
            presenter,
            store,
            documents,
            pricing,
            clock: Box::new(|| Local::now().date_naive()),
            quotation_table: SummaryTable::for_quotation(&fresh),
            customer_table: SummaryTable::for_customer(None),
        }
    }

    /// Replaces the calendar used to compute validity dates.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn quotation_table(&self) -> &SummaryTable {
        &self.quotation_table
    }

    pub fn customer_table(&self) -> &SummaryTable {
        &self.customer_table
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Runs from the main menu until the operator exits.
    pub async fn run(&mut self) -> Result<(), WorkflowError> {
        info!(event_name = "workflow.session.started", "session started");
        let mut state = WorkflowState::MainMenu;
        while !state.is_terminal() {
            state = self.step(state).await?;
        }
        info!(event_name = "workflow.session.finished", "session finished");
        Ok(())
    }

    /// Handles one state and returns the next.
    pub async fn step(&mut self, state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        let from = state.kind();
        let next = match state {
            WorkflowState::MainMenu => self.main_menu()?,
            WorkflowState::CriteriaMenu(quotation) => self.criteria_menu(quotation)?,
            WorkflowState::EditCriterion(quotation, criterion) => {
                self.edit_criterion(quotation, criterion)?
            }
            WorkflowState::CustomerMenu(quotation) => self.customer_menu(quotation)?,
            WorkflowState::EditCustomer(quotation, field) => self.edit_customer(quotation, field)?,
            WorkflowState::SaveConfirm(quotation) => self.save_confirm(quotation).await?,
            WorkflowState::SearchQuotationMenu => self.search_menu(Lookup::Quotation)?,
            WorkflowState::SearchQuotationById => self.search_by_id(Lookup::Quotation).await?,
            WorkflowState::SearchPolicyMenu => self.search_menu(Lookup::Policy)?,
            WorkflowState::SearchPolicyById => self.search_by_id(Lookup::Policy).await?,
            WorkflowState::PolicyFound(policy) => self.policy_found(policy).await?,
            WorkflowState::ConvertToPolicy(quotation) => self.convert_to_policy(quotation).await?,
            WorkflowState::GenerateCertificate(policy) => {
                self.generate_certificate(policy).await?
            }
            WorkflowState::ReportsMenu => self.reports_menu()?,
            WorkflowState::ExpiringReport(kind) => self.expiring_report(kind).await?,
            WorkflowState::Exit => WorkflowState::Exit,
        };
        debug!(
            event_name = "workflow.transition",
            from = ?from,
            to = ?next.kind(),
            "workflow transition"
        );
        Ok(next)
    }

    fn main_menu(&mut self) -> Step {
        self.presenter.banner("Main Menu")?;
        let next = match self.choose_menu::<MainMenuChoice>("Please select an option")? {
            MainMenuChoice::GenerateQuotation => {
                WorkflowState::CriteriaMenu(self.start_quotation())
            }
            MainMenuChoice::SearchQuotation => WorkflowState::SearchQuotationMenu,
            MainMenuChoice::SearchPolicy => WorkflowState::SearchPolicyMenu,
            MainMenuChoice::Reports => WorkflowState::ReportsMenu,
            MainMenuChoice::Exit => {
                self.presenter.banner("Exiting...")?;
                WorkflowState::Exit
            }
        };
        Ok(next)
    }

    fn start_quotation(&mut self) -> Quotation {
        let mut quotation = Quotation::default();
        self.customer_table = SummaryTable::for_customer(None);
        self.quotation_table = SummaryTable::for_quotation(&quotation);
        self.reprice(&mut quotation);
        quotation
    }

    fn criteria_menu(&mut self, mut quotation: Quotation) -> Step {
        self.presenter.render_summary(&self.quotation_table)?;
        self.presenter.banner("Create New Quotation")?;
        let choice = self.choose_menu::<CriteriaMenuChoice>("Please select a menu option")?;
        if let Some(criterion) = choice.criterion() {
            return Ok(WorkflowState::EditCriterion(quotation, criterion));
        }
        let next = match choice {
            CriteriaMenuChoice::SaveQuotation => {
                quotation.attach_customer();
                WorkflowState::CustomerMenu(quotation)
            }
            _ => WorkflowState::MainMenu,
        };
        Ok(next)
    }

    fn edit_criterion(&mut self, mut quotation: Quotation, criterion: Criterion) -> Step {
        let value = self.prompt_criterion(criterion)?;
        quotation.apply(&value);
        self.quotation_table.set(criterion.label(), value.display());
        self.reprice(&mut quotation);
        debug!(
            event_name = "workflow.quotation.repriced",
            criterion = criterion.label(),
            total_cost = quotation.total_cost,
            "quotation repriced"
        );
        Ok(WorkflowState::CriteriaMenu(quotation))
    }

    fn prompt_criterion(
        &mut self,
        criterion: Criterion,
    ) -> Result<CriterionValue, PresentationError> {
        let value = match criterion {
            Criterion::Sex => CriterionValue::Sex(self.choose_rated::<Sex>("Please select a sex")?),
            Criterion::Age => {
                let age = self.presenter.prompt_int("Customer Age:", &validate_age)?;
                CriterionValue::Age(accepted_age(age)?)
            }
            Criterion::County => {
                CriterionValue::County(self.choose_rated::<County>("Please select a county")?)
            }
            Criterion::Model => {
                let make = self.choose(
                    "Please select a vehicle make",
                    VehicleMake::ALL,
                    |make| make.label(),
                )?;
                let model = self.choose(
                    &format!("Please select a {} model", make.label()),
                    make.models(),
                    |model| model,
                )?;
                CriterionValue::Model { make, model: model.to_string() }
            }
            Criterion::Emissions => CriterionValue::Emissions(
                self.choose_rated::<EmissionsClass>("Please select a vehicle emissions class")?,
            ),
            Criterion::InsuranceCategory => CriterionValue::InsuranceCategory(
                self.choose_rated::<InsuranceCategory>("Please select an insurance category")?,
            ),
        };
        Ok(value)
    }

    fn customer_menu(&mut self, quotation: Quotation) -> Step {
        self.presenter.render_summary(&self.customer_table)?;
        self.presenter.banner("Create New Customer")?;
        let choice = self.choose_menu::<CustomerMenuChoice>("Please select a menu option")?;
        if let Some(field) = choice.field() {
            return Ok(WorkflowState::EditCustomer(quotation, field));
        }
        let next = match choice {
            CustomerMenuChoice::SaveQuotation => WorkflowState::SaveConfirm(quotation),
            CustomerMenuChoice::Back => WorkflowState::CriteriaMenu(quotation),
            _ => WorkflowState::MainMenu,
        };
        Ok(next)
    }

    fn edit_customer(&mut self, mut quotation: Quotation, field: CustomerField) -> Step {
        let value = self.presenter.prompt_text(field.prompt())?;
        self.customer_table.set(field.label(), value.as_str());
        quotation.attach_customer().set(field, value);
        Ok(WorkflowState::CustomerMenu(quotation))
    }

    async fn save_confirm(&mut self, mut quotation: Quotation) -> Step {
        self.presenter.banner("Save Quotation?")?;
        if !self.presenter.confirm("Would you like to save the quotation to the database?")? {
            return Ok(WorkflowState::CriteriaMenu(quotation));
        }

        // Validity restarts from the day the quotation is persisted.
        self.reprice(&mut quotation);
        match self.store.save_quotation(&quotation).await {
            Ok(Some(saved)) => {
                info!(
                    event_name = "workflow.quotation.saved",
                    quotation_id = ?saved.id,
                    total_cost = saved.total_cost,
                    "quotation saved"
                );
                Ok(WorkflowState::ConvertToPolicy(saved))
            }
            Ok(None) => {
                warn!(
                    event_name = "workflow.quotation.save_rejected",
                    "store did not save quotation"
                );
                self.presenter.notify_error("The quotation could not be saved.")?;
                Ok(WorkflowState::CustomerMenu(quotation))
            }
            Err(store_error) => {
                self.report_store_error("save_quotation", &store_error)?;
                Ok(WorkflowState::CustomerMenu(quotation))
            }
        }
    }

    fn search_menu(&mut self, lookup: Lookup) -> Step {
        let (title, prompt) = match lookup {
            Lookup::Quotation => {
                ("Search for Quotation", "What criteria would you like to search by?")
            }
            Lookup::Policy => ("Search for Policy", "What criteria would you like to search for?"),
        };
        self.presenter.banner(title)?;
        let next = match self.choose_menu::<SearchMenuChoice>(prompt)? {
            SearchMenuChoice::SearchById => lookup.retry_state(),
            SearchMenuChoice::MainMenu => WorkflowState::MainMenu,
        };
        Ok(next)
    }

    async fn search_by_id(&mut self, lookup: Lookup) -> Step {
        let noun = lookup.noun();
        self.presenter.banner(&format!("Search for {noun} - ID"))?;
        let raw_id = self.presenter.prompt_int(&format!("{noun} ID:"), &accept_any_id)?;
        let id = QuotationId(raw_id);

        let result = match lookup {
            Lookup::Quotation => self.store.get_quotation(id).await,
            Lookup::Policy => self.store.get_policy(id).await,
        };
        let retry_prompt = match result {
            Ok(Some(found)) => {
                info!(
                    event_name = "workflow.lookup.found",
                    kind = noun,
                    id = raw_id,
                    "record found"
                );
                return Ok(lookup.found_state(found));
            }
            Ok(None) => {
                info!(
                    event_name = "workflow.lookup.not_found",
                    kind = noun,
                    id = raw_id,
                    "record not found"
                );
                format!("{noun} not found - Try another ID?")
            }
            Err(store_error) => {
                self.report_store_error("lookup", &store_error)?;
                "Quotation store unavailable - Try again?".to_string()
            }
        };

        if self.presenter.confirm(&retry_prompt)? {
            Ok(lookup.retry_state())
        } else {
            Ok(lookup.abandon_state())
        }
    }

    async fn policy_found(&mut self, policy: Quotation) -> Step {
        self.presenter.render_quotation(&policy)?;
        let choice =
            self.choose_menu::<PolicyFoundChoice>("What would you like to do with this policy?")?;
        let next = match choice {
            PolicyFoundChoice::SearchById => WorkflowState::SearchPolicyById,
            PolicyFoundChoice::GenerateCertificate => {
                self.issue_certificate(&policy).await?;
                WorkflowState::MainMenu
            }
            PolicyFoundChoice::MainMenu => WorkflowState::MainMenu,
        };
        Ok(next)
    }

    async fn convert_to_policy(&mut self, quotation: Quotation) -> Step {
        self.presenter.render_quotation(&quotation)?;
        self.presenter.banner("Convert Quotation to Policy")?;
        let choice = self
            .choose_menu::<ConvertChoice>("Would you like to convert this quotation to a policy?")?;
        if choice == ConvertChoice::MainMenu {
            return Ok(WorkflowState::MainMenu);
        }

        let Some(id) = quotation.id else {
            warn!(
                event_name = "workflow.policy.unsaved",
                "conversion requested for unsaved quotation"
            );
            self.presenter.notify_error("Only saved quotations can be converted to a policy.")?;
            return Ok(WorkflowState::MainMenu);
        };

        match self.store.convert_to_policy(id).await {
            Ok(Some(policy)) => {
                info!(
                    event_name = "workflow.policy.converted",
                    quotation_id = %id,
                    "quotation converted"
                );
                Ok(WorkflowState::GenerateCertificate(policy))
            }
            Ok(None) => {
                warn!(
                    event_name = "workflow.policy.convert_rejected",
                    quotation_id = %id,
                    "store did not convert quotation"
                );
                self.presenter
                    .notify_error(&format!("Quotation {id} could not be converted to a policy."))?;
                Ok(WorkflowState::MainMenu)
            }
            Err(store_error) => {
                self.report_store_error("convert_to_policy", &store_error)?;
                Ok(WorkflowState::MainMenu)
            }
        }
    }

    async fn generate_certificate(&mut self, policy: Quotation) -> Step {
        self.presenter.render_quotation(&policy)?;
        self.presenter.banner("Create Policy Certificate")?;
        let choice = self.choose_menu::<CertificateChoice>(
            "Would you like to generate a certificate for the policy?",
        )?;
        if choice == CertificateChoice::GenerateCertificate {
            self.issue_certificate(&policy).await?;
        }
        Ok(WorkflowState::MainMenu)
    }

    async fn issue_certificate(&mut self, policy: &Quotation) -> Result<(), PresentationError> {
        match self.documents.create_certificate(policy).await {
            Ok(path) => {
                info!(
                    event_name = "workflow.certificate.created",
                    policy_id = ?policy.id,
                    path = %path.display(),
                    "certificate created"
                );
                self.presenter.banner(&format!("Certificate saved to {}", path.display()))
            }
            Err(document_error) => {
                error!(
                    event_name = "workflow.certificate.failed",
                    policy_id = ?policy.id,
                    error = %document_error,
                    "certificate generation failed"
                );
                self.presenter.notify_error("The policy certificate could not be generated.")
            }
        }
    }

    fn reports_menu(&mut self) -> Step {
        self.presenter.banner("Generate Reports")?;
        let next = match self.choose_menu::<ReportsMenuChoice>("Please select a menu option")? {
            ReportsMenuChoice::ExpiringPolicies => {
                WorkflowState::ExpiringReport(ExpiringKind::Policies)
            }
            ReportsMenuChoice::ExpiringQuotations => {
                WorkflowState::ExpiringReport(ExpiringKind::Quotations)
            }
            ReportsMenuChoice::MainMenu => WorkflowState::MainMenu,
        };
        Ok(next)
    }

    async fn expiring_report(&mut self, kind: ExpiringKind) -> Step {
        let label = kind.report_label();
        let quotations = match self.store.list_expiring(kind).await {
            Ok(quotations) => quotations,
            Err(store_error) => {
                self.report_store_error("list_expiring", &store_error)?;
                return Ok(WorkflowState::ReportsMenu);
            }
        };

        self.presenter.render_expiring(&quotations, label)?;
        self.presenter.banner(label)?;
        let next = match self.choose_menu::<ReportActionChoice>("Please select a menu option")? {
            ReportActionChoice::SaveReport => {
                match self.documents.create_expiring_report(&quotations, label).await {
                    Ok(path) => {
                        info!(
                            event_name = "workflow.report.created",
                            report = label,
                            rows = quotations.len(),
                            path = %path.display(),
                            "report created"
                        );
                        self.presenter.banner(&format!("Report saved to {}", path.display()))?;
                    }
                    Err(document_error) => {
                        error!(
                            event_name = "workflow.report.failed",
                            report = label,
                            error = %document_error,
                            "report generation failed"
                        );
                        self.presenter.notify_error("The report could not be generated.")?;
                    }
                }
                WorkflowState::MainMenu
            }
            ReportActionChoice::Back => WorkflowState::ReportsMenu,
            ReportActionChoice::MainMenu => WorkflowState::MainMenu,
        };
        Ok(next)
    }

    fn reprice(&mut self, quotation: &mut Quotation) {
        let premium = self.pricing.price(quotation, (self.clock)());
        quotation.apply_premium(&premium);
        self.quotation_table.set(TOTAL_COST_ROW, format_cost(quotation.total_cost));
        self.quotation_table.set(VALID_UNTIL_ROW, format_date(quotation.valid_until));
    }

    fn report_store_error(
        &mut self,
        operation: &'static str,
        store_error: &StoreError,
    ) -> Result<(), PresentationError> {
        error!(
            event_name = "workflow.store.failed",
            operation,
            error = %store_error,
            "quotation store call failed"
        );
        self.presenter.notify_error(store_error.user_message())
    }

    fn choose_menu<C: MenuChoice>(&mut self, prompt: &str) -> Result<C, PresentationError> {
        self.choose(prompt, C::ALL, |choice| choice.label())
    }

    fn choose_rated<A: RatedAttribute>(&mut self, prompt: &str) -> Result<A, PresentationError> {
        self.choose(prompt, A::ALL, |attribute| attribute.label())
    }

    fn choose<T: Copy>(
        &mut self,
        prompt: &str,
        items: &[T],
        label: impl Fn(T) -> &'static str,
    ) -> Result<T, PresentationError> {
        let labels: Vec<&str> = items.iter().map(|item| label(*item)).collect();
        let index = self.presenter.prompt_choice(prompt, &labels)?;
        items
            .get(index)
            .copied()
            .ok_or(PresentationError::InvalidChoice { index, options: items.len() })
    }
}

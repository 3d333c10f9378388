use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Days, Local, Months, NaiveDate};
use tokio::sync::RwLock;
use tracing::debug;

use mmi_core::domain::quotation::{Quotation, QuotationId};
use mmi_core::errors::StoreError;
use mmi_core::ports::{ExpiringKind, QuotationStore};

/// Policies run for a year from conversion.
pub const POLICY_TERM_MONTHS: u32 = 12;

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Default)]
struct Records {
    by_id: BTreeMap<i64, Quotation>,
    last_id: i64,
}

/// Process-local store with the same contract as the web API. Used for
/// offline sessions and workflow tests.
pub struct InMemoryQuotationStore {
    records: RwLock<Records>,
    clock: Clock,
}

impl Default for InMemoryQuotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQuotationStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records::default()),
            clock: Box::new(|| Local::now().date_naive()),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Stores a record as-is, assigning an id when it has none.
    pub async fn insert(&self, mut quotation: Quotation) -> QuotationId {
        let mut records = self.records.write().await;
        let id = match quotation.id {
            Some(id) => id,
            None => QuotationId(records.last_id + 1),
        };
        records.last_id = records.last_id.max(id.0);
        quotation.id = Some(id);
        records.by_id.insert(id.0, quotation);
        id
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn find(&self, id: QuotationId, is_policy: bool) -> Option<Quotation> {
        let records = self.records.read().await;
        records.by_id.get(&id.0).filter(|record| record.is_policy == is_policy).cloned()
    }
}

#[async_trait]
impl QuotationStore for InMemoryQuotationStore {
    async fn get_quotation(&self, id: QuotationId) -> Result<Option<Quotation>, StoreError> {
        Ok(self.find(id, false).await)
    }

    async fn get_policy(&self, id: QuotationId) -> Result<Option<Quotation>, StoreError> {
        Ok(self.find(id, true).await)
    }

    async fn save_quotation(
        &self,
        quotation: &Quotation,
    ) -> Result<Option<Quotation>, StoreError> {
        let mut saved = quotation.clone();
        saved.id = None;
        saved.is_policy = false;
        let id = self.insert(saved.clone()).await;
        saved.id = Some(id);
        debug!(event_name = "store.memory.saved", quotation_id = %id, "quotation stored");
        Ok(Some(saved))
    }

    async fn convert_to_policy(&self, id: QuotationId) -> Result<Option<Quotation>, StoreError> {
        let today = (self.clock)();
        let mut records = self.records.write().await;
        let Some(record) = records.by_id.get_mut(&id.0).filter(|record| !record.is_policy) else {
            return Ok(None);
        };

        record.is_policy = true;
        record.valid_until = today.checked_add_months(Months::new(POLICY_TERM_MONTHS));
        Ok(Some(record.clone()))
    }

    async fn list_expiring(&self, kind: ExpiringKind) -> Result<Vec<Quotation>, StoreError> {
        let today = (self.clock)();
        let window_days = u64::try_from(kind.window_days()).unwrap_or_default();
        let horizon = today.checked_add_days(Days::new(window_days)).unwrap_or(NaiveDate::MAX);
        let wants_policies = kind == ExpiringKind::Policies;

        let records = self.records.read().await;
        let mut expiring: Vec<Quotation> = records
            .by_id
            .values()
            .filter(|record| record.is_policy == wants_policies)
            .filter(|record| {
                record.valid_until.is_some_and(|expiry| expiry >= today && expiry <= horizon)
            })
            .cloned()
            .collect();
        expiring.sort_by_key(|record| record.valid_until);
        Ok(expiring)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use mmi_core::domain::quotation::{Quotation, QuotationId};
    use mmi_core::ports::{ExpiringKind, QuotationStore};

    use super::InMemoryQuotationStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    fn expiring_on(day: u32, month: u32, is_policy: bool) -> Quotation {
        Quotation {
            valid_until: NaiveDate::from_ymd_opt(2026, month, day),
            is_policy,
            ..Quotation::default()
        }
    }

    #[tokio::test]
    async fn save_assigns_sequential_ids() {
        let store = InMemoryQuotationStore::new().with_clock(today);

        let first = store.save_quotation(&Quotation::default()).await.expect("save");
        let second = store.save_quotation(&Quotation::default()).await.expect("save");

        assert_eq!(first.and_then(|saved| saved.id), Some(QuotationId(1)));
        assert_eq!(second.and_then(|saved| saved.id), Some(QuotationId(2)));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn quotations_and_policies_are_looked_up_separately() {
        let store = InMemoryQuotationStore::new().with_clock(today);
        let quotation = store.insert(expiring_on(1, 11, false)).await;
        let policy = store.insert(expiring_on(1, 11, true)).await;

        assert!(store.get_quotation(quotation).await.expect("get").is_some());
        assert!(store.get_policy(quotation).await.expect("get").is_none());
        assert!(store.get_policy(policy).await.expect("get").is_some());
        assert!(store.get_quotation(QuotationId(404)).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn conversion_starts_a_one_year_policy() {
        let store = InMemoryQuotationStore::new().with_clock(today);
        let id = store.insert(expiring_on(20, 10, false)).await;

        let policy = store.convert_to_policy(id).await.expect("convert").expect("converted");

        assert!(policy.is_policy);
        assert_eq!(policy.valid_until, NaiveDate::from_ymd_opt(2027, 10, 19));
        assert!(store.convert_to_policy(id).await.expect("convert").is_none());
    }

    #[tokio::test]
    async fn expiring_windows_depend_on_kind() {
        let store = InMemoryQuotationStore::new().with_clock(today);
        store.insert(expiring_on(21, 10, false)).await;
        store.insert(expiring_on(30, 10, false)).await;
        store.insert(expiring_on(18, 10, false)).await;
        store.insert(expiring_on(15, 11, true)).await;
        store.insert(expiring_on(19, 12, true)).await;

        let quotations = store.list_expiring(ExpiringKind::Quotations).await.expect("list");
        let policies = store.list_expiring(ExpiringKind::Policies).await.expect("list");

        assert_eq!(quotations.len(), 1);
        assert_eq!(quotations[0].valid_until, NaiveDate::from_ymd_opt(2026, 10, 21));
        assert_eq!(policies.len(), 1);
        assert_eq!(policies[0].valid_until, NaiveDate::from_ymd_opt(2026, 11, 15));
    }
}

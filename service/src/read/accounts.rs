//! Accounts [`Summary`] read model definition.

use std::{collections::HashMap, sync::Arc, time::Duration};

use common::{unit, DateTimeOf, Money};
use tokio::sync::RwLock;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::{bank_account, item, user, Account};

/// Summary of all the accounts linked by a [`User`], rendered on the
/// dashboard home view.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Summary {
    /// Linked [`Entry`]s, in the order the accounts were linked.
    pub accounts: Vec<Entry>,

    /// Number of linked banks.
    pub total_banks: usize,

    /// Sum of the current balances in the currency of the first account.
    ///
    /// Balances in other currencies are not included.
    pub total_current_balance: Money,
}

impl Summary {
    /// Builds a new [`Summary`] out of the provided [`Entry`]s.
    #[must_use]
    pub fn new(accounts: Vec<Entry>) -> Self {
        let currency = accounts
            .iter()
            .find_map(|e| e.account.balances.current)
            .map(|m| m.currency)
            .unwrap_or_default();
        let total_current_balance = Money::total_of(
            currency,
            accounts
                .iter()
                .filter_map(|e| e.account.balances.current.as_ref()),
        );

        Self {
            total_banks: accounts.len(),
            total_current_balance,
            accounts,
        }
    }
}

/// Single linked account in a [`Summary`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    /// ID of the [`BankAccount`] document describing the link.
    ///
    /// [`BankAccount`]: crate::domain::BankAccount
    pub document_id: bank_account::Id,

    /// ID of the aggregator item the account belongs to.
    pub bank_id: item::Id,

    /// [`bank_account::SharableId`] of the account.
    pub sharable_id: bank_account::SharableId,

    /// [`Account`] data reported by the aggregator.
    pub account: Account,
}

/// [`DateTimeOf`] a cached [`Summary`] expiration.
type ExpirationDateTime = DateTimeOf<(Summary, unit::Expiration)>;

/// Cached [`Summary`]s along with their expiration.
#[derive(Debug, Default)]
struct Entries {
    /// Number of invalidations happened so far.
    generation: u64,

    /// Cached [`Summary`]s of [`User`]s.
    summaries: HashMap<user::Id, (Summary, ExpirationDateTime)>,
}

/// Version of a [`Cache`] a [`Summary`] is computed against.
///
/// A [`Summary`] computed against an outdated [`Generation`] is not cached,
/// as it may miss the accounts linked meanwhile.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Generation(u64);

/// Per-[`User`] cache of the computed [`Summary`]s.
#[derive(Clone, Debug, Default)]
pub(crate) struct Cache(Arc<RwLock<Entries>>);

impl Cache {
    /// Returns the current [`Generation`] of this [`Cache`].
    pub(crate) async fn generation(&self) -> Generation {
        Generation(self.0.read().await.generation)
    }

    /// Returns the cached [`Summary`] of the [`User`], unless it's expired.
    pub(crate) async fn get(&self, user_id: &user::Id) -> Option<Summary> {
        self.0
            .read()
            .await
            .summaries
            .get(user_id)
            .filter(|(_, expires_at)| !expires_at.is_past())
            .map(|(summary, _)| summary.clone())
    }

    /// Caches the [`Summary`] of the [`User`] for the provided `ttl`, unless
    /// this [`Cache`] was invalidated since the provided [`Generation`].
    ///
    /// Expired [`Summary`]s of all [`User`]s are evicted.
    pub(crate) async fn put(
        &self,
        user_id: user::Id,
        summary: Summary,
        ttl: Duration,
        computed_at: Generation,
    ) {
        let mut entries = self.0.write().await;
        entries
            .summaries
            .retain(|_, (_, expires_at)| !expires_at.is_past());
        if entries.generation != computed_at.0 {
            return;
        }
        let expires_at = ExpirationDateTime::now() + ttl;
        _ = entries.summaries.insert(user_id, (summary, expires_at));
    }

    /// Drops the cached [`Summary`] of the [`User`], if any, and discards the
    /// ones being computed.
    pub(crate) async fn invalidate(&self, user_id: &user::Id) {
        let mut entries = self.0.write().await;
        entries.generation = entries.generation.wrapping_add(1);
        _ = entries.summaries.remove(user_id);
    }

    /// Returns the number of [`Summary`]s kept in this [`Cache`].
    #[cfg(test)]
    async fn len(&self) -> usize {
        self.0.read().await.summaries.len()
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{Currency, Money};

    use crate::domain::{account, bank_account, user, Account};

    use super::{Cache, Entry, Summary};

    fn entry(id: &str, current: Option<Money>) -> Entry {
        Entry {
            document_id: bank_account::Id::from(format!("doc-{id}")),
            bank_id: format!("item-{id}").into(),
            sharable_id: bank_account::SharableId::encrypt(&id.into()),
            account: Account {
                id: id.into(),
                name: "Plaid Checking".into(),
                official_name: None,
                mask: Some("0000".into()),
                kind: "depository".into(),
                subtype: Some("checking".into()),
                balances: account::Balances {
                    current,
                    available: None,
                },
            },
        }
    }

    fn money(amount: f64, currency: Currency) -> Option<Money> {
        Money::from_f64(amount, currency)
    }

    #[test]
    fn totals_in_first_currency() {
        let summary = Summary::new(vec![
            entry("a", money(110.5, Currency::Usd)),
            entry("b", None),
            entry("c", money(9.5, Currency::Usd)),
            entry("d", money(1000.0, Currency::Eur)),
        ]);

        assert_eq!(summary.total_banks, 4);
        assert_eq!(
            Some(summary.total_current_balance),
            money(120.0, Currency::Usd),
        );
    }

    #[test]
    fn empty_summary_is_zero_usd() {
        let summary = Summary::new(vec![]);

        assert_eq!(summary.total_banks, 0);
        assert_eq!(summary.total_current_balance, Money::zero(Currency::Usd));
    }

    #[tokio::test]
    async fn caches_until_invalidated_or_expired() {
        let cache = Cache::default();
        let user = user::Id::from("user-1");
        let summary = Summary::new(vec![entry("a", None)]);

        assert_eq!(cache.get(&user).await, None);

        let gen = cache.generation().await;
        cache
            .put(user.clone(), summary.clone(), Duration::from_secs(60), gen)
            .await;
        assert_eq!(cache.get(&user).await, Some(summary.clone()));

        cache.invalidate(&user).await;
        assert_eq!(cache.get(&user).await, None);

        let gen = cache.generation().await;
        cache.put(user.clone(), summary, Duration::ZERO, gen).await;
        assert_eq!(cache.get(&user).await, None);
    }

    #[tokio::test]
    async fn discards_summaries_computed_before_invalidation() {
        let cache = Cache::default();
        let user = user::Id::from("user-1");

        let outdated = cache.generation().await;
        cache.invalidate(&user).await;
        cache
            .put(
                user.clone(),
                Summary::new(vec![entry("a", None)]),
                Duration::from_secs(60),
                outdated,
            )
            .await;

        assert_eq!(cache.get(&user).await, None);
    }

    #[tokio::test]
    async fn evicts_expired_summaries() {
        let cache = Cache::default();
        let gen = cache.generation().await;

        for id in ["user-1", "user-2", "user-3"] {
            cache
                .put(id.into(), Summary::new(vec![]), Duration::ZERO, gen)
                .await;
        }
        cache
            .put(
                "user-4".into(),
                Summary::new(vec![]),
                Duration::from_secs(60),
                gen,
            )
            .await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.get(&"user-4".into()).await.is_some());
    }
}

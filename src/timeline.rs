use crate::date::{Clock, MonthKey};
use crate::error::Result;
use crate::salary::SalaryItemCollection;
use crate::settings::{ContributionRates, EffectiveSettings, SalarySettingsRecord};
use crate::store::SettingsStore;
use std::collections::BTreeMap;

/// The authoritative (month -> settings record) mapping, enforcing the
/// anchor-propagation invariant: anchors are user-confirmed and only change
/// through explicit save or reset; every month between an anchor and the next
/// one (or the current calendar month) carries a regenerable inherited copy.
///
/// Mutations take `&mut self` and reads `&self`, so a shared timeline only
/// ever sees fully applied regenerations (wrap it in a mutex to share across
/// threads). Mutations apply in memory first and then mirror to the store;
/// a failed store write surfaces an error without corrupting memory.
pub struct SettingsTimeline<S, C> {
    records: BTreeMap<MonthKey, SalarySettingsRecord>,
    store: S,
    clock: C,
}

impl<S: SettingsStore, C: Clock> SettingsTimeline<S, C> {
    /// Hydrates the timeline from the store: anchors first, then inherited
    /// records for the gaps, preferring stored rows over regeneration.
    pub fn open(store: S, clock: C) -> Result<Self> {
        let mut records = BTreeMap::new();
        for anchor in store.load_all_anchors(None)? {
            records.insert(anchor.month, anchor);
        }
        let mut timeline = SettingsTimeline {
            records,
            store,
            clock,
        };
        timeline.hydrate_gaps()?;
        log::debug!("timeline opened with {} records", timeline.records.len());
        Ok(timeline)
    }

    fn hydrate_gaps(&mut self) -> Result<()> {
        let anchors: Vec<MonthKey> = self
            .records
            .iter()
            .filter(|(_, r)| r.is_anchor)
            .map(|(k, _)| *k)
            .collect();
        for (i, &anchor) in anchors.iter().enumerate() {
            let end = anchors
                .get(i + 1)
                .copied()
                .unwrap_or_else(|| self.clock.current_month().next());
            for month in anchor.months_until(end) {
                if self.records.contains_key(&month) {
                    continue;
                }
                let record = match self.store.load(month)? {
                    Some(stored) if !stored.is_anchor => stored,
                    _ => {
                        let source = &self.records[&anchor];
                        source.inherited(month, source.id, source.created_at)
                    }
                };
                self.records.insert(month, record);
            }
        }
        Ok(())
    }

    /// Creates or replaces the anchor at `month` and eagerly regenerates the
    /// inherited records it governs. Returns the saved anchor.
    pub fn upsert_anchor(
        &mut self,
        month: MonthKey,
        salary_items: SalaryItemCollection,
        rates: ContributionRates,
    ) -> Result<SalarySettingsRecord> {
        let now = self.clock.now();
        let anchor =
            SalarySettingsRecord::anchor(now.timestamp_millis(), month, salary_items, rates, now);
        self.records.insert(month, anchor.clone());

        let mut dirty = vec![month];
        dirty.extend(self.regenerate_from(month));
        log::info!(
            "anchor saved for {month}, {} inherited record(s) regenerated",
            dirty.len() - 1
        );
        self.persist(&dirty)?;
        Ok(anchor)
    }

    /// Removes the anchor at `month`, if any, and repairs the gap it leaves:
    /// regenerate from the previous anchor when one exists, otherwise drop
    /// the orphaned inherited records.
    pub fn remove_anchor(&mut self, month: MonthKey) -> Result<()> {
        match self.records.get(&month) {
            Some(record) if record.is_anchor => {}
            _ => {
                log::debug!("no anchor at {month}, nothing to remove");
                return Ok(());
            }
        }
        let previous = self.previous_anchor(month);
        let next = self.next_anchor(month);
        self.records.remove(&month);

        // Memory is brought fully to the post-removal state before any store
        // call, so a failed write surfaces without leaving the timeline half
        // mutated.
        match previous {
            Some(previous) => {
                let dirty = self.regenerate_from(previous);
                log::info!(
                    "anchor removed at {month}, gap refilled from {previous} ({} record(s))",
                    dirty.len()
                );
                self.store.delete(month)?;
                self.persist(&dirty)?;
            }
            None => {
                // Nothing to inherit from: drop the records the anchor fed.
                let end = next.unwrap_or_else(|| self.clock.current_month().next());
                let orphaned: Vec<MonthKey> = self
                    .records
                    .range(month..end)
                    .filter(|(_, r)| !r.is_anchor)
                    .map(|(k, _)| *k)
                    .collect();
                log::info!(
                    "anchor removed at {month}, dropping {} orphaned record(s)",
                    orphaned.len()
                );
                for key in &orphaned {
                    self.records.remove(key);
                }
                self.store.delete(month)?;
                for key in orphaned {
                    self.store.delete(key)?;
                }
            }
        }
        Ok(())
    }

    /// The settings applicable to `month`: a direct record if present,
    /// otherwise the nearest preceding anchor's values while the target is
    /// bounded by a later anchor or within the continuation window (never
    /// past the current calendar month), otherwise the zero default.
    pub fn resolve(&self, month: MonthKey) -> SalarySettingsRecord {
        if let Some(record) = self.records.get(&month) {
            return record.clone();
        }
        if let Some(anchor_key) = self.anchor_at_or_before(month) {
            let bounded_ahead = self.next_anchor(month).is_some();
            if bounded_ahead || month <= self.clock.current_month() {
                let anchor = &self.records[&anchor_key];
                log::debug!("{month} inherits from anchor {anchor_key}");
                return anchor.inherited(month, anchor.id, anchor.created_at);
            }
        }
        SalarySettingsRecord::zero(month)
    }

    /// All records in month order.
    pub fn records(&self) -> impl DoubleEndedIterator<Item = &SalarySettingsRecord> {
        self.records.values()
    }

    pub fn anchors(&self) -> impl Iterator<Item = &SalarySettingsRecord> {
        self.records.values().filter(|r| r.is_anchor)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Rewrites the inherited records strictly between `anchor` and the next
    /// anchor (or through the current month when unbounded), skipping months
    /// that are themselves anchors. Returns the rewritten keys.
    ///
    /// Inherited records carry their source anchor's id and creation time,
    /// matching the lazy path in `resolve` and hydration.
    fn regenerate_from(&mut self, anchor: MonthKey) -> Vec<MonthKey> {
        let source = match self.records.get(&anchor) {
            Some(record) => record.clone(),
            None => return Vec::new(),
        };
        let end = self
            .next_anchor(anchor)
            .unwrap_or_else(|| self.clock.current_month().next());

        let mut changed = Vec::new();
        for month in anchor.months_until(end) {
            if let Some(existing) = self.records.get(&month) {
                if existing.is_anchor {
                    continue;
                }
            }
            let record = source.inherited(month, source.id, source.created_at);
            self.records.insert(month, record);
            changed.push(month);
        }
        changed
    }

    fn persist(&mut self, keys: &[MonthKey]) -> Result<()> {
        for key in keys {
            if let Some(record) = self.records.get(key) {
                let record = record.clone();
                self.store.save(*key, &record)?;
            }
        }
        Ok(())
    }

    fn anchor_at_or_before(&self, month: MonthKey) -> Option<MonthKey> {
        self.records
            .range(..=month)
            .rev()
            .find(|(_, r)| r.is_anchor)
            .map(|(k, _)| *k)
    }

    fn previous_anchor(&self, month: MonthKey) -> Option<MonthKey> {
        self.records
            .range(..month)
            .rev()
            .find(|(_, r)| r.is_anchor)
            .map(|(k, _)| *k)
    }

    fn next_anchor(&self, month: MonthKey) -> Option<MonthKey> {
        self.records
            .range(month.next()..)
            .find(|(_, r)| r.is_anchor)
            .map(|(k, _)| *k)
    }
}

impl<S: SettingsStore, C: Clock> EffectiveSettings for SettingsTimeline<S, C> {
    fn effective_settings(&self, month: MonthKey) -> SalarySettingsRecord {
        self.resolve(month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::FixedClock;
    use crate::salary::SalaryItem;
    use crate::settings::RecordKind;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn month(m: u32) -> MonthKey {
        MonthKey::new(2024, m).unwrap()
    }

    // "now" is August 2024 in all timeline tests
    fn clock() -> FixedClock {
        FixedClock("2024-08-15T12:00:00Z".parse().unwrap())
    }

    fn timeline() -> SettingsTimeline<MemoryStore, FixedClock> {
        SettingsTimeline::open(MemoryStore::default(), clock()).unwrap()
    }

    fn items(basic: Decimal) -> SalaryItemCollection {
        SalaryItemCollection::new(vec![SalaryItem::basic_salary(basic).unwrap()]).unwrap()
    }

    fn rates() -> ContributionRates {
        ContributionRates::from_percent(dec!(8), dec!(20), dec!(12), dec!(12)).unwrap()
    }

    #[test]
    fn empty_timeline_resolves_zero_default() {
        let timeline = timeline();
        let record = timeline.resolve(month(3));
        assert_eq!(record.gross_salary(), Decimal::ZERO);
        assert!(!record.is_anchor);
    }

    #[test]
    fn anchor_resolves_exactly_and_inherits_forward() {
        let mut timeline = timeline();
        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();

        let jan = timeline.resolve(month(1));
        assert!(jan.is_anchor);
        assert_eq!(jan.gross_salary(), dec!(10000));

        // scenario A: March inherits January's values
        let mar = timeline.resolve(month(3));
        assert!(!mar.is_anchor);
        assert_eq!(mar.gross_salary(), dec!(10000));
        assert_eq!(mar.rates, rates());
        assert_eq!(mar.kind(), RecordKind::Inherited);

        // inherited records were stored eagerly up to "now" (August)
        for m in 2..=8 {
            let stored = timeline.store().load(month(m)).unwrap().unwrap();
            assert!(!stored.is_anchor, "month {m} should be inherited");
            assert_eq!(stored.gross_salary(), dec!(10000));
        }
    }

    #[test]
    fn continuation_never_extends_past_now() {
        let mut timeline = timeline();
        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();

        // September is past the August clock and unbounded ahead
        assert_eq!(timeline.resolve(month(9)).gross_salary(), Decimal::ZERO);
        // August itself is within the window
        assert_eq!(timeline.resolve(month(8)).gross_salary(), dec!(10000));
    }

    #[test]
    fn second_anchor_bounds_inheritance() {
        let mut timeline = timeline();
        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();
        timeline.upsert_anchor(month(6), items(dec!(20000)), rates()).unwrap();

        // scenario B
        assert_eq!(timeline.resolve(month(4)).gross_salary(), dec!(10000));
        assert_eq!(timeline.resolve(month(6)).gross_salary(), dec!(20000));
        assert_eq!(timeline.resolve(month(7)).gross_salary(), dec!(20000));
        assert!(!timeline.resolve(month(7)).is_anchor);
    }

    #[test]
    fn earlier_anchor_does_not_overwrite_later_anchor() {
        let mut timeline = timeline();
        timeline.upsert_anchor(month(6), items(dec!(20000)), rates()).unwrap();
        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();

        assert_eq!(timeline.resolve(month(6)).gross_salary(), dec!(20000));
        assert!(timeline.resolve(month(6)).is_anchor);
        assert_eq!(timeline.resolve(month(5)).gross_salary(), dec!(10000));
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut timeline = timeline();
        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();
        let first: Vec<_> = timeline
            .records()
            .map(|r| (r.month, r.gross_salary(), r.is_anchor))
            .collect();

        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();
        let second: Vec<_> = timeline
            .records()
            .map(|r| (r.month, r.gross_salary(), r.is_anchor))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn resaving_an_anchor_recomputes_inherited_range() {
        let mut timeline = timeline();
        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();
        timeline.upsert_anchor(month(1), items(dec!(12000)), rates()).unwrap();

        assert_eq!(timeline.resolve(month(4)).gross_salary(), dec!(12000));
        let stored = timeline.store().load(month(4)).unwrap().unwrap();
        assert_eq!(stored.gross_salary(), dec!(12000));
    }

    #[test]
    fn remove_anchor_with_predecessor_refills_gap() {
        let mut timeline = timeline();
        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();
        timeline.upsert_anchor(month(4), items(dec!(15000)), rates()).unwrap();
        timeline.remove_anchor(month(4)).unwrap();

        // April now inherits January again, never its own removed value
        let apr = timeline.resolve(month(4));
        assert!(!apr.is_anchor);
        assert_eq!(apr.gross_salary(), dec!(10000));
        assert_eq!(timeline.resolve(month(6)).gross_salary(), dec!(10000));
    }

    #[test]
    fn remove_first_anchor_drops_orphans() {
        let mut timeline = timeline();
        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();
        timeline.upsert_anchor(month(6), items(dec!(20000)), rates()).unwrap();
        timeline.remove_anchor(month(1)).unwrap();

        // scenario C: nothing to inherit before June
        assert_eq!(timeline.resolve(month(3)).gross_salary(), Decimal::ZERO);
        assert!(timeline.store().load(month(3)).unwrap().is_none());
        // June and later are unaffected
        assert_eq!(timeline.resolve(month(6)).gross_salary(), dec!(20000));
        assert_eq!(timeline.resolve(month(7)).gross_salary(), dec!(20000));
    }

    #[test]
    fn remove_without_anchor_is_a_noop() {
        let mut timeline = timeline();
        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();
        // month 3 holds an inherited record, not an anchor
        timeline.remove_anchor(month(3)).unwrap();
        assert_eq!(timeline.resolve(month(3)).gross_salary(), dec!(10000));
        timeline.remove_anchor(month(11)).unwrap();
    }

    #[test]
    fn regeneration_skips_intervening_anchors() {
        let mut timeline = timeline();
        timeline.upsert_anchor(month(3), items(dec!(9000)), rates()).unwrap();
        timeline.upsert_anchor(month(6), items(dec!(20000)), rates()).unwrap();
        // re-saving January regenerates Feb..=May but must leave March alone
        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();

        assert_eq!(timeline.resolve(month(2)).gross_salary(), dec!(10000));
        assert_eq!(timeline.resolve(month(3)).gross_salary(), dec!(9000));
        assert!(timeline.resolve(month(3)).is_anchor);
        assert_eq!(timeline.resolve(month(4)).gross_salary(), dec!(9000));
    }

    #[test]
    fn future_anchor_without_bound_regenerates_nothing() {
        let mut timeline = timeline();
        timeline.upsert_anchor(month(11), items(dec!(30000)), rates()).unwrap();
        assert!(timeline.resolve(month(11)).is_anchor);
        // December is past "now" and unbounded
        assert_eq!(timeline.resolve(month(12)).gross_salary(), Decimal::ZERO);
    }

    #[test]
    fn reopen_rebuilds_from_anchors() {
        let mut timeline = timeline();
        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();
        timeline.upsert_anchor(month(6), items(dec!(20000)), rates()).unwrap();
        let store = timeline.into_store();

        let reopened = SettingsTimeline::open(store, clock()).unwrap();
        assert_eq!(reopened.resolve(month(4)).gross_salary(), dec!(10000));
        assert_eq!(reopened.resolve(month(7)).gross_salary(), dec!(20000));
        assert_eq!(reopened.anchors().count(), 2);
    }

    /// Store whose deletes always fail, for error-path tests.
    struct BrokenDeleteStore(MemoryStore);

    impl SettingsStore for BrokenDeleteStore {
        fn save(&mut self, month: MonthKey, record: &SalarySettingsRecord) -> crate::error::Result<()> {
            self.0.save(month, record)
        }

        fn load(&self, month: MonthKey) -> crate::error::Result<Option<SalarySettingsRecord>> {
            self.0.load(month)
        }

        fn load_all_anchors(
            &self,
            year: Option<i32>,
        ) -> crate::error::Result<Vec<SalarySettingsRecord>> {
            self.0.load_all_anchors(year)
        }

        fn delete(&mut self, _month: MonthKey) -> crate::error::Result<()> {
            Err(crate::error::Error::store(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn failed_store_delete_leaves_memory_fully_removed() {
        let store = BrokenDeleteStore(MemoryStore::default());
        let mut timeline = SettingsTimeline::open(store, clock()).unwrap();
        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();
        timeline.upsert_anchor(month(4), items(dec!(15000)), rates()).unwrap();

        assert!(timeline.remove_anchor(month(4)).is_err());

        // memory reflects the completed removal, never a half-applied one:
        // both April and the months it governed inherit January again
        let apr = timeline.resolve(month(4));
        assert!(!apr.is_anchor);
        assert_eq!(apr.gross_salary(), dec!(10000));
        assert_eq!(timeline.resolve(month(5)).gross_salary(), dec!(10000));
    }

    #[test]
    fn failed_store_delete_still_drops_orphans_in_memory() {
        let store = BrokenDeleteStore(MemoryStore::default());
        let mut timeline = SettingsTimeline::open(store, clock()).unwrap();
        timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();

        assert!(timeline.remove_anchor(month(1)).is_err());

        assert_eq!(timeline.resolve(month(1)).gross_salary(), Decimal::ZERO);
        assert_eq!(timeline.resolve(month(3)).gross_salary(), Decimal::ZERO);
    }

    #[test]
    fn inherited_records_share_their_anchor_identity() {
        let mut timeline = timeline();
        let anchor = timeline.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();

        // eager regeneration
        let eager = timeline.resolve(month(3));
        assert_eq!(eager.id, anchor.id);
        assert_eq!(eager.created_at, anchor.created_at);

        // hydration from an anchors-only store takes the regeneration path
        let mut store = MemoryStore::default();
        store.save(anchor.month, &anchor).unwrap();
        let reopened = SettingsTimeline::open(store, clock()).unwrap();
        let hydrated = reopened.resolve(month(3));
        assert_eq!(hydrated.id, anchor.id);
        assert_eq!(hydrated.created_at, anchor.created_at);
    }

    #[test]
    fn reopen_with_anchors_only_regenerates_gaps() {
        // a store that saw only the anchors, e.g. after a partial write
        let mut store = MemoryStore::default();
        let mut seed = SettingsTimeline::open(MemoryStore::default(), clock()).unwrap();
        seed.upsert_anchor(month(1), items(dec!(10000)), rates()).unwrap();
        for anchor in seed.anchors() {
            store.save(anchor.month, anchor).unwrap();
        }

        let timeline = SettingsTimeline::open(store, clock()).unwrap();
        assert_eq!(timeline.resolve(month(5)).gross_salary(), dec!(10000));
        assert!(!timeline.resolve(month(5)).is_anchor);
    }
}

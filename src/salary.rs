use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const BASIC_SALARY_ID: &str = "basic_salary";
pub const ALLOWANCE_ID: &str = "allowance";

/// One component of a month's gross pay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryItem {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    /// Counts towards the taxable base.
    pub include_tax: bool,
    /// Counts towards the social-security / housing-fund base.
    pub include_social_security: bool,
    /// Default items cannot be removed from a collection.
    #[serde(default)]
    pub is_default: bool,
    /// Display rank.
    #[serde(default)]
    pub order: u32,
}

impl SalaryItem {
    /// The undeletable base salary item: taxed and insured.
    pub fn basic_salary(amount: Decimal) -> Result<Self> {
        check_amount(BASIC_SALARY_ID, amount)?;
        Ok(SalaryItem {
            id: BASIC_SALARY_ID.to_string(),
            name: "Basic salary".to_string(),
            amount,
            include_tax: true,
            include_social_security: true,
            is_default: true,
            order: 1,
        })
    }

    /// Allowance: taxed but not counted towards the insurance base.
    pub fn allowance(amount: Decimal) -> Result<Self> {
        check_amount(ALLOWANCE_ID, amount)?;
        Ok(SalaryItem {
            id: ALLOWANCE_ID.to_string(),
            name: "Allowance".to_string(),
            amount,
            include_tax: true,
            include_social_security: false,
            is_default: false,
            order: 2,
        })
    }

    /// A user-defined item; the id is derived from the name so it stays
    /// stable across edits.
    pub fn custom(
        name: &str,
        amount: Decimal,
        include_tax: bool,
        include_social_security: bool,
    ) -> Result<Self> {
        check_amount(name, amount)?;
        let slug: String = name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        Ok(SalaryItem {
            id: format!("custom_{slug}"),
            name: name.trim().to_string(),
            amount,
            include_tax,
            include_social_security,
            is_default: false,
            order: u32::MAX,
        })
    }
}

fn check_amount(name: &str, amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(Error::InvalidAmount {
            name: name.to_string(),
            amount,
        });
    }
    Ok(())
}

/// The composition of one month's gross pay: a unique-id set of salary items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryItemCollection {
    items: Vec<SalaryItem>,
}

impl SalaryItemCollection {
    pub fn new(items: Vec<SalaryItem>) -> Result<Self> {
        let mut collection = SalaryItemCollection { items: Vec::new() };
        for item in items {
            collection.add(item)?;
        }
        Ok(collection)
    }

    /// Basic salary plus allowance, both zero.
    pub fn standard() -> Self {
        SalaryItemCollection {
            items: vec![
                SalaryItem::basic_salary(Decimal::ZERO).expect("zero is valid"),
                SalaryItem::allowance(Decimal::ZERO).expect("zero is valid"),
            ],
        }
    }

    pub fn add(&mut self, item: SalaryItem) -> Result<()> {
        check_amount(&item.name, item.amount)?;
        if self.items.iter().any(|existing| existing.id == item.id) {
            return Err(Error::DuplicateItemId(item.id));
        }
        self.items.push(item);
        self.items.sort_by_key(|i| i.order);
        Ok(())
    }

    /// Removes an item by id. Unknown ids are a no-op; default items are
    /// protected.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        if let Some(item) = self.items.iter().find(|i| i.id == id) {
            if item.is_default {
                return Err(Error::DefaultItemRemoval(id.to_string()));
            }
            self.items.retain(|i| i.id != id);
        }
        Ok(())
    }

    /// Updates an item's amount. Unknown ids are a no-op.
    pub fn set_amount(&mut self, id: &str, amount: Decimal) -> Result<()> {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            check_amount(&item.name, amount)?;
            item.amount = amount;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&SalaryItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Items in display order.
    pub fn items(&self) -> impl Iterator<Item = &SalaryItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_salary(&self) -> Decimal {
        self.items.iter().map(|i| i.amount).sum()
    }

    pub fn taxable_base(&self) -> Decimal {
        self.items
            .iter()
            .filter(|i| i.include_tax)
            .map(|i| i.amount)
            .sum()
    }

    pub fn social_security_base(&self) -> Decimal {
        self.items
            .iter()
            .filter(|i| i.include_social_security)
            .map(|i| i.amount)
            .sum()
    }
}

impl Default for SalaryItemCollection {
    fn default() -> Self {
        SalaryItemCollection::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> SalaryItemCollection {
        SalaryItemCollection::new(vec![
            SalaryItem::basic_salary(dec!(8000)).unwrap(),
            SalaryItem::allowance(dec!(1500)).unwrap(),
            SalaryItem::custom("Overtime", dec!(500), true, false).unwrap(),
            SalaryItem::custom("Meal card", dec!(300), false, false).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn derived_bases() {
        let items = sample();
        assert_eq!(items.total_salary(), dec!(10300));
        assert_eq!(items.taxable_base(), dec!(10000));
        assert_eq!(items.social_security_base(), dec!(8000));
    }

    #[test]
    fn standard_collection_is_zero_valued() {
        let items = SalaryItemCollection::standard();
        assert_eq!(items.len(), 2);
        assert_eq!(items.total_salary(), Decimal::ZERO);
        assert!(items.get(BASIC_SALARY_ID).unwrap().is_default);
    }

    #[test]
    fn rejects_negative_amounts() {
        assert!(matches!(
            SalaryItem::basic_salary(dec!(-1)),
            Err(Error::InvalidAmount { .. })
        ));
        let mut items = sample();
        assert!(matches!(
            items.set_amount(ALLOWANCE_ID, dec!(-0.01)),
            Err(Error::InvalidAmount { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut items = sample();
        let result = items.add(SalaryItem::allowance(dec!(100)).unwrap());
        assert!(matches!(result, Err(Error::DuplicateItemId(_))));
    }

    #[test]
    fn default_item_cannot_be_removed() {
        let mut items = sample();
        assert!(matches!(
            items.remove(BASIC_SALARY_ID),
            Err(Error::DefaultItemRemoval(_))
        ));
        items.remove(ALLOWANCE_ID).unwrap();
        assert_eq!(items.total_salary(), dec!(8800));
        // unknown id is a no-op
        items.remove("no_such_item").unwrap();
    }

    #[test]
    fn set_amount_updates_bases() {
        let mut items = sample();
        items.set_amount(BASIC_SALARY_ID, dec!(9000)).unwrap();
        assert_eq!(items.social_security_base(), dec!(9000));
    }

    #[test]
    fn items_sorted_by_order() {
        let items = sample();
        let ids: Vec<_> = items.items().map(|i| i.id.as_str()).collect();
        assert_eq!(ids[0], BASIC_SALARY_ID);
        assert_eq!(ids[1], ALLOWANCE_ID);
    }
}

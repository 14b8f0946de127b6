use crate::date::MonthKey;
use crate::error::{Error, Result};
use crate::salary::SalaryItemCollection;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Personal/company contribution rates for social insurance and the housing
/// fund, each a fraction in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContributionRates {
    pub personal_social: Decimal,
    pub company_social: Decimal,
    pub personal_housing: Decimal,
    pub company_housing: Decimal,
}

impl ContributionRates {
    pub fn new(
        personal_social: Decimal,
        company_social: Decimal,
        personal_housing: Decimal,
        company_housing: Decimal,
    ) -> Result<Self> {
        Ok(ContributionRates {
            personal_social: check_rate("personal social insurance", personal_social)?,
            company_social: check_rate("company social insurance", company_social)?,
            personal_housing: check_rate("personal housing fund", personal_housing)?,
            company_housing: check_rate("company housing fund", company_housing)?,
        })
    }

    /// Builds rates from percentages in [0, 100], e.g. `8` for 8%.
    pub fn from_percent(
        personal_social: Decimal,
        company_social: Decimal,
        personal_housing: Decimal,
        company_housing: Decimal,
    ) -> Result<Self> {
        let hundred = dec!(100);
        ContributionRates::new(
            personal_social / hundred,
            company_social / hundred,
            personal_housing / hundred,
            company_housing / hundred,
        )
    }
}

fn check_rate(name: &'static str, rate: Decimal) -> Result<Decimal> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(Error::InvalidRate { name, rate });
    }
    Ok(rate)
}

/// What kind of record a month holds; inherited records may be silently
/// regenerated, anchors change only through explicit save or reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Anchor,
    AutoAnchor,
    Inherited,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordKind::Anchor => "anchor",
            RecordKind::AutoAnchor => "auto anchor",
            RecordKind::Inherited => "inherited",
        };
        write!(f, "{s}")
    }
}

/// The salary settings in force for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalarySettingsRecord {
    pub id: i64,
    pub month: MonthKey,
    pub salary_items: SalaryItemCollection,
    pub rates: ContributionRates,
    pub is_anchor: bool,
    /// True only for system-maintained "current month" continuation records.
    #[serde(default)]
    pub is_auto_anchor: bool,
    pub created_at: DateTime<Utc>,
}

impl SalarySettingsRecord {
    /// A user-confirmed record for `month`.
    pub fn anchor(
        id: i64,
        month: MonthKey,
        salary_items: SalaryItemCollection,
        rates: ContributionRates,
        created_at: DateTime<Utc>,
    ) -> Self {
        SalarySettingsRecord {
            id,
            month,
            salary_items,
            rates,
            is_anchor: true,
            is_auto_anchor: false,
            created_at,
        }
    }

    /// A copy of this record's values for another month, marked inherited.
    pub fn inherited(&self, month: MonthKey, id: i64, created_at: DateTime<Utc>) -> Self {
        SalarySettingsRecord {
            id,
            month,
            salary_items: self.salary_items.clone(),
            rates: self.rates,
            is_anchor: false,
            is_auto_anchor: false,
            created_at,
        }
    }

    /// The zero-valued default returned for months with nothing to inherit.
    pub fn zero(month: MonthKey) -> Self {
        SalarySettingsRecord {
            id: 0,
            month,
            salary_items: SalaryItemCollection::standard(),
            rates: ContributionRates::default(),
            is_anchor: false,
            is_auto_anchor: false,
            created_at: DateTime::UNIX_EPOCH,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match (self.is_anchor, self.is_auto_anchor) {
            (true, false) => RecordKind::Anchor,
            (true, true) => RecordKind::AutoAnchor,
            (false, _) => RecordKind::Inherited,
        }
    }

    pub fn gross_salary(&self) -> Decimal {
        self.salary_items.total_salary()
    }

    pub fn taxable_base(&self) -> Decimal {
        self.salary_items.taxable_base()
    }

    pub fn social_security_base(&self) -> Decimal {
        self.salary_items.social_security_base()
    }

    /// Personal social-insurance contribution for the month.
    pub fn social_insurance(&self) -> Decimal {
        self.social_security_base() * self.rates.personal_social
    }

    /// Personal housing-fund contribution for the month.
    pub fn housing_fund(&self) -> Decimal {
        self.social_security_base() * self.rates.personal_housing
    }

    /// Taxable income before the standard monthly deduction.
    pub fn monthly_taxable_income(&self) -> Decimal {
        self.taxable_base() - self.social_insurance() - self.housing_fund()
    }
}

/// Read-side resolver: the settings applicable to any month, as a pure
/// function of the timeline's current state. All consumers (tax engine,
/// calculator, display) go through this seam.
pub trait EffectiveSettings {
    fn effective_settings(&self, month: MonthKey) -> SalarySettingsRecord;
}

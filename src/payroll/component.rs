use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::entity::{salary_component, sea_orm_active_enums::{CalculationType, ComponentType}};

/// How a component turns its base into an amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Calculation {
    /// Percent of the base: earned basic for allowances, gross for deductions
    Percentage(Decimal),
    /// Flat amount regardless of the base
    Fixed(Decimal),
}

impl Calculation {
    /// Amount for `base`, rounded half away from zero to a whole unit.
    ///
    /// `None` when the amount doesn't fit in an `i64`.
    pub fn amount(&self, base: i64) -> Option<i64> {
        let exact = match self {
            Calculation::Percentage(percent) => Decimal::from(base)
                .checked_mul(*percent)?
                .checked_div(Decimal::ONE_HUNDRED)?,
            Calculation::Fixed(value) => *value,
        };

        round_to_unit(exact)
    }
}

pub(crate) fn round_to_unit(value: Decimal) -> Option<i64> {
    i64::try_from(value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)).ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryComponent {
    pub name: String,
    pub kind: ComponentType,
    pub calculation: Calculation,
}

impl SalaryComponent {
    pub fn allowance(name: impl Into<String>, calculation: Calculation) -> Self {
        Self { name: name.into(), kind: ComponentType::Allowance, calculation }
    }

    pub fn deduction(name: impl Into<String>, calculation: Calculation) -> Self {
        Self { name: name.into(), kind: ComponentType::Deduction, calculation }
    }
}

impl From<&salary_component::Model> for SalaryComponent {
    fn from(row: &salary_component::Model) -> Self {
        let calculation = match row.calculation_type {
            CalculationType::Percentage => Calculation::Percentage(row.value),
            CalculationType::Fixed => Calculation::Fixed(row.value),
        };

        Self {
            name: row.component_name.clone(),
            kind: row.component_type,
            calculation,
        }
    }
}

/// The active allowances and deductions, in configuration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentRegistry {
    components: Vec<SalaryComponent>,
}

impl ComponentRegistry {
    pub fn new(components: Vec<SalaryComponent>) -> Self {
        Self { components }
    }

    /// Keeps only rows flagged active, preserving their order
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a salary_component::Model>) -> Self {
        Self::new(
            rows.into_iter()
                .filter(|row| row.is_active)
                .map(SalaryComponent::from)
                .collect()
        )
    }

    pub fn allowances(&self) -> impl Iterator<Item = &SalaryComponent> {
        self.components.iter().filter(|c| c.kind == ComponentType::Allowance)
    }

    pub fn deductions(&self) -> impl Iterator<Item = &SalaryComponent> {
        self.components.iter().filter(|c| c.kind == ComponentType::Deduction)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;

    fn row(name: &str, component_type: ComponentType, calculation_type: CalculationType, value: Decimal, is_active: bool) -> salary_component::Model {
        salary_component::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            component_name: name.to_string(),
            component_type,
            calculation_type,
            value,
            is_active,
        }
    }

    #[test]
    fn test_percentage_amount() {
        assert_eq!(Calculation::Percentage(dec!(10)).amount(4545), Some(455));
        assert_eq!(Calculation::Percentage(dec!(10)).amount(5000), Some(500));
        assert_eq!(Calculation::Percentage(dec!(12.5)).amount(1000), Some(125));
        assert_eq!(Calculation::Percentage(dec!(0)).amount(1000), Some(0));
        // -0.5 rounds away from zero
        assert_eq!(Calculation::Percentage(dec!(-10)).amount(5), Some(-1));
    }

    #[test]
    fn test_fixed_amount() {
        assert_eq!(Calculation::Fixed(dec!(200)).amount(123_456), Some(200));
        assert_eq!(Calculation::Fixed(dec!(199.5)).amount(0), Some(200));
        assert_eq!(Calculation::Fixed(dec!(199.49)).amount(0), Some(199));
    }

    #[test]
    fn test_amount_overflow() {
        assert_eq!(Calculation::Fixed(Decimal::MAX).amount(0), None);
        assert_eq!(Calculation::Percentage(dec!(1000)).amount(i64::MAX), None);
    }

    #[test]
    fn test_registry_from_rows() {
        let rows = [
            row("Tax", ComponentType::Deduction, CalculationType::Percentage, dec!(10), true),
            row("House Rent", ComponentType::Allowance, CalculationType::Percentage, dec!(10), true),
            row("Old Bonus", ComponentType::Allowance, CalculationType::Fixed, dec!(300), false),
            row("Insurance", ComponentType::Deduction, CalculationType::Fixed, dec!(200), true),
        ];

        let registry = ComponentRegistry::from_rows(&rows);

        assert_eq!(registry.allowances().count() + registry.deductions().count(), 3);
        assert_eq!(
            registry.allowances().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            ["House Rent"]
        );
        assert_eq!(
            registry.deductions().cloned().collect::<Vec<_>>(),
            [
                SalaryComponent::deduction("Tax", Calculation::Percentage(dec!(10))),
                SalaryComponent::deduction("Insurance", Calculation::Fixed(dec!(200))),
            ]
        );
    }
}

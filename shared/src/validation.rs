//! Validation utilities for inventory inputs

use rust_decimal::Decimal;

/// Longest item, supplier or recipient name accepted
pub const MAX_NAME_LEN: usize = 120;

/// Largest quantity a single movement may carry
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Largest unit cost accepted on a receipt. Together with [`MAX_QUANTITY`]
/// this keeps lot values far inside the decimal range.
pub const MAX_UNIT_COST: i64 = 1_000_000_000;

/// Validate an item name (non-blank, bounded length)
pub fn validate_item_name(item: &str) -> Result<(), &'static str> {
    let item = item.trim();
    if item.is_empty() {
        return Err("Item name is required");
    }
    if item.chars().count() > MAX_NAME_LEN {
        return Err("Item name is too long");
    }
    Ok(())
}

/// Validate a party name such as a supplier or recipient
pub fn validate_party_name(name: &str) -> Result<(), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required");
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err("Name is too long");
    }
    Ok(())
}

/// Validate a movement quantity
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    if quantity > MAX_QUANTITY {
        return Err("Quantity is too large");
    }
    Ok(())
}

/// Validate a unit cost (free stock is allowed)
pub fn validate_unit_cost(cost: Decimal) -> Result<(), &'static str> {
    if cost < Decimal::ZERO {
        return Err("Unit cost cannot be negative");
    }
    if cost > Decimal::from(MAX_UNIT_COST) {
        return Err("Unit cost is too large");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Bolt").is_ok());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_party_name() {
        assert!(validate_party_name("Workshop").is_ok());
        assert!(validate_party_name("").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_unit_cost() {
        assert!(validate_unit_cost(Decimal::ZERO).is_ok());
        assert!(validate_unit_cost(Decimal::new(250, 2)).is_ok());
        assert!(validate_unit_cost(Decimal::new(-1, 0)).is_err());
        assert!(validate_unit_cost(Decimal::from(MAX_UNIT_COST)).is_ok());
        assert!(validate_unit_cost(Decimal::from(1_000_000_000_000_000i64)).is_err());
    }
}

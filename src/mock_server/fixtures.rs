//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use crate::{Debtor, DebtorOrderLine, InvItem};

/// Collection of fixture factories for test data.
pub struct Fixtures;

/// The data the default mock server starts with.
#[derive(Debug, Clone)]
pub struct DefaultScenario {
    pub company_id: u32,
    pub debtors: Vec<Debtor>,
    pub items: Vec<InvItem>,
    pub order_lines: Vec<DebtorOrderLine>,
}

impl Fixtures {
    // =========================================================================
    // Debtor Fixtures
    // =========================================================================

    /// Create a minimal debtor.
    pub fn debtor(row_id: i32, account: &str, name: &str) -> Debtor {
        Debtor {
            row_id,
            account: account.to_string(),
            name: name.to_string(),
            contact_email: None,
            phone: None,
            city: None,
            country: None,
            currency: None,
            vat_number: None,
            blocked: false,
        }
    }

    /// Create a debtor located in a country.
    pub fn debtor_in(row_id: i32, account: &str, name: &str, city: &str, country: &str) -> Debtor {
        let mut debtor = Self::debtor(row_id, account, name);
        debtor.city = Some(city.to_string());
        debtor.country = Some(country.to_string());
        debtor
    }

    // =========================================================================
    // Inventory Fixtures
    // =========================================================================

    /// Create an inventory item with a sales price.
    pub fn inv_item(row_id: i32, item: &str, name: &str, sales_price: f64) -> InvItem {
        InvItem {
            row_id,
            item: item.to_string(),
            name: name.to_string(),
            unit: Some("pcs".to_string()),
            sales_price: Some(sales_price),
            cost_price: None,
            qty_on_stock: 0.0,
            blocked: false,
        }
    }

    /// Create an order line referencing an item.
    pub fn order_line(
        row_id: i32,
        order_number: i32,
        line_number: f64,
        item: &str,
        qty: f64,
        price: f64,
    ) -> DebtorOrderLine {
        DebtorOrderLine {
            row_id,
            order_number,
            line_number,
            item: Some(item.to_string()),
            text: None,
            qty,
            price,
        }
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    /// Company 1 with three debtors, three items and one two-line order.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario {
            company_id: 1,
            debtors: vec![
                Self::debtor_in(1, "10001", "Acme A/S", "Aarhus", "DK"),
                Self::debtor_in(2, "10002", "Globex GmbH", "Hamburg", "DE"),
                Self::debtor(3, "10003", "Initech"),
            ],
            items: vec![
                Self::inv_item(11, "BOLT-10", "Bolt 10mm", 2.5),
                Self::inv_item(12, "NUT-10", "Nut 10mm", 0.75),
                Self::inv_item(13, "WASHER-10", "Washer 10mm", 0.2),
            ],
            order_lines: vec![
                Self::order_line(101, 5001, 1.0, "BOLT-10", 100.0, 2.5),
                Self::order_line(102, 5001, 2.0, "NUT-10", 100.0, 0.75),
            ],
        }
    }
}

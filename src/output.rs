//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use crate::{Debtor, DebtorOrderLine, InvItem};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Debtor {
    fn pretty_print(&self) -> String {
        let header = format!("Debtor: {}", self.account);
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("Name:           {}", self.name),
            format!("Row Id:         {}", self.row_id),
        ];

        if let Some(ref email) = self.contact_email {
            lines.push(format!("E-mail:         {}", email));
        }

        if let Some(ref phone) = self.phone {
            lines.push(format!("Phone:          {}", phone));
        }

        match (&self.city, &self.country) {
            (Some(city), Some(country)) => lines.push(format!("Location:       {city}, {country}")),
            (Some(place), None) | (None, Some(place)) => {
                lines.push(format!("Location:       {place}"))
            }
            (None, None) => {}
        }

        if let Some(ref currency) = self.currency {
            lines.push(format!("Currency:       {}", currency));
        }

        if self.blocked {
            lines.push("Status:         blocked".to_string());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for InvItem {
    fn pretty_print(&self) -> String {
        let header = format!("Item: {}", self.item);
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("Name:           {}", self.name),
            format!("Row Id:         {}", self.row_id),
        ];

        if let Some(price) = self.sales_price {
            lines.push(format!("Sales Price:    {:.2}", price));
        }

        if let Some(price) = self.cost_price {
            lines.push(format!("Cost Price:     {:.2}", price));
        }

        let unit = self.unit.as_deref().unwrap_or("");
        lines.push(format!("On Stock:       {} {}", self.qty_on_stock, unit).trim_end().to_string());

        if self.blocked {
            lines.push("Status:         blocked".to_string());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for DebtorOrderLine {
    fn pretty_print(&self) -> String {
        let header = format!("Order Line: {}/{}", self.order_number, self.line_number);
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![header, divider, format!("Row Id:         {}", self.row_id)];

        if let Some(ref item) = self.item {
            lines.push(format!("Item:           {}", item));
        }

        if let Some(ref text) = self.text {
            lines.push(format!("Text:           {}", text));
        }

        lines.push(format!(
            "Amount:         {} x {:.2} = {:.2}",
            self.qty,
            self.price,
            self.amount()
        ));

        lines.join("\n")
    }
}

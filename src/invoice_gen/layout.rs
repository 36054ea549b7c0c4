use chrono::NaiveDate;

use crate::format::{format_currency, format_date, long_date};
use crate::models::InvoiceRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// One logical line of the rendered invoice view.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Text {
        content: String,
        scale: u32,
        align: Align,
        emphasis: bool,
    },
    /// A label on the left edge and a value on the right edge of the same row.
    Split {
        left: String,
        right: String,
        scale: u32,
        emphasis: bool,
    },
    Rule,
    Blank,
}

impl Line {
    fn text(content: impl Into<String>, scale: u32, align: Align, emphasis: bool) -> Self {
        Line::Text {
            content: content.into(),
            scale,
            align,
            emphasis,
        }
    }

    fn split(left: impl Into<String>, right: impl Into<String>, scale: u32, emphasis: bool) -> Self {
        Line::Split {
            left: left.into(),
            right: right.into(),
            scale,
            emphasis,
        }
    }
}

/// The fixed single-column invoice layout: header, billed-to block, one-row
/// service table, totals, footer. A pure function of the record plus the
/// current date (used only for the "generated on" stamp).
pub struct DocumentLayout {
    pub lines: Vec<Line>,
}

impl DocumentLayout {
    pub fn compose(record: &InvoiceRecord, today: NaiveDate) -> Self {
        let amount = format_currency(&record.amount);
        let mut lines = vec![
            Line::text("INVOICE", 3, Align::Left, true),
            Line::text("Bug Bounty Payment", 1, Align::Left, false),
            Line::Blank,
            Line::split("Invoice #", record.invoice_name.clone(), 1, true),
            Line::split("Date", format_date(&record.invoice_date), 1, false),
            Line::Rule,
            Line::text("Bill To:", 2, Align::Left, true),
            Line::text(record.payee_name.clone(), 1, Align::Left, true),
        ];

        for address_line in record.payee_address.split('\n') {
            lines.push(Line::text(address_line, 1, Align::Left, false));
        }
        lines.push(Line::text(record.payee_email.clone(), 1, Align::Left, false));

        lines.push(Line::Rule);
        lines.push(Line::text("Service Details:", 2, Align::Left, true));
        lines.push(Line::text(
            "Security Vulnerability Discovery",
            1,
            Align::Left,
            true,
        ));
        for description_line in record.description.split('\n') {
            lines.push(Line::text(description_line, 1, Align::Left, false));
        }
        lines.push(Line::Blank);
        lines.push(Line::split(
            "Date Discovered",
            format_date(&record.bug_date),
            1,
            false,
        ));
        lines.push(Line::split("Amount", amount.clone(), 1, false));

        lines.push(Line::Rule);
        lines.push(Line::split("Subtotal:", amount.clone(), 1, false));
        lines.push(Line::split("Total:", amount, 2, true));

        lines.push(Line::Rule);
        lines.push(Line::text(
            "Thank you for helping improve our security!",
            1,
            Align::Center,
            false,
        ));
        lines.push(Line::text(
            format!("This invoice was generated on {}", long_date(today)),
            1,
            Align::Center,
            false,
        ));

        Self { lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> InvoiceRecord {
        InvoiceRecord {
            amount: "1000".to_string(),
            bug_date: "2024-03-15".to_string(),
            description: "XSS in search box\nImpacts all users".to_string(),
            invoice_date: "2024-03-20".to_string(),
            invoice_name: "INV-2024-001".to_string(),
            payee_name: "John Doe".to_string(),
            payee_address: "123 Main St\nSpringfield".to_string(),
            payee_email: "john.doe@example.com".to_string(),
        }
    }

    fn contains_text(layout: &DocumentLayout, needle: &str) -> bool {
        layout.lines.iter().any(|line| match line {
            Line::Text { content, .. } => content == needle,
            Line::Split { left, right, .. } => left == needle || right == needle,
            _ => false,
        })
    }

    #[test]
    fn compose_carries_formatted_values() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let layout = DocumentLayout::compose(&sample_record(), today);

        assert!(contains_text(&layout, "INV-2024-001"));
        assert!(contains_text(&layout, "March 20, 2024"));
        assert!(contains_text(&layout, "March 15, 2024"));
        assert!(contains_text(&layout, "$1,000.00"));
        assert!(contains_text(&layout, "John Doe"));
        assert!(contains_text(&layout, "john.doe@example.com"));
    }

    #[test]
    fn compose_splits_multiline_fields() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let layout = DocumentLayout::compose(&sample_record(), today);

        assert!(contains_text(&layout, "123 Main St"));
        assert!(contains_text(&layout, "Springfield"));
        assert!(contains_text(&layout, "XSS in search box"));
        assert!(contains_text(&layout, "Impacts all users"));
    }

    #[test]
    fn compose_stamps_generation_date() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let layout = DocumentLayout::compose(&sample_record(), today);

        assert!(contains_text(
            &layout,
            "This invoice was generated on April 1, 2024"
        ));
    }

    #[test]
    fn compose_repeats_amount_in_totals() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let layout = DocumentLayout::compose(&sample_record(), today);

        let amount_rows = layout
            .lines
            .iter()
            .filter(|line| matches!(line, Line::Split { right, .. } if right == "$1,000.00"))
            .count();
        // Service table row, subtotal and total.
        assert_eq!(amount_rows, 3);
    }
}

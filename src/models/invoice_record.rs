use chrono::Local;

/// The eight submitted invoice fields. Built up by the form, then read-only
/// through preview and export.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRecord {
    pub amount: String,
    pub bug_date: String,
    pub description: String,
    pub invoice_date: String,
    pub invoice_name: String,
    pub payee_name: String,
    pub payee_address: String,
    pub payee_email: String,
}

impl InvoiceRecord {
    /// An empty record with the invoice date defaulted to today.
    pub fn new() -> Self {
        Self {
            amount: String::new(),
            bug_date: String::new(),
            description: String::new(),
            invoice_date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            invoice_name: String::new(),
            payee_name: String::new(),
            payee_address: String::new(),
            payee_email: String::new(),
        }
    }
}

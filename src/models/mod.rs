mod invoice_record;

pub use invoice_record::InvoiceRecord;

pub mod invoices;
pub mod xendit_callback;

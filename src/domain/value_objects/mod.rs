pub mod enums;
pub mod invoices;
pub mod webhook;

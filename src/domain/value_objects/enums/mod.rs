pub mod booking_log_actions;
pub mod booking_statuses;
pub mod invoice_statuses;
pub mod provider_environments;
pub mod provider_statuses;

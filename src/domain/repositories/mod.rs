pub mod booking_logs;
pub mod bookings;
pub mod installments;
pub mod payment_gateway;
pub mod payment_providers;
pub mod transactions;
pub mod users;

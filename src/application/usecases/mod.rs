pub mod invoice;
pub mod webhook;

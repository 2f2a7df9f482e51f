pub mod cart;
pub mod checkout;
pub mod invoice;
pub mod orders;

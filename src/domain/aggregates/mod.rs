pub mod cart;
pub mod catalog;
pub mod contact;
pub mod order;

pub use cart::{Cart, CartEntry, CartLine};
pub use catalog::{Category, PincodeRate, Product, ProductStatus, Subcategory};
pub use contact::{ContactStatus, ContactSubmission};
pub use order::{Address, Order, OrderItem, OrderStatus, PaymentStatus};

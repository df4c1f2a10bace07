pub mod order_repository;

pub use order_repository::{OrderFilters, OrderRepository};

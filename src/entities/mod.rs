pub mod kitchen_ticket;
pub mod order;
pub mod order_item;
pub mod order_payment;
pub mod tenant;

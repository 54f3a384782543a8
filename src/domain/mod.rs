//! Storefront domain model: aggregates, value objects, events and the
//! read-side seller analytics.
pub mod aggregates;
pub mod analytics;
pub mod events;
pub mod status;
pub mod value_objects;

pub use status::{aggregate_status, OrderStatus};

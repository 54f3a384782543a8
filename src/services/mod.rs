//! Use cases. Each function takes the store it works against, so handlers and
//! tests call them the same way.

pub mod accounts;
pub mod analytics;
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod orders;
pub mod reviews;

use crate::domain::events::DomainEvent;

fn record_all(events: Vec<DomainEvent>) {
    events.iter().for_each(DomainEvent::record);
}

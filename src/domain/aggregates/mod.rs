//! Aggregates module
pub mod order;
pub mod product;
pub mod review;
pub mod coupon;
pub mod checkout;
pub mod user;

pub use order::{NewOrder, Order, OrderError, OrderItem, OrderParts, ShippingAddress, StatusChange, TrackingInfo};
pub use product::{Product, ProductDraft, ProductError};
pub use review::{RatingSummary, Review, ReviewError, Sentiment};
pub use coupon::{AppliedCoupon, Coupon, CouponError};
pub use checkout::{Checkout, CheckoutError, CheckoutLine, Quote};
pub use user::{AddressInput, Credential, GoogleProfile, Role, SavedAddress, User, UserError};

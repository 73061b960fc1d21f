// handlers/mod.rs - Route handlers grouped by resource
//
// Public (no token): health
// Protected (bearer token, /api/*): catalog resources and the upstream proxy

pub mod params;

// Public
pub mod health;

// Catalog resources
pub mod attributes;
pub mod categories;
pub mod colors;
pub mod coupons;
pub mod customers;
pub mod orders;
pub mod products;
pub mod variants;

// Upstream pass-through (/api/enjoy/*)
pub mod proxy;

pub use params::{JsonBody, RecordId, INVALID_ID_MESSAGE};

//! HTTP routes, one module per resource.
//!
//! | Path | Methods |
//! |------|---------|
//! | /health | GET |
//! | /tables, /tables/available, /tables/{id} | GET, POST |
//! | /tables/{id}/assign, /release, /maintenance, /restore | POST |
//! | /orders, /orders/kitchen, /orders/{id} | GET, POST |
//! | /orders/{id}/status | PUT |
//! | /orders/{id}/items[/{line_id}] | POST, PUT, DELETE |
//! | /reservations, /reservations/{id} | GET, POST, PUT |
//! | /reservations/check-availability | POST |
//! | /reservations/{id}/{action} | PUT |
//! | /menu-items, /menu-items/{id}/availability | GET, POST, PUT |

pub mod health;
pub mod menu;
pub mod orders;
pub mod reservations;
pub mod tables;

// Longest-prefix-match IPv4 routing table with a line-oriented batch driver

pub mod config;
pub mod driver;
pub mod error;
pub mod routes;

pub use error::{AppError, AppResult};
pub use routes::lookup::Router;
pub use routes::{Interface, Route, Subnet};

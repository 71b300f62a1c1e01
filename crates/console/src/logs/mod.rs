//! Log selection page and the streaming log viewer.

pub mod page;
pub mod params;
pub mod route;
pub mod sink;

pub use route::routes;

//! API endpoint implementations.

mod apps;
mod converse;
mod devices;

pub use apps::AppsApi;
pub use converse::ConverseApi;
pub use devices::DevicesApi;

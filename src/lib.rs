pub mod analysis;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod dev;
pub mod errors;
pub mod foods;
pub mod identity;
pub mod profiles;
pub mod routing;
pub mod state;
pub mod store;

#[cfg(test)]
mod testing;

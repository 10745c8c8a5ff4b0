//! Test harness

mod service_manager;

pub use service_manager::TestService;

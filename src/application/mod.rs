// Application layer - Use cases and the API seam
pub mod analyzer_api;
pub mod clock;
pub mod dashboard_service;
pub mod device_statistics_service;
pub mod error;
pub mod login_service;
pub mod navigation;
pub mod session;

#[cfg(test)]
pub mod testing;

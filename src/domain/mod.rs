// Domain layer - Pure types and rules, no I/O
pub mod activity;
pub mod connectivity;
pub mod device;
pub mod filters;
pub mod summary;
pub mod timestamp;

//! gRPC service implementations.

pub mod branch;

pub use branch::BranchService;

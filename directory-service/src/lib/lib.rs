pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::account;
pub use domain::appointment;
pub use domain::doctor;
pub use domain::invitation;
pub use domain::provisioning;
pub use outbound::repositories;

pub mod account;
pub mod appointment;
pub(crate) mod blocking;
pub mod doctor;
pub mod invitation;
pub mod provisioning;

use crate::account::models::Account;
use crate::account::models::EmailAddress;
use crate::account::models::Password;
use crate::account::models::Username;
use crate::doctor::models::Doctor;
use crate::doctor::models::DoctorProfile;

/// Command to register a generic user account
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
}

impl RegisterUserCommand {
    pub fn new(username: Username, email: EmailAddress, password: Password) -> Self {
        Self {
            username,
            email,
            password,
        }
    }
}

/// Command to register an account together with a doctor profile
#[derive(Debug, Clone)]
pub struct RegisterDoctorCommand {
    pub account: RegisterUserCommand,
    pub profile: DoctorProfile,
}

/// Outcome of a successful doctor registration.
#[derive(Debug, Clone)]
pub struct ProvisionedDoctor {
    pub account: Account,
    pub doctor: Doctor,
}

/// Message kinds the notification sender knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTemplate {
    UserWelcome,
    DoctorWelcome,
}

/// Addressee of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub email: EmailAddress,
}

impl From<&Account> for Recipient {
    fn from(account: &Account) -> Self {
        Self {
            name: account.username.as_str().to_string(),
            email: account.email.clone(),
        }
    }
}

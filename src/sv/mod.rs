pub mod admin;
pub mod auth;
pub mod device;
pub mod history;
pub mod license;
pub mod notification;
pub mod settings;
pub mod trip;
pub mod user;

#[cfg(test)]
pub(crate) mod fixtures;

pub use admin::{Admin, Bootstrap};
pub use auth::{Auth, Login, Principal, Profile};
pub use device::Device;
pub use history::{Actor, History};
pub use license::{License, LicenseFilter, Standing};
pub use notification::{Filter, Notification, Recipient};
pub use settings::{CompanyProfile, Settings};
pub use trip::{Trip, TripMetrics};
pub use user::{NewUser, User, UserEdit, UserFilter};

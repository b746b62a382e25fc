mod api;
mod health_check;
mod home;
mod login;
pub mod helpers;
pub mod profile;

pub use api::*;
pub use health_check::*;
pub use home::*;
pub use login::*;

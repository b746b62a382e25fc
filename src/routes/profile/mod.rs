mod get;
mod logout;
mod post;

pub use get::profile_form;
pub use logout::log_out;
pub use post::change_password;

pub mod prelude;

pub mod lifecycle;
pub mod user_auths;
pub mod users;

pub mod user;

pub use user::{NewUser, RoleFlags, UserUpdate};

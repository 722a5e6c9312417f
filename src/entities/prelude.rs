pub use super::user_auths::Entity as UserAuths;
pub use super::users::Entity as Users;

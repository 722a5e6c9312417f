mod init;
mod token;
mod user;

pub use init::{cmd_init, cmd_migrate};
pub use token::{cmd_token_issue, cmd_token_list, cmd_token_revoke};
pub use user::{
    cmd_user_create, cmd_user_create_superuser, cmd_user_delete, cmd_user_list, cmd_user_restore,
    cmd_user_show,
};

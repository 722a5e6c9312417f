pub mod account_service;
pub use account_service::{AccountService, TokenInfo, UserInfo};

pub mod account_service_impl;
pub use account_service_impl::SeaOrmAccountService;

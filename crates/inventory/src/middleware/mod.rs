pub mod allowed_hosts;
pub mod rate_limit;
pub mod validate;

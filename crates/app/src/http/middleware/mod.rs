pub mod admin_auth;
pub mod caller_identity;
pub mod search_query_limit;

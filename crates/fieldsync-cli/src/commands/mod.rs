pub mod auto_sync;
pub mod dispatch;
pub mod export;
pub mod field;
pub mod group;
pub mod import;
pub mod pull;
pub mod push;
mod shared;
pub mod status;
pub mod value;

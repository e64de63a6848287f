pub mod add;
pub mod delete;
pub mod dispatch;
pub mod get;
pub mod list;
pub mod schema;
pub mod search;
pub mod shared;
pub mod shell;
pub mod stats;
pub mod update;

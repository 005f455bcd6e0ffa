pub mod db;
pub mod sessions;

pub use db::SqliteAdapter;
pub use sessions::InMemorySessions;

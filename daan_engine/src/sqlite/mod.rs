//! SQLite backend for the Daan engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;

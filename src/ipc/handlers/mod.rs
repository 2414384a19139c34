pub mod assignments;
pub mod backup_exchange;
pub mod core;
pub mod descriptions;
pub mod roster;

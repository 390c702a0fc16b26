pub mod appsettings;
pub mod epguide;
pub mod nba;
pub mod reminder;
pub mod scheduling;
pub mod storage;
pub mod telegram;

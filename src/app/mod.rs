//! 使用派發引擎的應用功能
pub mod users;

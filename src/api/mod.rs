pub mod attendance;
pub mod iot;
pub mod report;

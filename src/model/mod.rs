pub mod attendance;
pub mod role;
pub mod sensor_log;

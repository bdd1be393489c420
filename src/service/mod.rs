pub mod clock;
pub mod evidence;
pub mod report;
pub mod sensor;
pub mod session;

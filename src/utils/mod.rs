pub mod multipart;
pub mod sql;

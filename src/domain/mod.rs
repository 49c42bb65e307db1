pub mod audio;
pub mod job;

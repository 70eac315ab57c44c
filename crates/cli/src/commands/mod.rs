pub mod ask;
pub mod doctor;
pub mod guests;
pub mod init;
pub mod setup;
pub mod tools;

pub mod completion;
pub mod init;
pub mod serve;
pub mod session;
pub mod status;
pub mod user;

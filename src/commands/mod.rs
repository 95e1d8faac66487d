pub mod common;
pub mod export;
pub mod image;
pub mod init;
pub mod next;
pub mod record;
pub mod status;

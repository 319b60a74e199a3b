pub mod init;
pub mod share;
pub mod sync;
pub mod url_prefix;

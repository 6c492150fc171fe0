pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("plist: {0}")]
    Plist(#[from] plist::Error),
    #[error("home directory not found")]
    NoHomeDir,
    #[error("cannot resolve current executable: {0}")]
    CurrentExe(std::io::Error),
}

// Run-at-login management
pub mod registrar;

pub use registrar::{LaunchDescriptor, StartupRegistrar};

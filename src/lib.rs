pub mod args;
pub mod build;
pub mod copy;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod invoke;
pub mod path;
pub mod template;

pub use descriptor::{DescriptorError, OutputKind, ProjectDescriptor, Reference};
pub use error::{Error, Result};
pub use host::{Host, HostBuilder, Platform};

//! faust-td maps Faust UI descriptions onto TouchDesigner custom
//! parameters and widget panels.

pub mod builder;
pub mod config;
pub mod description;
pub mod error;
pub mod host;
pub mod legalize;
pub mod parameter;

pub use builder::{BuildReport, UiBuilder, Widget};
pub use config::BuilderConfig;
pub use description::{UiDescription, UiNode};
pub use error::{BuildError, ErrorKind};

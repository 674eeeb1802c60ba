pub mod annotations;
pub mod config;
pub mod dimension;
pub mod extent;
pub mod ordinal;
pub mod provider;
pub mod value;

pub use annotations::*;
pub use config::*;
pub use dimension::*;
pub use extent::*;
pub use ordinal::*;
pub use provider::*;
pub use value::*;

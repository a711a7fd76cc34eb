mod expr;
mod logical_id;
mod references;
pub mod resources;
mod template;

pub use expr::Expr;
pub use logical_id::LogicalId;
pub use references::References;
pub use resources::ResourceType;
pub use template::{Export, Format, Output, Parameter, Template};

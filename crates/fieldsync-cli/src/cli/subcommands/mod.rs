mod field;
mod group;
mod value;

pub use field::{FieldAddArgs, FieldCommands};
pub use group::{GroupAddArgs, GroupCommands};
pub use value::{ValueCommands, ValueSetArgs};

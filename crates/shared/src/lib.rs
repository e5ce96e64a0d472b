mod command;
pub mod mealplan;
mod permission;

pub use command::*;
pub use permission::*;

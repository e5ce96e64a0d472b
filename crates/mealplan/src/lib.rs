pub mod calendar;
mod deletion;
pub mod key;
mod plan;
mod recipe;
mod repository;
mod service;

pub use calendar::Clock;
pub use deletion::*;
pub use plan::*;
pub use plateplan_shared::mealplan::MealPlanError;
pub use recipe::*;
pub use repository::*;
pub use service::*;

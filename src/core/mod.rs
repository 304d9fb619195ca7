pub mod category;
pub mod quote;
pub mod theme;
pub mod todo;

pub use category::Category;
pub use theme::Theme;
pub use todo::Todo;

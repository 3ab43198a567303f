pub mod diagnosis;
pub mod enums;
pub mod history;
pub mod upload;

pub use diagnosis::*;
pub use enums::*;
pub use history::*;
pub use upload::*;

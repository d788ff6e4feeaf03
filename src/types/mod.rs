pub mod errors;
pub mod ids;
pub mod ops;
pub mod report;
pub mod safepath;

pub use errors::*;
pub use ids::*;
pub use ops::*;
pub use report::*;
pub use safepath::*;

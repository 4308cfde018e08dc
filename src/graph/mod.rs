pub mod conversion;
pub mod definition;
pub mod document;
pub mod index;
pub mod semantics;

pub use conversion::*;
pub use definition::*;
pub use document::*;
pub use index::GraphIndex;
pub use semantics::*;

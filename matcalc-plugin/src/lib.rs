//! matcalc Plugin System
//!
//! Operations are registered as plugins: a pure `call` over `Value`s plus
//! static metadata used for help text, listings and calculator buttons.

mod traits;
mod registry;

pub use traits::{OperationPlugin, OperationMeta, ArgMeta};
pub use registry::OperationRegistry;

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{OperationPlugin, OperationMeta, ArgMeta, OperationRegistry};
    pub use matcalc_core::prelude::*;
}

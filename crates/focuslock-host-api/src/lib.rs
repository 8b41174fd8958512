//! App catalog interfaces for focuslockd
//!
//! The daemon decorates block-list entries with installed-application
//! metadata. Enumerating applications is platform work; this crate defines
//! the seam and ships a static catalog plus a mock. It contains no platform
//! code itself.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;

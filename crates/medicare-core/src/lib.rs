pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod i18n;
pub mod types;

pub use config::MedicareConfig;
pub use context::ViewContext;
pub use error::{MedicareError, Result};
pub use events::{ClientEvent, EventBus};
pub use i18n::{strings, Strings};
pub use types::*;

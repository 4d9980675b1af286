pub mod calendar;
pub mod command;
pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod picker;
pub mod ui;

pub use calendar::{Direction, MonthIndex, Selection};
pub use dom::{Document, MemoryDocument, NodeId};
pub use error::{Error, ErrorKind, Result};
pub use picker::{Action, DatePicker, Labels};

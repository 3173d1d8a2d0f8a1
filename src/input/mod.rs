//! Hardware events as the core sees them, plus the line codec and reader
//! thread for the serial/stdin event source.

mod event;
mod line;
mod spawn;

pub use event::{discard_keys_before_hang_up, HookState, InputEvent};
pub use line::{format_event, parse_line, LineError};
pub use spawn::spawn_line_reader;

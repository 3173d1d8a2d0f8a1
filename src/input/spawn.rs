use super::event::InputEvent;
use super::line::parse_line;
use crossbeam_channel::Sender;
use std::io::BufRead;
use std::thread;
use tracing::{debug, warn};

/// Read event lines from `reader` on a background thread and forward them.
///
/// The thread exits on end of input, on a read error, or once the receiving
/// side is dropped. Dropping `tx` on exit is how the event loop learns the
/// source went away.
pub fn spawn_line_reader<R>(reader: R, tx: Sender<InputEvent>) -> thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(error = %err, "event source read error");
                    break;
                }
            };
            match parse_line(&line) {
                Ok(Some(event)) => {
                    if tx.send(event).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => debug!(error = %err, "skipping malformed event line"),
            }
        }
        debug!("event source closed");
    })
}

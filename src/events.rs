use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

pub enum Event {
    Input(String),
    /// Input stream closed.
    Eof,
}

/// Reads input lines on a separate thread and hands them out one at a time,
/// so each event is handled to completion before the next one is taken.
pub struct Dispatcher {
    rx: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    _input_handle: thread::JoinHandle<()>,
}

impl Default for Dispatcher {
    fn default() -> Dispatcher {
        Dispatcher::from_reader(io::stdin)
    }
}

impl Dispatcher {
    /// `open` is called on the input thread.
    pub fn from_reader<R, O>(open: O) -> Dispatcher
    where
        R: io::Read,
        O: FnOnce() -> R + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let input_handle = {
            let tx = tx.clone();
            thread::spawn(move || {
                let reader = io::BufReader::new(open());
                for line in reader.lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(Event::Input(line)).is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            log::warn!("Error while reading input: {}", e);
                            break;
                        }
                    }
                }
                let _ = tx.send(Event::Eof);
            })
        };

        Dispatcher {
            rx,
            tx,
            _input_handle: input_handle,
        }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }

    pub fn event_sink(&self) -> &mpsc::Sender<Event> {
        &self.tx
    }
}

pub mod console;
pub mod log;
pub mod multi;
pub mod noop;
pub mod traits;

pub use self::log::LogObserver;
pub use console::ConsoleObserver;
pub use multi::MultiObserver;
pub use noop::NoopObserver;
pub use traits::{Observer, ObserverEvent};

/// Observer used by the terminal session: console lines plus tracing.
pub fn create_observer(verbose: bool) -> Box<dyn Observer> {
    Box::new(MultiObserver::new(vec![
        Box::new(ConsoleObserver::stdout(verbose)),
        Box::new(LogObserver::new()),
    ]))
}

/*!
Signal/slot dispatch for ankurah

A [`Signal`] calls back into any number of listeners. A listener embeds an [`Observer`], which
records the signals it is attached to. Either side may be dropped first: dropping a signal
releases every observer's record of it, and dropping an observer removes its slots from every
signal. Neither side keeps the other alive.

# Design requirements:
- single threaded and synchronous - slots run on the emitting thread, in attachment order
- a slot that panics must not prevent the other slots from being called
- attaching the same (listener, method) pair twice is a no-op
- the invocation policy is part of the signal's type

# Basic usage

```rust
use ankurah_slots::*;
use std::{cell::Cell, rc::Rc};

struct Ticker {
    observer: Observer,
    ticks: Cell<i32>,
}

impl Observe for Ticker {
    fn observer(&self) -> &Observer { &self.observer }
}

impl Ticker {
    fn new(ticks: i32) -> Rc<Self> { Rc::new(Self { observer: Observer::new(), ticks: Cell::new(ticks) }) }

    fn on_tick(&self, step: i32) -> i32 {
        self.ticks.set(self.ticks.get() + step);
        self.ticks.get()
    }
}

let tick: Collecting<i32, i32> = Signal::new();
let a = Ticker::new(0);
let b = Ticker::new(100);
tick.attach(&a, Ticker::on_tick);
tick.attach(&b, Ticker::on_tick);
tick.attach(&b, Ticker::on_tick); // already attached

assert_eq!(tick.emit(5), vec![Ok(5), Ok(105)]);

// dropping a listener detaches it
drop(a);
assert_eq!(tick.emit(5), vec![Ok(110)]);
```

# Fire and forget

```rust
use ankurah_slots::*;
use std::{cell::RefCell, rc::Rc};

#[derive(Default)]
struct Log {
    observer: Observer,
    lines: RefCell<Vec<String>>,
}

impl Observe for Log {
    fn observer(&self) -> &Observer { &self.observer }
}

impl Log {
    fn on_message(&self, message: String) { self.lines.borrow_mut().push(message) }
}

let log = Rc::new(Log::default());
{
    let message: FireAndForget<(), String> = Signal::new();
    message.attach(&log, Log::on_message);
    message.emit("hello".to_string());
    assert_eq!(log.observer.signal_count(), 1);
}
// the signal is gone, and so is the observer's record of it
assert_eq!(log.observer.signal_count(), 0);
assert_eq!(*log.lines.borrow(), ["hello"]);
```
*/

mod error;
mod observer;
mod signal;
mod slot;

pub use error::*;
pub use observer::*;
pub use signal::*;
pub use slot::*;

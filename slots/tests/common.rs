use ankurah_slots::{Observe, Observer};
use std::cell::RefCell;
use std::rc::Rc;

#[allow(unused)]
pub fn init_tracing() { let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).with_test_writer().try_init(); }

/// Returns an accumulator and a function that drains everything accumulated so far
#[allow(unused)]
pub fn watcher<T: 'static>() -> (Rc<dyn Fn(T)>, Box<dyn Fn() -> Vec<T>>) {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let watcher = {
        let changes = changes.clone();
        Rc::new(move |value: T| changes.borrow_mut().push(value))
    };
    let check = Box::new(move || {
        let changes: Vec<T> = changes.borrow_mut().drain(..).collect();
        changes
    });
    (watcher, check)
}

/// A listener that records every call it receives as "name:value"
pub struct Tick {
    observer: Observer,
    pub name: &'static str,
    record: Rc<dyn Fn(String)>,
}

impl Observe for Tick {
    fn observer(&self) -> &Observer { &self.observer }
}

#[allow(unused)]
impl Tick {
    pub fn new(name: &'static str, record: &Rc<dyn Fn(String)>) -> Rc<Self> {
        Rc::new(Self { observer: Observer::new(), name, record: record.clone() })
    }

    pub fn on_tick(&self, value: i32) -> i32 {
        (self.record)(format!("{}:{value}", self.name));
        value + 1
    }

    pub fn on_tock(&self, value: i32) -> i32 {
        (self.record)(format!("{}:tock:{value}", self.name));
        value - 1
    }

    pub fn on_notify(&self, value: i32) { (self.record)(format!("{}:{value}", self.name)); }

    pub fn fail(&self, value: i32) -> i32 {
        (self.record)(format!("{}:fail:{value}", self.name));
        panic!("{} refused {value}", self.name)
    }

    pub fn fail_notify(&self, value: i32) {
        (self.record)(format!("{}:fail:{value}", self.name));
        panic!("{} refused {value}", self.name)
    }
}

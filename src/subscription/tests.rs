use super::*;
use assert_call::{call, CallRecorder};
use std::cell::Cell;

fn on_release(rc: Rc<Cell<i32>>) {
    call!("{}", rc.get());
}

#[test]
fn empty_does_nothing() {
    let mut cr = CallRecorder::new();
    let s = Subscription::empty();
    assert!(s.is_empty());
    assert!(Subscription::default().is_empty());
    drop(s);
    cr.verify(());
}

#[test]
fn from_fn_calls_on_drop() {
    let mut cr = CallRecorder::new();
    {
        let s = Subscription::from_fn(|| call!("drop"));
        assert!(!s.is_empty());
    }
    cr.verify("drop");
}

#[test]
fn from_weak_fn_calls_when_alive() {
    let mut cr = CallRecorder::new();
    let rc = Rc::new(Cell::new(9));
    {
        let _s = Subscription::from_weak_fn(Rc::downgrade(&rc), on_release);
    }
    cr.verify("9");
}

#[test]
fn from_weak_fn_noop_when_dead() {
    let mut cr = CallRecorder::new();
    let rc = Rc::new(Cell::new(1));
    let weak = Rc::downgrade(&rc);
    drop(rc);
    {
        let _s = Subscription::from_weak_fn(weak, on_release);
    }
    cr.verify(());
}

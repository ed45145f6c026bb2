use std::{cell::RefCell, rc::Rc};

use assert_call::{call, CallRecorder};
use reblend::*;

#[derive(Clone, Debug)]
enum Action {
    Add(&'static str),
    Toggle(usize),
}

fn todos(state: &Value, action: Action) -> Value {
    let next = Object::array(Vec::new());
    let items = state.as_object().map(|o| o.entries()).unwrap_or_default();
    for (i, (_, item)) in items.into_iter().enumerate() {
        let copy: Object = item
            .as_object()
            .map(|o| o.entries().into_iter().collect())
            .unwrap_or_default();
        if matches!(action, Action::Toggle(n) if n == i) {
            copy.set("done", !item.get("done").as_bool().unwrap_or(false));
        }
        next.push(copy);
    }
    if let Action::Add(title) = action {
        let item = Object::new();
        item.set("title", title);
        item.set("done", false);
        next.push(item);
    }
    next.into()
}

#[test]
fn todo_list() {
    let mut cr = CallRecorder::new();
    let filter = Context::new("all".to_string());
    let dispatch: Rc<RefCell<Option<Dispatch<Value, Action>>>> = Rc::default();
    let d = dispatch.clone();

    let app = Component::new("x-todos", |cx| {
        let (items, dispatch) = cx.use_reducer(todos, Value::array(Vec::new()));
        *d.borrow_mut() = Some(dispatch);
        let filter = cx.use_context(&filter);

        let saved = items.clone();
        cx.use_effect(
            move || vec![saved.get()],
            || {
                call!("save");
                Subscription::empty()
            },
        );

        move || {
            let filter = filter.get();
            let list = items.get();
            let list = list.as_object().map(|o| o.entries()).unwrap_or_default();
            call!("render {} {}", filter, list.len());
            list.into_iter()
                .filter(|(_, item)| filter == "all" || item.get("done").as_bool() == Some(false))
                .map(|(_, item)| {
                    Node::element("li").with_children([Node::text(item.get("title").as_str().unwrap_or(""))])
                })
                .collect()
        }
    });
    cr.verify(["save", "render all 0"]);

    let dispatch = dispatch.borrow().clone().unwrap();
    dispatch.dispatch(Action::Add("write tests"));
    cr.verify(["save", "render all 1"]);

    dispatch.dispatch(Action::Add("ship"));
    cr.verify(["save", "render all 2"]);
    assert_eq!(app.host().text_content(), "write testsship");

    // the reducer rebuilds every object, but the result is deeply equal
    dispatch.dispatch(Action::Toggle(9));
    cr.verify(());

    dispatch.dispatch(Action::Toggle(0));
    cr.verify(["save", "render all 2"]);

    filter.update("active".to_string());
    cr.verify("render active 2");
    assert_eq!(app.host().text_content(), "ship");

    drop(app);
    assert_eq!(filter.subscriber_count(), 0);
    dispatch.dispatch(Action::Add("ignored"));
    cr.verify(());
}

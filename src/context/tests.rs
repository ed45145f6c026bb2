use assert_call::{call, CallRecorder};

use crate::{Component, Context, ContextDispatch, Error, Node, Value};

fn consumer(name: &'static str, theme: &Context<String>) -> Component {
    Component::new("x-consumer", |cx| {
        let value = cx.use_context(theme);
        move || {
            call!("{} {}", name, value.get());
            vec![Node::text(&value.get())]
        }
    })
}

#[test]
fn use_context_reads_current_value() {
    let mut cr = CallRecorder::new();
    let theme = Context::new("light".to_string());
    let c = consumer("a", &theme);
    cr.verify("a light");
    assert_eq!(c.host().text_content(), "light");
    assert_eq!(theme.subscriber_count(), 1);
}

#[test]
fn update_notifies_subscribers_in_order() {
    let mut cr = CallRecorder::new();
    let theme = Context::new("light".to_string());
    let a = consumer("a", &theme);
    let b = consumer("b", &theme);
    let c = consumer("c", &theme);
    cr.verify(["a light", "b light", "c light"]);

    theme.update("dark".to_string());
    cr.verify(["a dark", "b dark", "c dark"]);
    assert_eq!(theme.get(), "dark");
    for x in [&a, &b, &c] {
        assert_eq!(x.host().text_content(), "dark");
    }
}

#[test]
fn equal_update_notifies_nobody() {
    let mut cr = CallRecorder::new();
    let theme = Context::new("light".to_string());
    let _a = consumer("a", &theme);
    let _b = consumer("b", &theme);
    cr.verify(["a light", "b light"]);

    theme.update("light".to_string());
    theme.update_with(|s| s.clone());
    cr.verify(());
}

#[test]
fn deep_equal_value_update_notifies_nobody() {
    let mut cr = CallRecorder::new();
    let v = |s: &str| -> Value { serde_json::from_str(s).unwrap() };
    let settings = Context::new(v(r#"{"lang":"en"}"#));
    let _c = Component::new("x-a", |cx| {
        let s = cx.use_context(&settings);
        move || {
            call!("render {:?}", s.get().get("lang"));
            Vec::new()
        }
    });
    cr.verify(r#"render "en""#);

    settings.update(v(r#"{"lang":"en"}"#));
    cr.verify(());

    settings.update(v(r#"{"lang":"fr"}"#));
    cr.verify(r#"render "fr""#);
}

#[test]
fn unmount_deregisters() {
    let mut cr = CallRecorder::new();
    let theme = Context::new("light".to_string());
    let a = consumer("a", &theme);
    let b = consumer("b", &theme);
    cr.verify(["a light", "b light"]);

    a.unmount();
    assert_eq!(theme.subscriber_count(), 1);
    theme.update("dark".to_string());
    cr.verify("b dark");

    drop(b);
    assert_eq!(theme.subscriber_count(), 0);
    theme.update("light".to_string());
    cr.verify(());
}

#[test]
fn subscription_order_survives_slot_reuse() {
    let mut cr = CallRecorder::new();
    let theme = Context::new("light".to_string());
    let a = consumer("a", &theme);
    let _b = consumer("b", &theme);
    drop(a);
    let _c = consumer("c", &theme);
    cr.verify(["a light", "b light", "c light"]);

    theme.update("dark".to_string());
    cr.verify(["b dark", "c dark"]);
}

#[test]
fn dispatch_updates_context() {
    let mut cr = CallRecorder::new();
    let theme = Context::new("light".to_string());
    let mut dispatch: Option<ContextDispatch<String>> = None;
    let toggle = Component::new("x-toggle", |cx| {
        dispatch = Some(cx.use_context_dispatch(&theme));
        || Vec::new()
    });
    let dispatch = dispatch.unwrap();
    assert_eq!(theme.subscriber_count(), 0);
    let _a = consumer("a", &theme);
    cr.verify("a light");

    dispatch.update_with(|s| if s == "light" { "dark".into() } else { "light".into() });
    cr.verify("a dark");

    toggle.unmount();
    dispatch.update("light".to_string());
    cr.verify(());
    assert_eq!(theme.get(), "dark");
}

#[test]
fn use_context_dyn() {
    let mut cr = CallRecorder::new();
    let count = Context::new(1);
    let any = count.to_any();
    let _c = Component::new("x-a", |cx| {
        let v = cx.use_context_dyn::<i32>(&any).unwrap();
        move || {
            call!("render {}", v.get());
            Vec::new()
        }
    });
    cr.verify("render 1");
    count.update(2);
    cr.verify("render 2");
}

#[test]
fn use_context_dyn_wrong_type() {
    let any = Context::new(1).to_any();
    let mut result = None;
    let _c = Component::new("x-a", |cx| {
        result = Some(cx.use_context_dyn::<String>(&any).map(|_| ()));
        || Vec::new()
    });
    let err = result.unwrap().unwrap_err();
    assert_eq!(
        err,
        Error::InvalidContext {
            expected: std::any::type_name::<String>()
        }
    );
    assert!(err.to_string().starts_with("invalid context"));
}

#[test]
fn update_from_effect_is_batched() {
    let mut cr = CallRecorder::new();
    let theme = Context::new("light".to_string());
    let _a = consumer("a", &theme);
    let _b = consumer("b", &theme);
    cr.verify(["a light", "b light"]);

    crate::batch(|| {
        theme.update("dark".to_string());
        theme.update("blue".to_string());
        call!("batch end");
    });
    cr.verify(["batch end", "a blue", "b blue"]);
}

use crate::Node;

#[test]
fn build_tree() {
    let ul = Node::element("ul")
        .with_attribute("class", "list")
        .with_children([
            Node::element("li").with_children([Node::text("a")]),
            Node::element("li").with_children([Node::text("b")]),
        ]);
    assert_eq!(ul.tag(), "ul");
    assert_eq!(ul.child_count(), 2);
    assert_eq!(ul.attribute("class").as_deref(), Some("list"));
    assert_eq!(ul.text_content(), "ab");
    assert_eq!(format!("{ul:?}"), r#"<ul><li>"a"</li><li>"b"</li></ul>"#);
}

#[test]
fn set_attribute_replaces() {
    let div = Node::element("div");
    div.set_attribute("id", "a");
    div.set_attribute("id", "b");
    assert_eq!(div.attribute("id").as_deref(), Some("b"));
    assert_eq!(div.attribute("title"), None);
}

#[test]
fn text_nodes() {
    let t = Node::text("hi");
    assert!(t.is_text());
    assert!(!Node::element("span").is_text());
    assert_eq!(t.text_content(), "hi");
}

#[test]
fn clear_removes_children() {
    let div = Node::element("div");
    let child = Node::element("span");
    div.append(child.clone());
    div.append_all([Node::text("x")]);
    assert!(div.children()[0].ptr_eq(&child));

    div.clear();
    assert_eq!(div.child_count(), 0);
    assert_eq!(div.text_content(), "");
}

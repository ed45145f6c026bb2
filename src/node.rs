use std::{
    cell::RefCell,
    fmt::{self, Debug},
    rc::Rc,
};

#[cfg(test)]
mod tests;

const TEXT_TAG: &str = "#text";

/// Handle to a host DOM node.
///
/// The node tree is rendered output, not state: the equality engine treats any two nodes with the same tag as equal.
#[derive(Clone)]
pub struct Node(Rc<NodeData>);

struct NodeData {
    tag: Rc<str>,
    text: RefCell<Option<Rc<str>>>,
    attributes: RefCell<Vec<(Rc<str>, Rc<str>)>>,
    children: RefCell<Vec<Node>>,
}

impl Node {
    pub fn element(tag: &str) -> Self {
        Self::new(tag.into(), None)
    }
    pub fn text(content: &str) -> Self {
        Self::new(TEXT_TAG.into(), Some(content.into()))
    }
    fn new(tag: Rc<str>, text: Option<Rc<str>>) -> Self {
        Self(Rc::new(NodeData {
            tag,
            text: RefCell::new(text),
            attributes: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
        }))
    }

    pub fn tag(&self) -> &str {
        &self.0.tag
    }
    pub(crate) fn tag_rc(&self) -> Rc<str> {
        self.0.tag.clone()
    }
    pub fn is_text(&self) -> bool {
        &*self.0.tag == TEXT_TAG
    }

    pub fn attribute(&self, name: &str) -> Option<Rc<str>> {
        self.0
            .attributes
            .borrow()
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| v.clone())
    }
    pub fn set_attribute(&self, name: &str, value: &str) {
        let mut attributes = self.0.attributes.borrow_mut();
        if let Some(slot) = attributes.iter_mut().find(|(n, _)| &**n == name) {
            slot.1 = value.into();
        } else {
            attributes.push((name.into(), value.into()));
        }
    }
    /// Sets an attribute and returns the node, for building trees in render functions.
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }
    pub fn with_children(self, children: impl IntoIterator<Item = Node>) -> Self {
        self.append_all(children);
        self
    }

    pub fn append(&self, child: Node) {
        self.0.children.borrow_mut().push(child);
    }
    pub fn append_all(&self, children: impl IntoIterator<Item = Node>) {
        self.0.children.borrow_mut().extend(children);
    }
    /// Removes every child node.
    pub fn clear(&self) {
        let children = std::mem::take(&mut *self.0.children.borrow_mut());
        drop(children);
    }
    pub fn children(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }
    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut s = String::new();
        self.collect_text(&mut s);
        s
    }
    fn collect_text(&self, s: &mut String) {
        if let Some(text) = &*self.0.text.borrow() {
            s.push_str(text);
        }
        for child in self.0.children.borrow().iter() {
            child.collect_text(s);
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_text() {
            return write!(f, "{:?}", self.text_content());
        }
        write!(f, "<{}>", self.tag())?;
        for child in self.0.children.borrow().iter() {
            write!(f, "{child:?}")?;
        }
        write!(f, "</{}>", self.tag())
    }
}

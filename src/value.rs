use std::{
    cell::RefCell,
    fmt::{self, Debug},
    hash::{Hash, Hasher},
    rc::Rc,
};

use indexmap::{Equivalent, IndexMap};

use crate::Node;

mod serialize;
#[cfg(test)]
mod tests;

/// A dynamically typed value, as seen by component props, state and dependency lists.
///
/// Composite variants (`Object`, `Function`, `Node`) are reference handles: cloning a
/// `Value` shares the underlying object, and [`strict_eq`](Self::strict_eq) compares them by identity.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Symbol(Symbol),
    Object(Object),
    Function(Function),
    Node(Node),
}

impl Value {
    /// Creates an array object holding `items`.
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Object(Object::array(items))
    }

    /// Returns the name `typeof` would report for this value.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Object(_) | Value::Node(_) => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Function(_) => "function",
        }
    }

    /// Returns `true` for objects, functions and nodes. `null` is not object-like.
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Value::Object(_) | Value::Function(_) | Value::Node(_)
        )
    }
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Strict equality (`===`).
    ///
    /// Primitives compare by value (`NaN` is never equal to itself), everything else by identity.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Node(a), Value::Node(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Returns the constructor of this value, or `None` for `undefined` and `null`.
    pub fn constructor(&self) -> Option<Constructor> {
        Some(match self {
            Value::Undefined | Value::Null => return None,
            Value::Bool(_) => Constructor::Boolean,
            Value::Number(_) => Constructor::Number,
            Value::String(_) => Constructor::String,
            Value::Symbol(_) => Constructor::Symbol,
            Value::Object(o) => o.constructor(),
            Value::Function(_) => Constructor::Function,
            Value::Node(n) => Constructor::Node(n.tag_rc()),
        })
    }

    /// Reads an own string-keyed property. Returns `Undefined` when absent or when this value has no properties.
    pub fn get(&self, key: &str) -> Value {
        let value = match self {
            Value::Object(o) => o.get(key),
            Value::Function(f) => f.get(&PropertyKey::from(key)),
            _ => None,
        };
        value.unwrap_or_default()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => Debug::fmt(b, f),
            Value::Number(n) => Debug::fmt(n, f),
            Value::String(s) => Debug::fmt(s, f),
            Value::Symbol(s) => Debug::fmt(s, f),
            Value::Object(o) => Debug::fmt(o, f),
            Value::Function(func) => Debug::fmt(func, f),
            Value::Node(n) => Debug::fmt(n, f),
        }
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Number(value as f64)
                }
            }
        )*
    };
}
impl_from_number!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value.into())
    }
}
impl From<Rc<str>> for Value {
    fn from(value: Rc<str>) -> Self {
        Value::String(value)
    }
}
impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Value::Symbol(value)
    }
}
impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}
impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Value::Function(value)
    }
}
impl From<Node> for Value {
    fn from(value: Node) -> Self {
        Value::Node(value)
    }
}
impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::array(value)
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}

/// The constructor identity of a value, as compared by the equality engine.
#[derive(Clone, Debug)]
pub enum Constructor {
    Boolean,
    Number,
    String,
    Symbol,
    Object,
    Array,
    Function,
    /// Host node of the given tag.
    Node(Rc<str>),
    /// User-defined class, compared by identity.
    Class(Class),
}
impl PartialEq for Constructor {
    fn eq(&self, other: &Self) -> bool {
        use Constructor::*;
        match (self, other) {
            (Boolean, Boolean)
            | (Number, Number)
            | (String, String)
            | (Symbol, Symbol)
            | (Object, Object)
            | (Array, Array)
            | (Function, Function) => true,
            (Node(a), Node(b)) => a == b,
            (Class(a), Class(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}
impl Eq for Constructor {}

/// A user-defined class. Instances created with [`Object::with_class`] share its identity.
#[derive(Clone)]
pub struct Class(Rc<str>);

impl Class {
    pub fn new(name: &str) -> Self {
        Self(name.into())
    }
    pub fn name(&self) -> &str {
        &self.0
    }
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.0)
    }
}

/// A unique symbol. Two symbols are equal only if they are the same symbol.
#[derive(Clone)]
pub struct Symbol(Rc<Option<Rc<str>>>);

impl Symbol {
    pub fn new(description: Option<&str>) -> Self {
        Self(Rc::new(description.map(Rc::from)))
    }
    pub fn description(&self) -> Option<&str> {
        self.0.as_deref()
    }
}
impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Symbol {}
impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.0), state)
    }
}
impl Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

/// The key of an own property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyKey {
    String(Rc<str>),
    Symbol(Symbol),
}
// A string key hashes like the bare `str`, so lookups by `&str` need no allocation.
impl Hash for PropertyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            PropertyKey::String(s) => s.hash(state),
            PropertyKey::Symbol(s) => s.hash(state),
        }
    }
}
impl Equivalent<PropertyKey> for str {
    fn equivalent(&self, key: &PropertyKey) -> bool {
        key.as_str() == Some(self)
    }
}
impl PropertyKey {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyKey::String(s) => Some(s),
            PropertyKey::Symbol(_) => None,
        }
    }
}
impl From<&str> for PropertyKey {
    fn from(value: &str) -> Self {
        PropertyKey::String(value.into())
    }
}
impl From<String> for PropertyKey {
    fn from(value: String) -> Self {
        PropertyKey::String(value.into())
    }
}
impl From<Rc<str>> for PropertyKey {
    fn from(value: Rc<str>) -> Self {
        PropertyKey::String(value)
    }
}
impl From<Symbol> for PropertyKey {
    fn from(value: Symbol) -> Self {
        PropertyKey::Symbol(value)
    }
}

/// Own properties in insertion order.
#[derive(Default)]
struct Properties {
    map: IndexMap<PropertyKey, Value>,
    symbols: usize,
}

impl Properties {
    fn get(&self, key: &PropertyKey) -> Option<&Value> {
        self.map.get(key)
    }
    fn get_str(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }
    fn set(&mut self, key: PropertyKey, value: Value) {
        let is_symbol = matches!(key, PropertyKey::Symbol(_));
        if self.map.insert(key, value).is_none() && is_symbol {
            self.symbols += 1;
        }
    }
    fn remove(&mut self, key: &PropertyKey) -> Option<Value> {
        let value = self.map.shift_remove(key)?;
        if matches!(key, PropertyKey::Symbol(_)) {
            self.symbols -= 1;
        }
        Some(value)
    }
    fn string_len(&self) -> usize {
        self.map.len() - self.symbols
    }
    fn string_entries(&self) -> impl Iterator<Item = (&Rc<str>, &Value)> {
        self.map.iter().filter_map(|(k, v)| match k {
            PropertyKey::String(s) => Some((s, v)),
            PropertyKey::Symbol(_) => None,
        })
    }
    /// Names first, then symbols, each in insertion order.
    fn keys_names_then_symbols(&self) -> Vec<PropertyKey> {
        let names = self.map.keys().filter(|k| matches!(k, PropertyKey::String(_)));
        let symbols = self.map.keys().filter(|k| matches!(k, PropertyKey::Symbol(_)));
        names.chain(symbols).cloned().collect()
    }
}

thread_local! {
    static DEBUG_STACK: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

fn fmt_guarded(
    id: usize,
    f: &mut fmt::Formatter<'_>,
    body: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    if DEBUG_STACK.with(|s| s.borrow().contains(&id)) {
        return write!(f, "[Circular]");
    }
    DEBUG_STACK.with(|s| s.borrow_mut().push(id));
    let ret = body(f);
    DEBUG_STACK.with(|s| s.borrow_mut().pop());
    ret
}

/// A mutable object with ordered own properties.
///
/// Arrays are objects whose constructor is [`Constructor::Array`] and whose keys are the indices `"0"`, `"1"`, ...
#[derive(Clone)]
pub struct Object(Rc<ObjectData>);

struct ObjectData {
    constructor: Constructor,
    props: RefCell<Properties>,
}

impl Object {
    pub fn new() -> Self {
        Self::with_constructor(Constructor::Object)
    }
    /// Creates an instance of `class`.
    pub fn with_class(class: &Class) -> Self {
        Self::with_constructor(Constructor::Class(class.clone()))
    }
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        let this = Self::with_constructor(Constructor::Array);
        for item in items {
            this.push(item);
        }
        this
    }
    fn with_constructor(constructor: Constructor) -> Self {
        Self(Rc::new(ObjectData {
            constructor,
            props: RefCell::new(Properties::default()),
        }))
    }

    pub fn constructor(&self) -> Constructor {
        self.0.constructor.clone()
    }
    pub fn is_array(&self) -> bool {
        self.0.constructor == Constructor::Array
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.props.borrow().get_str(key).cloned()
    }
    pub fn get_key(&self, key: &PropertyKey) -> Option<Value> {
        self.0.props.borrow().get(key).cloned()
    }
    pub fn has_own(&self, key: &str) -> bool {
        self.0.props.borrow().get_str(key).is_some()
    }
    /// Sets an own property, keeping its position if it already exists.
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) {
        self.0.props.borrow_mut().set(key.into(), value.into());
    }
    pub fn remove(&self, key: impl Into<PropertyKey>) -> Option<Value> {
        self.0.props.borrow_mut().remove(&key.into())
    }
    /// Appends `value` under the next index key.
    pub fn push(&self, value: impl Into<Value>) {
        let index = self.len();
        self.set(index.to_string(), value);
    }

    /// Own enumerable string keys in insertion order. Symbol keys are not included.
    pub fn keys(&self) -> Vec<Rc<str>> {
        self.0
            .props
            .borrow()
            .string_entries()
            .map(|(k, _)| k.clone())
            .collect()
    }
    pub fn entries(&self) -> Vec<(Rc<str>, Value)> {
        self.0
            .props
            .borrow()
            .string_entries()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
    pub fn len(&self) -> usize {
        self.0.props.borrow().string_len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
    pub(crate) fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}
impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}
impl<K: Into<PropertyKey>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let this = Object::new();
        for (k, v) in iter {
            this.set(k, v);
        }
        this
    }
}
impl Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_guarded(self.id(), f, |f| {
            let entries = self.entries();
            if self.is_array() {
                f.debug_list().entries(entries.iter().map(|(_, v)| v)).finish()
            } else {
                if let Constructor::Class(class) = &self.0.constructor {
                    write!(f, "{} ", class.name())?;
                }
                f.debug_map()
                    .entries(entries.iter().map(|(k, v)| (k, v)))
                    .finish()
            }
        })
    }
}

type Body = Rc<dyn Fn(&[Value]) -> Value>;

/// A function value.
///
/// Functions are compared by name, source text, prototype and own properties, so two closures
/// built from the same source compare equal even though they are distinct objects.
#[derive(Clone)]
pub struct Function(Rc<FunctionData>);

struct FunctionData {
    name: Option<Rc<str>>,
    source: Rc<str>,
    prototype: Option<Object>,
    props: RefCell<Properties>,
    body: Option<Body>,
}

impl Function {
    /// Creates an anonymous function without prototype, like an arrow function.
    pub fn new(source: &str) -> Self {
        Self::builder(source).build()
    }
    pub fn builder(source: &str) -> FunctionBuilder {
        FunctionBuilder {
            name: None,
            source: source.into(),
            prototype: None,
            body: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }
    pub fn source(&self) -> &str {
        &self.0.source
    }
    /// Returns the `prototype` object, or `Undefined` for functions without one.
    pub fn prototype(&self) -> Value {
        self.0.prototype.clone().map(Value::Object).unwrap_or_default()
    }

    pub fn get(&self, key: &PropertyKey) -> Option<Value> {
        self.0.props.borrow().get(key).cloned()
    }
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) {
        self.0.props.borrow_mut().set(key.into(), value.into());
    }
    /// Own property names followed by own property symbols.
    pub fn own_property_keys(&self) -> Vec<PropertyKey> {
        self.0.props.borrow().keys_names_then_symbols()
    }

    /// Invokes the body. Functions built without a body return `Undefined`.
    pub fn call(&self, args: &[Value]) -> Value {
        match &self.0.body {
            Some(body) => body(args),
            None => Value::Undefined,
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
    pub(crate) fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}
impl Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function: {}]", self.name().unwrap_or("(anonymous)"))
    }
}

pub struct FunctionBuilder {
    name: Option<Rc<str>>,
    source: Rc<str>,
    prototype: Option<Object>,
    body: Option<Body>,
}
impl FunctionBuilder {
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.into());
        self
    }
    pub fn prototype(mut self, prototype: Object) -> Self {
        self.prototype = Some(prototype);
        self
    }
    pub fn body(mut self, body: impl Fn(&[Value]) -> Value + 'static) -> Self {
        self.body = Some(Rc::new(body));
        self
    }
    pub fn build(self) -> Function {
        Function(Rc::new(FunctionData {
            name: self.name,
            source: self.source,
            prototype: self.prototype,
            props: RefCell::new(Properties::default()),
            body: self.body,
        }))
    }
}

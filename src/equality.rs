use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    rc::Rc,
};

use crate::{Function, Object, Value};


/// Key that is never compared: refs are identity-only plumbing.
const REF_KEY: &str = "ref";

type IgnoreKeyFn = Rc<dyn Fn(&str, &Value, &Value) -> bool>;
type IgnoreObjectFn = Rc<dyn Fn(&Value) -> bool>;

/// Bailout controls for [`deep_equal_iterative`].
///
/// Once a threshold is exceeded the comparison falls back to reference identity,
/// so two structurally identical but distinct objects compare unequal.
#[derive(Clone, Default)]
pub struct EqualityConfig {
    key_threshold: Option<usize>,
    depth_threshold: Option<usize>,
    should_ignore_key: Option<IgnoreKeyFn>,
    should_ignore_object: Option<IgnoreObjectFn>,
}

impl EqualityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of own keys per object pair.
    pub fn key_threshold(mut self, n: usize) -> Self {
        self.key_threshold = Some(n);
        self
    }

    /// Maximum nesting depth below the root pair.
    pub fn depth_threshold(mut self, n: usize) -> Self {
        self.depth_threshold = Some(n);
        self
    }

    /// Excludes keys for which `f(key, a, b)` returns `true`. `a` and `b` are the objects owning the key.
    pub fn ignore_key(mut self, f: impl Fn(&str, &Value, &Value) -> bool + 'static) -> Self {
        self.should_ignore_key = Some(Rc::new(f));
        self
    }

    /// Treats the whole comparison as equal when `f` returns `true` for the left-hand root object.
    pub fn ignore_object(mut self, f: impl Fn(&Value) -> bool + 'static) -> Self {
        self.should_ignore_object = Some(Rc::new(f));
        self
    }

    fn is_ignored_key(&self, key: &str, a: &Value, b: &Value) -> bool {
        key == REF_KEY || self.should_ignore_key.as_ref().is_some_and(|f| f(key, a, b))
    }
    fn is_ignored_object(&self, a: &Value) -> bool {
        self.should_ignore_object.as_ref().is_some_and(|f| f(a))
    }
    fn exceeds_keys(&self, len: usize) -> bool {
        self.key_threshold.is_some_and(|n| len > n)
    }
    fn exceeds_depth(&self, depth: usize) -> bool {
        self.depth_threshold.is_some_and(|n| depth > n)
    }
}

impl fmt::Debug for EqualityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EqualityConfig")
            .field("key_threshold", &self.key_threshold)
            .field("depth_threshold", &self.depth_threshold)
            .field("should_ignore_key", &self.should_ignore_key.is_some())
            .field("should_ignore_object", &self.should_ignore_object.is_some())
            .finish()
    }
}

/// [`deep_equal_iterative`] with the default configuration.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    deep_equal_iterative(a, b, &EqualityConfig::default())
}

/// Decides whether `a` and `b` are the same for change-detection purposes.
///
/// Objects are walked with an explicit stack, so arbitrarily deep inputs do not grow the call stack.
/// Cycles are handled by remembering which right-hand object every visited left-hand object was paired with;
/// the pairing is checked in both directions so the result does not depend on argument order.
///
/// Own keys are compared by lookup, so key order does not matter. The key `"ref"` is never compared.
/// Any two host nodes with the same tag are equal.
///
/// Panics raised by the callbacks in `config` propagate to the caller.
pub fn deep_equal_iterative(a: &Value, b: &Value, config: &EqualityConfig) -> bool {
    if !a.is_object_like() && !b.is_object_like() {
        return a.strict_eq(b);
    }
    if a.strict_eq(b) {
        return true;
    }
    if !same_constructor(a, b) {
        return false;
    }
    if is_node_pair(a, b) {
        return true;
    }
    if !matches!(a, Value::Function(_)) && config.is_ignored_object(a) {
        return true;
    }
    Walk::new(config).run(a.clone(), b.clone())
}

fn same_constructor(a: &Value, b: &Value) -> bool {
    if !a.is_object_like() || !b.is_object_like() {
        return false;
    }
    a.constructor() == b.constructor()
}
fn is_node_pair(a: &Value, b: &Value) -> bool {
    matches!((a, b), (Value::Node(_), Value::Node(_)))
}

struct Frame {
    a: Value,
    b: Value,
    depth: usize,
}

/// Explicit-stack traversal shared by objects and functions.
///
/// `seen` maps each visited left-hand object or function to its right-hand partner, `seen_rev` the other way.
struct Walk<'c> {
    config: &'c EqualityConfig,
    stack: Vec<Frame>,
    seen: HashMap<usize, Value>,
    seen_rev: HashMap<usize, Value>,
}

impl<'c> Walk<'c> {
    fn new(config: &'c EqualityConfig) -> Self {
        Self {
            config,
            stack: Vec::new(),
            seen: HashMap::new(),
            seen_rev: HashMap::new(),
        }
    }

    fn run(mut self, a: Value, b: Value) -> bool {
        self.stack.push(Frame { a, b, depth: 0 });
        while let Some(frame) = self.stack.pop() {
            if !self.step(frame) {
                return false;
            }
        }
        true
    }

    fn step(&mut self, Frame { a, b, depth }: Frame) -> bool {
        if a.strict_eq(&b) {
            return true;
        }
        if !same_constructor(&a, &b) {
            return false;
        }
        match (&a, &b) {
            (Value::Node(_), Value::Node(_)) => true,
            (Value::Function(fa), Value::Function(fb)) => self.step_function(fa, fb, &a, &b, depth),
            (Value::Object(oa), Value::Object(ob)) => self.step_object(oa, ob, &a, &b, depth),
            _ => false,
        }
    }

    /// Records that `a` (id `id_a`) is paired with `b` (id `id_b`).
    ///
    /// Returns `None` for a new pair, `Some(true)` when exactly this pair was seen before,
    /// and `Some(false)` when either side was already paired with something else.
    fn pair(&mut self, id_a: usize, id_b: usize, a: &Value, b: &Value) -> Option<bool> {
        match (self.seen.get(&id_a), self.seen_rev.get(&id_b)) {
            (None, None) => {
                self.seen.insert(id_a, b.clone());
                self.seen_rev.insert(id_b, a.clone());
                None
            }
            (Some(paired_b), Some(paired_a)) => Some(paired_b.strict_eq(b) && paired_a.strict_eq(a)),
            _ => Some(false),
        }
    }

    /// Functions are compared stage by stage: name (when both are named), source text,
    /// then the prototype and the own property values, which are pushed as frames.
    fn step_function(&mut self, fa: &Function, fb: &Function, a: &Value, b: &Value, depth: usize) -> bool {
        if let (Some(name_a), Some(name_b)) = (fa.name(), fb.name()) {
            if name_a != name_b {
                return false;
            }
        }
        if fa.source() != fb.source() {
            return false;
        }
        if let Some(matched) = self.pair(fa.id(), fb.id(), a, b) {
            return matched;
        }
        let keys = fa.own_property_keys();
        if keys != fb.own_property_keys() {
            return false;
        }
        let mut frames = Vec::with_capacity(keys.len() + 1);
        frames.push(Frame {
            a: fa.prototype(),
            b: fb.prototype(),
            depth: depth + 1,
        });
        for key in &keys {
            frames.push(Frame {
                a: fa.get(key).unwrap_or_default(),
                b: fb.get(key).unwrap_or_default(),
                depth: depth + 1,
            });
        }
        self.stack.extend(frames.into_iter().rev());
        true
    }

    fn step_object(&mut self, oa: &Object, ob: &Object, a: &Value, b: &Value, depth: usize) -> bool {
        if let Some(matched) = self.pair(oa.id(), ob.id(), a, b) {
            return matched;
        }
        let keys_a = self.compared_keys(oa, a, b);
        let keys_b = self.compared_keys(ob, a, b);
        if self.config.exceeds_keys(keys_a.len()) || self.config.exceeds_keys(keys_b.len()) {
            return false;
        }
        if self.config.exceeds_depth(depth) {
            return false;
        }
        if keys_a.len() != keys_b.len() {
            return false;
        }
        let mut frames = Vec::with_capacity(keys_a.len());
        for key in &keys_a {
            let Some(vb) = ob.get(key) else {
                return false;
            };
            frames.push(Frame {
                a: oa.get(key).unwrap_or_default(),
                b: vb,
                depth: depth + 1,
            });
        }
        self.stack.extend(frames.into_iter().rev());
        true
    }

    fn compared_keys(&self, o: &Object, a: &Value, b: &Value) -> Vec<Rc<str>> {
        o.keys()
            .into_iter()
            .filter(|key| !self.config.is_ignored_key(key, a, b))
            .collect()
    }
}

/// Structural equality used by the runtime to gate state and context updates.
///
/// Primitive Rust types compare with `==` (so `NaN` is never equal to itself), containers element-wise,
/// and [`Value`] through [`deep_equal`].
pub trait DeepEq {
    fn deep_eq(&self, other: &Self) -> bool;
}

macro_rules! impl_deep_eq_by_partial_eq {
    ($($t:ty),*) => {
        $(
            impl DeepEq for $t {
                fn deep_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}
impl_deep_eq_by_partial_eq!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    str,
    String
);

impl DeepEq for Value {
    fn deep_eq(&self, other: &Self) -> bool {
        deep_equal(self, other)
    }
}
impl<T: DeepEq + ?Sized> DeepEq for &T {
    fn deep_eq(&self, other: &Self) -> bool {
        T::deep_eq(self, other)
    }
}
impl<T: DeepEq + ?Sized> DeepEq for Box<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        T::deep_eq(self, other)
    }
}
impl<T: DeepEq + ?Sized> DeepEq for Rc<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other) || T::deep_eq(self, other)
    }
}
impl<T: DeepEq> DeepEq for Option<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.deep_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}
impl<T: DeepEq> DeepEq for [T] {
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.deep_eq(b))
    }
}
impl<T: DeepEq> DeepEq for Vec<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        self[..].deep_eq(&other[..])
    }
}
impl<K: Ord, V: DeepEq> DeepEq for BTreeMap<K, V> {
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| v.deep_eq(o)))
    }
}

macro_rules! impl_deep_eq_for_tuple {
    ($($n:tt $t:ident),*) => {
        impl<$($t: DeepEq),*> DeepEq for ($($t,)*) {
            fn deep_eq(&self, other: &Self) -> bool {
                true $(&& self.$n.deep_eq(&other.$n))*
            }
        }
    };
}
impl_deep_eq_for_tuple!(0 T0);
impl_deep_eq_for_tuple!(0 T0, 1 T1);
impl_deep_eq_for_tuple!(0 T0, 1 T1, 2 T2);
impl_deep_eq_for_tuple!(0 T0, 1 T1, 2 T2, 3 T3);

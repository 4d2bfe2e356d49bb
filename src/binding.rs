//! Value bindings - how a compiled Op reads live data.
//!
//! A [`Binding`] is resolved every frame. It is one of:
//!
//! - `Literal` - a value fixed at compile time.
//! - `Signal` / `Getter` - a stable reference to live data. Resolves to the
//!   current value no matter where in the tree it is read.
//! - `Field` - a typed accessor into "the current element" of an enclosing
//!   iteration. One compiled iteration body is replayed against every element;
//!   the accessor is handed whichever element is current.
//!
//! # Scopes
//!
//! Element-relative reads need to know the current element. Traversals carry a
//! [`Scope`]: a stack of `(element, index)` frames, one per enclosing
//! iteration. Frames borrow the element for exactly as long as the traversal
//! of that element runs, so an element can never be moved or dropped while a
//! binding reads it.
//!
//! # Placeholders
//!
//! The compiler calls an iteration's render function once with an [`Item`]
//! placeholder. Bindings derived from it (`item.field(..)`, `item.index()`,
//! `item.items(..)`) carry the placeholder's iteration level and element type,
//! which the compiler validates against the enclosing iterations.

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;
use std::rc::Rc;

use spark_signals::Signal;

// =============================================================================
// Scope
// =============================================================================

/// Traversal context: the chain of elements currently being iterated.
///
/// Level 0 is the root (no element). Entering an iteration element pushes a
/// frame at `depth + 1`.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    frame: Option<(&'a (dyn Any + 'static), usize)>,
    depth: usize,
    parent: Option<&'a Scope<'a>>,
}

impl Scope<'static> {
    /// The root scope: no enclosing iteration.
    pub const fn root() -> Self {
        Scope {
            frame: None,
            depth: 0,
            parent: None,
        }
    }
}

impl<'a> Scope<'a> {
    /// Number of enclosing iterations.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Push an element frame.
    pub fn enter<'b>(&'b self, element: &'b (dyn Any + 'static), index: usize) -> Scope<'b> {
        Scope {
            frame: Some((element, index)),
            depth: self.depth + 1,
            parent: Some(self),
        }
    }

    /// The element and its index at iteration `level` (1-based).
    pub fn frame(&self, level: usize) -> Option<(&'a (dyn Any + 'static), usize)> {
        if level == 0 || level > self.depth {
            return None;
        }
        let mut scope = self;
        while scope.depth > level {
            scope = scope.parent?;
        }
        scope.frame
    }
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("depth", &self.depth)
            .field("index", &self.frame.map(|(_, index)| index))
            .finish()
    }
}

// =============================================================================
// Requirement - what a binding needs from its scope
// =============================================================================

/// The element a `Field` binding expects to find in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub level: usize,
    pub element: TypeId,
    pub element_name: &'static str,
}

impl Requirement {
    fn of<E: 'static>(level: usize) -> Self {
        Self {
            level,
            element: TypeId::of::<E>(),
            element_name: type_name::<E>(),
        }
    }
}

/// Type-erased reader over one element.
pub(crate) type ElementReader<T> = Rc<dyn Fn(&(dyn Any + 'static)) -> Option<T>>;

/// Erase `read` into an [`ElementReader`] that downcasts to `E` first.
pub(crate) fn element_reader<E, T, F>(read: F) -> ElementReader<T>
where
    E: 'static,
    F: Fn(&E) -> T + 'static,
{
    Rc::new(move |element: &(dyn Any + 'static)| element.downcast_ref::<E>().map(&read))
}

type FieldRead<T> = Rc<dyn Fn(&(dyn Any + 'static), usize) -> Option<T>>;
type SliceRead<C> = Rc<dyn for<'x> Fn(&'x (dyn Any + 'static)) -> Option<&'x [C]>>;

fn field_read<T, F>(read: F) -> FieldRead<T>
where
    F: Fn(&(dyn Any + 'static), usize) -> Option<T> + 'static,
{
    Rc::new(read)
}

fn slice_read<C, F>(read: F) -> SliceRead<C>
where
    F: for<'x> Fn(&'x (dyn Any + 'static)) -> Option<&'x [C]> + 'static,
{
    Rc::new(read)
}

// =============================================================================
// Field
// =============================================================================

/// A typed accessor into the element at a given iteration level.
pub struct Field<T> {
    requirement: Requirement,
    read: FieldRead<T>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            requirement: self.requirement,
            read: Rc::clone(&self.read),
        }
    }
}

impl<T> Field<T> {
    /// Iteration level this accessor reads from.
    pub fn level(&self) -> usize {
        self.requirement.level
    }

    /// Name of the element type this accessor reads.
    pub fn element_name(&self) -> &'static str {
        self.requirement.element_name
    }

    fn read(&self, scope: &Scope<'_>) -> Option<T> {
        let (element, index) = scope.frame(self.requirement.level)?;
        (self.read)(element, index)
    }
}

// =============================================================================
// Binding
// =============================================================================

/// Which class of reference a binding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Fixed at compile time.
    Literal,
    /// Live value independent of context (signal or getter).
    Address,
    /// Relative to the current iteration element.
    Element,
}

/// A reference to a value, resolved on every read.
#[derive(Clone)]
pub enum Binding<T: Clone + PartialEq + 'static> {
    Literal(T),
    Signal(Signal<T>),
    Getter(Rc<dyn Fn() -> T>),
    Field(Field<T>),
}

impl<T: Clone + PartialEq + 'static> Binding<T> {
    /// Bind to a closure called on every read.
    pub fn getter(read: impl Fn() -> T + 'static) -> Self {
        Binding::Getter(Rc::new(read))
    }

    pub fn kind(&self) -> BindingKind {
        match self {
            Binding::Literal(_) => BindingKind::Literal,
            Binding::Signal(_) | Binding::Getter(_) => BindingKind::Address,
            Binding::Field(_) => BindingKind::Element,
        }
    }

    pub(crate) fn requirement(&self) -> Option<Requirement> {
        match self {
            Binding::Field(field) => Some(field.requirement),
            _ => None,
        }
    }

    /// Resolve the current value. `None` only when a `Field` finds no element
    /// of its type at its level.
    pub fn try_read(&self, scope: &Scope<'_>) -> Option<T> {
        match self {
            Binding::Literal(value) => Some(value.clone()),
            Binding::Signal(signal) => Some(signal.get()),
            Binding::Getter(read) => Some(read()),
            Binding::Field(field) => field.read(scope),
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Binding<T> {
    /// Resolve the current value, falling back to `T::default()` when a field
    /// binding is read outside its element scope.
    #[inline]
    pub fn read(&self, scope: &Scope<'_>) -> T {
        self.try_read(scope).unwrap_or_default()
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Binding<T> {
    fn default() -> Self {
        Binding::Literal(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for Binding<T> {
    fn from(value: T) -> Self {
        Binding::Literal(value)
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for Binding<T> {
    fn from(signal: Signal<T>) -> Self {
        Binding::Signal(signal)
    }
}

impl From<&str> for Binding<String> {
    fn from(value: &str) -> Self {
        Binding::Literal(value.to_string())
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Binding::Signal(_) => f.write_str("Signal(..)"),
            Binding::Getter(_) => f.write_str("Getter(..)"),
            Binding::Field(field) => f
                .debug_struct("Field")
                .field("level", &field.level())
                .field("element", &field.element_name())
                .finish(),
        }
    }
}

// =============================================================================
// Item - the placeholder element handed to render functions
// =============================================================================

/// Placeholder for "the current element" of an iteration.
///
/// Only ever constructed by the compiler. Everything read through it becomes
/// an element-relative binding.
pub struct Item<E> {
    level: usize,
    _marker: PhantomData<fn(&E)>,
}

impl<E> Clone for Item<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Item<E> {}

impl<E> fmt::Debug for Item<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("level", &self.level)
            .field("element", &type_name::<E>())
            .finish()
    }
}

impl<E: 'static> Item<E> {
    pub(crate) fn new(level: usize) -> Self {
        Self {
            level,
            _marker: PhantomData,
        }
    }

    /// Iteration level (1 = outermost iteration).
    pub fn level(&self) -> usize {
        self.level
    }

    /// Bind to a value read from the current element.
    pub fn field<T, F>(&self, read: F) -> Binding<T>
    where
        T: Clone + PartialEq + 'static,
        F: Fn(&E) -> T + 'static,
    {
        Binding::Field(Field {
            requirement: Requirement::of::<E>(self.level),
            read: field_read(move |element, _| element.downcast_ref::<E>().map(&read)),
        })
    }

    /// Bind to the current element's position in its sequence.
    pub fn index(&self) -> Binding<usize> {
        Binding::Field(Field {
            requirement: Requirement::of::<E>(self.level),
            read: field_read(|element, index| element.downcast_ref::<E>().map(|_| index)),
        })
    }

    /// A nested sequence owned by the current element.
    pub fn items<C, F>(&self, read: F) -> Sequence<C>
    where
        C: 'static,
        F: for<'x> Fn(&'x E) -> &'x [C] + 'static,
    {
        Sequence::Field {
            requirement: Requirement::of::<E>(self.level),
            read: slice_read(move |element| element.downcast_ref::<E>().map(|e| read(e))),
        }
    }
}

// =============================================================================
// Sequence - the backing store of an iteration, list or table
// =============================================================================

/// Where an iteration's elements live.
pub enum Sequence<E: 'static> {
    /// A shared vector the application mutates between frames.
    Shared(Rc<RefCell<Vec<E>>>),
    /// A slice owned by an element of an enclosing iteration.
    Field {
        requirement: Requirement,
        read: SliceRead<E>,
    },
}

impl<E: 'static> Sequence<E> {
    /// Share `items` with the template.
    pub fn new(items: Rc<RefCell<Vec<E>>>) -> Self {
        Sequence::Shared(items)
    }
}

impl<E: 'static> Clone for Sequence<E> {
    fn clone(&self) -> Self {
        match self {
            Sequence::Shared(items) => Sequence::Shared(Rc::clone(items)),
            Sequence::Field { requirement, read } => Sequence::Field {
                requirement: *requirement,
                read: Rc::clone(read),
            },
        }
    }
}

impl<E: 'static> From<Rc<RefCell<Vec<E>>>> for Sequence<E> {
    fn from(items: Rc<RefCell<Vec<E>>>) -> Self {
        Sequence::Shared(items)
    }
}

impl<E: 'static> fmt::Debug for Sequence<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sequence::Shared(items) => f
                .debug_struct("Shared")
                .field("element", &type_name::<E>())
                .field("len", &items.try_borrow().map(|v| v.len()).ok())
                .finish(),
            Sequence::Field { requirement, .. } => f
                .debug_struct("Field")
                .field("element", &type_name::<E>())
                .field("level", &requirement.level)
                .finish(),
        }
    }
}

/// Type-erased view of a [`Sequence`], stored in compiled Ops.
pub(crate) trait ElementSource {
    /// Type of the elements yielded.
    fn element(&self) -> (TypeId, &'static str);

    /// For nested sequences: the enclosing element they are read from.
    fn requirement(&self) -> Option<Requirement>;

    fn len(&self, scope: &Scope<'_>) -> usize;

    /// Call `f` for each element whose index falls in `range` (clamped).
    fn visit(
        &self,
        scope: &Scope<'_>,
        range: Range<usize>,
        f: &mut dyn FnMut(usize, &(dyn Any + 'static)),
    );
}

fn clamp_range(range: Range<usize>, len: usize) -> Range<usize> {
    let end = range.end.min(len);
    range.start.min(end)..end
}

impl<E: 'static> ElementSource for Sequence<E> {
    fn element(&self) -> (TypeId, &'static str) {
        (TypeId::of::<E>(), type_name::<E>())
    }

    fn requirement(&self) -> Option<Requirement> {
        match self {
            Sequence::Shared(_) => None,
            Sequence::Field { requirement, .. } => Some(*requirement),
        }
    }

    fn len(&self, scope: &Scope<'_>) -> usize {
        match self {
            Sequence::Shared(items) => items.borrow().len(),
            Sequence::Field { requirement, read } => scope
                .frame(requirement.level)
                .and_then(|(element, _)| read(element))
                .map_or(0, <[E]>::len),
        }
    }

    fn visit(
        &self,
        scope: &Scope<'_>,
        range: Range<usize>,
        f: &mut dyn FnMut(usize, &(dyn Any + 'static)),
    ) {
        match self {
            Sequence::Shared(items) => {
                let items = items.borrow();
                for index in clamp_range(range, items.len()) {
                    f(index, &items[index]);
                }
            }
            Sequence::Field { requirement, read } => {
                let Some(items) = scope
                    .frame(requirement.level)
                    .and_then(|(element, _)| read(element))
                else {
                    return;
                };
                for index in clamp_range(range, items.len()) {
                    f(index, &items[index]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_signals::signal;

    #[derive(Debug, Clone, PartialEq)]
    struct Task {
        name: String,
        done: bool,
        subtasks: Vec<String>,
    }

    fn task(name: &str) -> Task {
        Task {
            name: name.to_string(),
            done: false,
            subtasks: vec![format!("{name}.a"), format!("{name}.b")],
        }
    }

    #[test]
    fn test_literal_and_address_bindings() {
        let scope = Scope::root();

        let literal: Binding<u32> = 7.into();
        assert_eq!(literal.read(&scope), 7);
        assert_eq!(literal.kind(), BindingKind::Literal);

        let count = signal(1u32);
        let live: Binding<u32> = count.clone().into();
        assert_eq!(live.read(&scope), 1);
        count.set(2);
        assert_eq!(live.read(&scope), 2);
        assert_eq!(live.kind(), BindingKind::Address);

        let getter = Binding::getter(|| "hello".to_string());
        assert_eq!(getter.read(&scope), "hello");
    }

    #[test]
    fn test_field_reads_current_element() {
        let item: Item<Task> = Item::new(1);
        let name = item.field(|t| t.name.clone());
        let index = item.index();
        assert_eq!(name.kind(), BindingKind::Element);

        let a = task("a");
        let b = task("b");
        let root = Scope::root();

        let scope_a = root.enter(&a, 0);
        assert_eq!(name.read(&scope_a), "a");
        assert_eq!(index.read(&scope_a), 0);

        let scope_b = root.enter(&b, 1);
        assert_eq!(name.read(&scope_b), "b");
        assert_eq!(index.read(&scope_b), 1);
    }

    #[test]
    fn test_field_outside_scope_reads_default() {
        let item: Item<Task> = Item::new(1);
        let done = item.field(|t| t.done);
        assert_eq!(done.try_read(&Scope::root()), None);
        assert!(!done.read(&Scope::root()));
    }

    #[test]
    fn test_field_of_wrong_type_reads_nothing() {
        let item: Item<Task> = Item::new(1);
        let name = item.field(|t| t.name.clone());
        let not_a_task = 42u8;
        let root = Scope::root();
        let scope = root.enter(&not_a_task, 0);
        assert_eq!(name.try_read(&scope), None);
    }

    #[test]
    fn test_nested_scope_resolves_outer_level() {
        let outer: Item<Task> = Item::new(1);
        let inner: Item<String> = Item::new(2);
        let parent_name = outer.field(|t| t.name.clone());
        let sub = inner.field(|s: &String| s.clone());

        let t = task("x");
        let s = "x.b".to_string();
        let root = Scope::root();
        let level1 = root.enter(&t, 3);
        let level2 = level1.enter(&s, 1);

        assert_eq!(level2.depth(), 2);
        assert_eq!(parent_name.read(&level2), "x");
        assert_eq!(sub.read(&level2), "x.b");
        assert_eq!(level2.frame(1).map(|(_, i)| i), Some(3));
        assert!(level2.frame(3).is_none());
    }

    #[test]
    fn test_shared_sequence_visit_clamps() {
        let items = Rc::new(RefCell::new(vec![task("a"), task("b"), task("c")]));
        let seq = Sequence::new(items.clone());
        let scope = Scope::root();
        assert_eq!(seq.len(&scope), 3);

        let mut seen = Vec::new();
        seq.visit(&scope, 1..10, &mut |i, e| {
            seen.push((i, e.downcast_ref::<Task>().map(|t| t.name.clone())));
        });
        assert_eq!(
            seen,
            vec![(1, Some("b".to_string())), (2, Some("c".to_string()))]
        );

        items.borrow_mut().clear();
        assert_eq!(seq.len(&scope), 0);
    }

    #[test]
    fn test_nested_sequence_reads_from_element() {
        let item: Item<Task> = Item::new(1);
        let subtasks = item.items(|t| t.subtasks.as_slice());

        let t = task("p");
        let root = Scope::root();
        assert_eq!(subtasks.len(&root), 0);

        let scope = root.enter(&t, 0);
        assert_eq!(subtasks.len(&scope), 2);

        let mut seen = Vec::new();
        subtasks.visit(&scope, 0..2, &mut |_, e| {
            seen.push(e.downcast_ref::<String>().cloned());
        });
        assert_eq!(seen, vec![Some("p.a".to_string()), Some("p.b".to_string())]);
    }
}

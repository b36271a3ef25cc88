use crate::{Record, Value};
use std::{fmt::Debug, rc::Rc};

/// Implementors of this trait derive a partial props [Record] from
/// the current store and the component's own props (minus its
/// children).
///
/// Implemented for every `FnMut(&Record, &Record) -> Record`. Taking
/// `&mut self` allows per-instance caches, see [Projection::factory()].
pub trait Project {
    fn project(&mut self, store: &Record, own_props: &Record) -> Record;
}

impl<F> Project for F
where
    F: FnMut(&Record, &Record) -> Record,
{
    fn project(&mut self, store: &Record, own_props: &Record) -> Record {
        self(store, own_props)
    }
}

#[derive(Clone)]
enum ProjectionKind {
    AlwaysUpdate,
    NeverUpdate,
    Stateless(Rc<dyn Fn(&Record, &Record) -> Record>),
    Factory(Rc<dyn Fn() -> Box<dyn Project>>),
}

/// How a [Connect](crate::Connect)ed component derives its props from
/// the store.
#[derive(Clone)]
pub struct Projection(ProjectionKind);

impl Projection {
    /// Pass the component's own props through unchanged.
    pub fn always_update() -> Self {
        Projection(ProjectionKind::AlwaysUpdate)
    }

    /// Derive nothing from the store: the component only receives the
    /// dispatcher.
    pub fn never_update() -> Self {
        Projection(ProjectionKind::NeverUpdate)
    }

    /// A projection shared by every mounted instance.
    pub fn stateless<F>(projection: F) -> Self
    where
        F: Fn(&Record, &Record) -> Record + 'static,
    {
        Projection(ProjectionKind::Stateless(Rc::new(projection)))
    }

    /// `factory` is invoked once for every mounted instance, and the
    /// [Project] it returns is used by that instance only.
    pub fn factory<F, P>(factory: F) -> Self
    where
        F: Fn() -> P + 'static,
        P: Project + 'static,
    {
        Projection(ProjectionKind::Factory(Rc::new(move || {
            Box::new(factory()) as Box<dyn Project>
        })))
    }

    /// Produce the projection used by a single mounted instance.
    pub(crate) fn instantiate(&self) -> Box<dyn Project> {
        match &self.0 {
            ProjectionKind::AlwaysUpdate => {
                Box::new(|_: &Record, own_props: &Record| own_props.clone())
            }
            ProjectionKind::NeverUpdate => Box::new(|_: &Record, _: &Record| Record::new()),
            ProjectionKind::Stateless(projection) => {
                let projection = projection.clone();
                Box::new(move |store: &Record, own_props: &Record| projection(store, own_props))
            }
            ProjectionKind::Factory(factory) => factory(),
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Projection::never_update()
    }
}

impl Debug for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            ProjectionKind::AlwaysUpdate => write!(f, "Projection::AlwaysUpdate"),
            ProjectionKind::NeverUpdate => write!(f, "Projection::NeverUpdate"),
            ProjectionKind::Stateless(projection) => write!(
                f,
                "Projection::Stateless(function @ {:p})",
                Rc::as_ptr(projection) as *const ()
            ),
            ProjectionKind::Factory(factory) => write!(
                f,
                "Projection::Factory(function @ {:p})",
                Rc::as_ptr(factory) as *const ()
            ),
        }
    }
}

/// A [Project] which only re-runs `projection` when one of the store
/// values under `keys` changed identity, otherwise it returns the
/// previous result. Own props are not tracked.
///
/// Meant to be created per instance with [Projection::factory()].
pub struct Memoized<F> {
    keys: Vec<String>,
    inputs: Option<Vec<Option<Value>>>,
    output: Record,
    projection: F,
}

pub fn memoized<F, I, K>(keys: I, projection: F) -> Memoized<F>
where
    F: FnMut(&Record, &Record) -> Record,
    I: IntoIterator<Item = K>,
    K: Into<String>,
{
    Memoized {
        keys: keys.into_iter().map(Into::into).collect(),
        inputs: None,
        output: Record::new(),
        projection,
    }
}

fn same_inputs(a: &[Option<Value>], b: &[Option<Value>]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|pair| match pair {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        })
}

impl<F> Project for Memoized<F>
where
    F: FnMut(&Record, &Record) -> Record,
{
    fn project(&mut self, store: &Record, own_props: &Record) -> Record {
        let inputs: Vec<Option<Value>> = self.keys.iter().map(|key| store.get(key).cloned()).collect();

        match &self.inputs {
            Some(prev) if same_inputs(prev, &inputs) => {}
            _ => {
                self.output = (self.projection)(store, own_props);
                self.inputs = Some(inputs);
            }
        }

        self.output.clone()
    }
}

use crate::{Dispatcher, Record};

/// A view unit of the host framework which can be wrapped by a
/// [Provider](crate::Provider) or a [Connect](crate::Connect).
///
/// Implemented for every `Fn(&Record, &Dispatcher) -> Output`.
pub trait Component {
    type Output;

    fn render(&self, props: &Record, dispatch: &Dispatcher) -> Self::Output;

    /// Used for the display names of wrapped components. Defaults to
    /// the type's name without its path and generic arguments.
    fn name(&self) -> &str {
        let name = std::any::type_name::<Self>();
        let name = name.split('<').next().unwrap_or(name);
        name.rsplit("::").next().unwrap_or(name)
    }
}

impl<F, O> Component for F
where
    F: Fn(&Record, &Dispatcher) -> O,
{
    type Output = O;

    fn render(&self, props: &Record, dispatch: &Dispatcher) -> O {
        self(props, dispatch)
    }
}

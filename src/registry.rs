use crate::command::CommandFactory;

/// Factory allows creating instances of a built-in command type.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Ordered mapping from built-in names to the factories that build them.
///
/// Lookups compare names exactly and the first match wins. The registry is
/// built once and never mutated afterwards.
pub struct Registry {
    entries: Vec<Box<dyn CommandFactory>>,
    names: Vec<&'static str>,
}

impl Registry {
    pub fn new(entries: Vec<Box<dyn CommandFactory>>) -> Self {
        let names = entries.iter().map(|f| f.name()).collect();
        Self { entries, names }
    }

    /// Find the factory registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<&dyn CommandFactory> {
        self.entries
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.as_ref())
    }

    /// Registered names, in registry order.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}

impl Default for Registry {
    /// The shell's built-ins: `cd`, `help`, `exit` and `suggest`.
    fn default() -> Self {
        use crate::builtin::{Cd, Exit, Help, Suggest};
        Self::new(vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Help>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Suggest>::default()),
        ])
    }
}

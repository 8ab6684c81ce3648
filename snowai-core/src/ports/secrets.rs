// snowai-core/src/ports/secrets.rs

// Descriptors only carry environment-variable NAMES.
// Whoever needs the value goes through this port, never through the descriptor.

pub trait SecretSource: Send + Sync {
    /// Returns the value bound to `name`, if any.
    fn lookup(&self, name: &str) -> Option<String>;

    fn is_set(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|v| !v.is_empty())
    }
}

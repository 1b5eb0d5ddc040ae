/// Settings for a [`Simulation`](super::Simulation).
///
/// ```rust,ignore
/// let sim = Simulation::with_config(Config::default().track_mutations(false).table_capacity(1024));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Record structural mutations.
    pub track_mutations: bool,

    /// Rows to reserve when a table is created.
    pub table_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            track_mutations: true,
            table_capacity: 0,
        }
    }
}

impl Config {
    /// Set whether structural mutations are recorded.
    pub fn track_mutations(mut self, enabled: bool) -> Self {
        self.track_mutations = enabled;
        self
    }

    /// Set the initial row reservation for new tables.
    pub fn table_capacity(mut self, capacity: usize) -> Self {
        self.table_capacity = capacity;
        self
    }
}

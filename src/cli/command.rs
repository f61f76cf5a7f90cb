/// Programmatic form of every CLI action. The clap front-end maps onto these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert a record given as a JSON object.
    Insert { json: String },
    Get { id: String },
    /// Search with a raw query string, e.g. `createdOn=2020-01-01&count=10`.
    Find { query: String },
    Count { query: String },
    /// Update with a JSON object that echoes the version the caller last read.
    Update { id: String, json: String },
    Delete { id: String },
}

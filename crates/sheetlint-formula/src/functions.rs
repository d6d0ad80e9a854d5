//! Known spreadsheet functions: declared arity and volatility

use ahash::AHashMap;
use once_cell::sync::Lazy;

/// Function definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Result may change without any change to its inputs
    pub volatile: bool,
}

/// Arity assumed for names missing from the table
pub const UNKNOWN_FUNCTION: FunctionDef = FunctionDef {
    name: "",
    min_args: 1,
    max_args: None,
    volatile: false,
};

/// Functions whose results depend on time or environment rather than on inputs
pub const VOLATILE_FUNCTIONS: [&str; 7] = [
    "NOW",
    "TODAY",
    "RAND",
    "RANDBETWEEN",
    "INDIRECT",
    "OFFSET",
    "CELL",
];

const fn def(name: &'static str, min_args: usize, max_args: Option<usize>) -> FunctionDef {
    FunctionDef {
        name,
        min_args,
        max_args,
        volatile: false,
    }
}

const fn volatile(name: &'static str, min_args: usize, max_args: Option<usize>) -> FunctionDef {
    FunctionDef {
        name,
        min_args,
        max_args,
        volatile: true,
    }
}

const BUILTINS: &[FunctionDef] = &[
    // Aggregates
    def("SUM", 1, None),
    def("AVERAGE", 1, None),
    def("COUNT", 1, None),
    def("MIN", 1, None),
    def("MAX", 1, None),
    // Conditional aggregates
    def("SUMIF", 2, Some(3)),
    def("COUNTIF", 2, Some(2)),
    def("SUMIFS", 3, None),
    def("COUNTIFS", 2, None),
    def("AVERAGEIFS", 3, None),
    // Logical
    def("IF", 2, Some(3)),
    def("AND", 2, None),
    def("OR", 2, None),
    def("NOT", 1, Some(1)),
    def("IFERROR", 2, Some(2)),
    def("IFNA", 2, Some(2)),
    def("ISERROR", 1, Some(1)),
    // Lookup
    def("VLOOKUP", 3, Some(4)),
    def("HLOOKUP", 3, Some(4)),
    def("INDEX", 2, Some(3)),
    def("MATCH", 2, Some(3)),
    // Text
    def("LEFT", 1, Some(2)),
    def("RIGHT", 1, Some(2)),
    def("MID", 3, Some(3)),
    // Volatile
    volatile("NOW", 0, Some(0)),
    volatile("TODAY", 0, Some(0)),
    volatile("RAND", 0, Some(0)),
    volatile("RANDBETWEEN", 2, Some(2)),
    volatile("INDIRECT", 1, Some(2)),
    volatile("OFFSET", 3, Some(5)),
    volatile("CELL", 1, Some(2)),
];

static REGISTRY: Lazy<AHashMap<&'static str, FunctionDef>> =
    Lazy::new(|| BUILTINS.iter().map(|def| (def.name, *def)).collect());

/// Look up a function by name (case-insensitive)
pub fn lookup(name: &str) -> Option<&'static FunctionDef> {
    REGISTRY.get(name.to_ascii_uppercase().as_str())
}

/// Arity bounds for a call to `name`; unknown names accept one or more arguments
pub fn arity(name: &str) -> (usize, Option<usize>) {
    let def = lookup(name).unwrap_or(&UNKNOWN_FUNCTION);
    (def.min_args, def.max_args)
}

/// Whether `name` is one of [`VOLATILE_FUNCTIONS`] (case-insensitive)
pub fn is_volatile(name: &str) -> bool {
    VOLATILE_FUNCTIONS
        .iter()
        .any(|v| v.eq_ignore_ascii_case(name))
}

pub mod expression;
pub mod writer;

pub use expression::*;
pub use writer::ScriptWriter;

/// Names the script language already defines; generated variables must avoid them.
pub const RESERVED_WORDS: &[&str] = &[
    "and", "or", "not", "if", "else", "for", "to", "by", "while", "switch", "var", "varip",
    "true", "false", "na", "import", "export", "method", "type", "series", "simple", "const",
    "int", "float", "bool", "string", "color", "line", "label", "box", "table", "array",
    "matrix", "map", "open", "high", "low", "close", "volume", "time", "hl2", "hlc3",
    "ohlc4", "hlcc4", "bar_index", "strategy", "ta", "math", "input", "plot", "plotshape",
    "hline", "request", "syminfo", "timeframe", "location", "shape", "size", "str",
];

/// Price series a data source node may select.
pub const PRICE_SERIES: &[&str] = &[
    "open", "high", "low", "close", "volume", "hl2", "hlc3", "ohlc4", "hlcc4",
];

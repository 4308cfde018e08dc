pub(crate) mod components;
pub(crate) mod config;
pub(crate) mod cycles;
pub(crate) mod dataflow;
pub(crate) mod edges;

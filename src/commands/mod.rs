mod extract;

pub use extract::{ExtractOptions, extract, render_json, render_text, resolve_root, run};

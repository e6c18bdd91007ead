//! Project-level concerns: the `Cursive.toml` manifest, output layout
//! and mangling, external tool resolution, and runtime-library
//! validation. The semantic core never touches the filesystem; this
//! crate is where the compiler meets the host.

pub mod manifest;
pub use manifest::{AssemblyKind, EmitIr, Manifest, find_project_root, parse_manifest};

pub mod outputs;
pub use outputs::{OutputLayout, check_output_hygiene, mangle_module_path, plan_outputs};

pub mod tools;
pub use tools::{missing_tool_code, resolve_tool, search_dirs};

pub mod runtime;
pub use runtime::{REQUIRED_RUNTIME_SYMBOLS, check_runtime_library, runtime_library_path};

pub mod discover;
pub use discover::discover_module_files;

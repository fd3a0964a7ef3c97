//! Filesystem and process collaborators of the detector: the order file,
//! buildpack descriptors, `bin/detect` execution and result files.

pub mod catalog;
pub mod files;
pub mod order;
pub mod process;

pub use catalog::{buildpack_dir, escape_id, DirectoryCatalog};
pub use files::{render_group, render_plan, write_group, write_plan};
pub use order::{parse_order, read_order};
pub use process::{parse_detect_plan, ProcessDetector, CODE_DETECT_FAIL, CODE_DETECT_PASS};

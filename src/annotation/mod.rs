//! Annotation of expression tables with Ensembl identifiers

mod probe;
mod reference;

pub use probe::{add_probe_id, add_probe_id_from, PROBE_ID_LEVEL};
pub use reference::{default_reference_dir, Organism, ProbeType, ReferenceTable, REFERENCE_DIR};

//! Path resolution and output naming

pub mod naming;
pub mod resolver;

pub use naming::{
    is_derived_file_name, mix_file_name, parse_mix_file_name, parse_variant_file_name,
    stem_name, variant_file_name, MixName, VariantName, MANIFEST_FILE_NAME,
};
pub use resolver::{clean_title, resolve_stem_directory, select_pitch_target};

//! Output file naming
//!
//! Mixes are named `without_<stem>.<ext>`, pitch variants
//! `<name>__<offset>.<ext>`. Both names parse back into their parts so a
//! directory listing can tell derived files from stems.

/// Prefix of every leave-one-out mix
pub const MIX_PREFIX: &str = "without_";

/// Separator between a file's base name and its semitone offset
pub const OFFSET_SEPARATOR: &str = "__";

/// Run manifest written next to the stems
pub const MANIFEST_FILE_NAME: &str = "minusone.json";

/// Parsed `without_<stem>.<ext>` name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixName {
    pub excluded: String,
    pub extension: String,
}

/// Parsed `<base>__<offset>.<ext>` name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantName {
    pub base: String,
    pub offset: i32,
    pub extension: String,
}

/// Stem name of a file: everything before the first `.`
pub fn stem_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// `without_<stem>.<ext>`
pub fn mix_file_name(stem: &str, extension: &str) -> String {
    format!("{}{}.{}", MIX_PREFIX, stem, extension)
}

/// Insert `__<offset>` before the final extension separator of `file_name`
/// and give the result `extension`
pub fn variant_file_name(file_name: &str, offset: i32, extension: &str) -> String {
    let base = match file_name.rsplit_once('.') {
        Some((base, _)) if !base.is_empty() => base,
        _ => file_name,
    };
    format!("{}{}{}.{}", base, OFFSET_SEPARATOR, offset, extension)
}

pub fn parse_mix_file_name(file_name: &str) -> Option<MixName> {
    if parse_variant_file_name(file_name).is_some() {
        return None;
    }
    let rest = file_name.strip_prefix(MIX_PREFIX)?;
    let (excluded, extension) = rest.rsplit_once('.')?;
    if excluded.is_empty() || extension.is_empty() {
        return None;
    }
    Some(MixName {
        excluded: excluded.to_string(),
        extension: extension.to_string(),
    })
}

pub fn parse_variant_file_name(file_name: &str) -> Option<VariantName> {
    let (name, extension) = file_name.rsplit_once('.')?;
    let (base, offset) = name.rsplit_once(OFFSET_SEPARATOR)?;
    if base.is_empty() || extension.is_empty() {
        return None;
    }
    let offset = offset.parse::<i32>().ok()?;
    Some(VariantName {
        base: base.to_string(),
        offset,
        extension: extension.to_string(),
    })
}

/// True for files this tool writes itself
pub fn is_derived_file_name(file_name: &str) -> bool {
    file_name == MANIFEST_FILE_NAME
        || parse_mix_file_name(file_name).is_some()
        || parse_variant_file_name(file_name).is_some()
}

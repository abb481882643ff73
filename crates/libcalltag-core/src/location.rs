use std::cmp::Ordering;

/// Member name used when a call site has no enclosing function
pub const TOP_LEVEL_MEMBER: &str = "<top-level>";

/// Name of the probe fn the generated macro plants to discover its caller
pub const MEMBER_PROBE: &str = "__calltag_probe";

/// Build the canonical location key `<fileStem>.<member>:L<line>`.
///
/// Only the file's base name without extension is kept, so keys do not
/// depend on the absolute path or on the host's path separator.
pub fn location_key(file_path: &str, member: &str, line: u32) -> String {
    format!("{}.{}:L{}", file_stem(file_path), member, line)
}

/// Base name of a path without its final extension.
///
/// Accepts both `/` and `\` separators regardless of the host platform.
/// A leading dot is part of the name, matching `Path::file_stem`.
pub fn file_stem(file_path: &str) -> &str {
    let name = file_path
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Normalize a function name as written in source: `r#type` becomes `type`
pub fn normalize_member(name: &str) -> &str {
    name.strip_prefix("r#").unwrap_or(name)
}

/// Recover the enclosing member name from the `type_name` of a probe fn.
///
/// `type_name_of_val` on a nested fn item yields its full path, e.g.
/// `app::repo::load::{{closure}}::__calltag_probe`. The probe segment and
/// compiler-generated segments (`{{closure}}`, `{{constant}}`) are skipped
/// and generic arguments trimmed; the last remaining segment is the member.
pub fn enclosing_member(type_name: &str) -> &str {
    let path = type_name
        .strip_suffix(MEMBER_PROBE)
        .map(|p| p.strip_suffix("::").unwrap_or(p))
        .unwrap_or(type_name);

    path.rsplit("::")
        .map(strip_generics)
        .map(normalize_member)
        .find(|segment| !segment.is_empty() && !segment.starts_with("{{"))
        .unwrap_or(TOP_LEVEL_MEMBER)
}

fn strip_generics(segment: &str) -> &str {
    if segment.starts_with('<') {
        // `<T as Trait>` qualifiers never name a member
        return "";
    }
    match segment.find('<') {
        Some(idx) => &segment[..idx],
        None => segment,
    }
}

/// Ordinal comparison over UTF-16 code units
pub fn ordinal_cmp(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

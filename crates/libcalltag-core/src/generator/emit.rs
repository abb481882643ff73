use crate::location::MEMBER_PROBE;
use crate::types::DispatchTable;
use crate::MARKER_NAME;

/// First line of every generated file; also how stale files are recognized
pub const GENERATED_HEADER: &str = "// @generated by calltag. Do not edit.";

/// Module wrapping the dispatch table inside the generated file
pub const GENERATED_MODULE: &str = "calltag_generated";

/// Render the generated unit for a dispatch table.
///
/// `crate_path` is how the scanned crate names the tagging library (its
/// dependency alias). The output depends only on the table contents and the
/// crate path, so an unchanged call-site set re-renders byte for byte.
///
/// The file must be `include!`d at the crate root, before any `mod` items,
/// so the macro is in textual scope everywhere and `$crate::calltag_generated`
/// resolves.
pub fn render(table: &DispatchTable, crate_path: &str) -> String {
    let mut arms = String::new();
    for entry in table.entries() {
        arms.push_str(&format!(
            "            {:?} => {:?},\n",
            entry.location, entry.tag
        ));
    }

    format!(
        r#"{header}
// Maps each `{marker}!` call site to a stable hash tag.

#[allow(unused_macros)]
macro_rules! {marker} {{
    ($query:expr) => {{
        $crate::{module}::{marker}(
            $query,
            ::core::file!(),
            {{
                fn {probe}() {{}}
                ::{rt}::enclosing_member(::core::any::type_name_of_val(&{probe}))
            }},
            ::core::line!(),
        )
    }};
}}

#[allow(dead_code, clippy::match_single_binding)]
pub(crate) mod {module} {{
    use ::{rt}::TagWith;

    pub fn {marker}<Q: TagWith>(
        query: Q,
        file_path: &str,
        member_name: &str,
        line_number: u32,
    ) -> Q {{
        let location = ::{rt}::location_key(file_path, member_name, line_number);
        let hash_tag = hash_tag_by_location(&location);
        query.tag_with(hash_tag)
    }}

    fn hash_tag_by_location(location: &str) -> &str {{
        match location {{
{arms}            _ => location,
        }}
    }}
}}
"#,
        header = GENERATED_HEADER,
        marker = MARKER_NAME,
        module = GENERATED_MODULE,
        probe = MEMBER_PROBE,
        rt = crate_path,
        arms = arms,
    )
}

// @generated by calltag. Do not edit.
// Maps each `tag_with_call_site_hash!` call site to a stable hash tag.

#[allow(unused_macros)]
macro_rules! tag_with_call_site_hash {
    ($query:expr) => {
        $crate::calltag_generated::tag_with_call_site_hash(
            $query,
            ::core::file!(),
            {
                fn __calltag_probe() {}
                ::libcalltag_core::enclosing_member(::core::any::type_name_of_val(&__calltag_probe))
            },
            ::core::line!(),
        )
    };
}

#[allow(dead_code, clippy::match_single_binding)]
pub(crate) mod calltag_generated {
    use ::libcalltag_core::TagWith;

    pub fn tag_with_call_site_hash<Q: TagWith>(
        query: Q,
        file_path: &str,
        member_name: &str,
        line_number: u32,
    ) -> Q {
        let location = ::libcalltag_core::location_key(file_path, member_name, line_number);
        let hash_tag = hash_tag_by_location(&location);
        query.tag_with(hash_tag)
    }

    fn hash_tag_by_location(location: &str) -> &str {
        match location {
            "runtime.closure_site:L28" => "#abf13a87",
            "runtime.direct_site:L14" => "#abf59fea",
            "runtime.generic_site:L41" => "#04d74c84",
            "runtime.multi_line_site:L18" => "#6b0c6315",
            "runtime.nested_site:L24" => "#a1a68ff7",
            "runtime.products:L36" => "#4b2eaa69",
            _ => location,
        }
    }
}

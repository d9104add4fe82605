use std::sync::OnceLock;

/// A set flag is any value other than empty, `0` or a spelling of `false`
fn flag(key: &str) -> bool {
    std::env::var(key).is_ok_and(|val| {
        let val = val.trim();
        !val.is_empty() && val != "0" && !val.eq_ignore_ascii_case("false")
    })
}

/// Log every compiled mapping program, pretty-printed, at debug level.
pub fn trace_programs() -> bool {
    static TRACE: OnceLock<bool> = OnceLock::new();
    *TRACE.get_or_init(|| flag("MAPFORGE_TRACE_PROGRAMS"))
}

/// Skip the compiled program cache; every request generates and lowers again.
pub fn cache_disabled() -> bool {
    static NO_CACHE: OnceLock<bool> = OnceLock::new();
    *NO_CACHE.get_or_init(|| flag("MAPFORGE_NO_CACHE"))
}

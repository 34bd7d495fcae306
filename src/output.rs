use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// `LABELREPO_QUIET=1` silences headers and hints; data is still printed
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("LABELREPO_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

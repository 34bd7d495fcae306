pub struct Icons;

impl Icons {
    pub const FOLDER: &str = "📂";
    pub const FILE: &str = "📄";
    pub const LABEL: &str = "🏷️";
    pub const PERSON: &str = "👤";
    pub const SEARCH: &str = "🔍";
    pub const STATS: &str = "📊";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
}

use regex::Regex;

/// Default maximum body size accepted for multipart forms (32 MiB).
pub const DEFAULT_MAX_BODY_SIZE: u64 = 32 << 20;

/// Default largest collection index accepted from `field[N]` notation.
pub const DEFAULT_MAX_INDEX: usize = 1000;

/// Immutable binder configuration.
///
/// Built once at startup and shared by reference with every bind call.
/// Tag names select which per-field tag each source reads; notation
/// patterns decide how nested keys such as `user.name`, `tags[0]` or
/// `meta[colour]` are recognized.
///
/// # Examples
///
/// ```
/// use request_binder::BinderConfig;
///
/// let config = BinderConfig::default()
///     .with_query_tag("q")
///     .with_max_index(100);
///
/// assert_eq!(config.query_tag(), "q");
/// assert_eq!(config.max_index(), 100);
/// assert_eq!(config.separator(), ".");
/// ```
#[derive(Debug, Clone)]
pub struct BinderConfig {
    path_tag: String,
    query_tag: String,
    header_tag: String,
    form_tag: String,
    path_pattern: Regex,
    index_pattern: Regex,
    key_pattern: Regex,
    nested_pattern: Regex,
    separator: String,
    max_body_size: u64,
    max_index: usize,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            path_tag: "param".to_string(),
            query_tag: "query".to_string(),
            header_tag: "header".to_string(),
            form_tag: "form".to_string(),
            path_pattern: builtin(r"\{([^}]+)\}"),
            index_pattern: builtin(r"\[([0-9]+)\]"),
            key_pattern: builtin(r"\[([a-zA-Z0-9\-_.]+)\]"),
            nested_pattern: builtin(r"\[([a-zA-Z0-9\-_.]+)\]"),
            separator: ".".to_string(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_index: DEFAULT_MAX_INDEX,
        }
    }
}

fn builtin(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in notation pattern compiles")
}

impl BinderConfig {
    /// Sets the tag read for path parameters.
    pub fn with_path_tag(mut self, tag: impl Into<String>) -> Self {
        self.path_tag = tag.into();
        self
    }

    /// Sets the tag read for query parameters.
    pub fn with_query_tag(mut self, tag: impl Into<String>) -> Self {
        self.query_tag = tag.into();
        self
    }

    /// Sets the tag read for headers.
    pub fn with_header_tag(mut self, tag: impl Into<String>) -> Self {
        self.header_tag = tag.into();
        self
    }

    /// Sets the tag read for form fields.
    pub fn with_form_tag(mut self, tag: impl Into<String>) -> Self {
        self.form_tag = tag.into();
        self
    }

    /// Sets the pattern extracting parameter names from a route pattern.
    ///
    /// The first capture group must hold the parameter name.
    pub fn with_path_pattern(mut self, pattern: Regex) -> Self {
        self.path_pattern = pattern;
        self
    }

    /// Sets the bracket pattern for list indices (`field[0]`).
    pub fn with_index_pattern(mut self, pattern: Regex) -> Self {
        self.index_pattern = pattern;
        self
    }

    /// Sets the bracket pattern for mapping keys (`field[key]`).
    pub fn with_key_pattern(mut self, pattern: Regex) -> Self {
        self.key_pattern = pattern;
        self
    }

    /// Sets the bracket pattern for nested record fields (`field[name]`).
    pub fn with_nested_pattern(mut self, pattern: Regex) -> Self {
        self.nested_pattern = pattern;
        self
    }

    /// Sets the deep-object separator (`.` by default).
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Sets the largest multipart body accepted, in bytes.
    pub fn with_max_body_size(mut self, max_body_size: u64) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Sets the largest collection index accepted.
    pub fn with_max_index(mut self, max_index: usize) -> Self {
        self.max_index = max_index;
        self
    }

    /// Tag read for path parameters.
    pub fn path_tag(&self) -> &str {
        &self.path_tag
    }

    /// Tag read for query parameters.
    pub fn query_tag(&self) -> &str {
        &self.query_tag
    }

    /// Tag read for headers.
    pub fn header_tag(&self) -> &str {
        &self.header_tag
    }

    /// Tag read for form fields.
    pub fn form_tag(&self) -> &str {
        &self.form_tag
    }

    /// Pattern extracting parameter names from a route pattern.
    pub fn path_pattern(&self) -> &Regex {
        &self.path_pattern
    }

    /// Bracket pattern for list indices.
    pub fn index_pattern(&self) -> &Regex {
        &self.index_pattern
    }

    /// Bracket pattern for mapping keys.
    pub fn key_pattern(&self) -> &Regex {
        &self.key_pattern
    }

    /// Bracket pattern for nested record fields.
    pub fn nested_pattern(&self) -> &Regex {
        &self.nested_pattern
    }

    /// Deep-object separator.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Largest multipart body accepted, in bytes.
    pub fn max_body_size(&self) -> u64 {
        self.max_body_size
    }

    /// Largest collection index accepted.
    pub fn max_index(&self) -> usize {
        self.max_index
    }
}

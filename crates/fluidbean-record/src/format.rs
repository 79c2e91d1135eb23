//! Column formatters.
//!
//! Formatters rewrite text input before type coercion. They run in the
//! order they were registered on the column.

/// A text-rewriting step in the setter pipeline.
#[derive(Clone)]
pub enum Formatter {
    /// Strip leading and trailing whitespace.
    Trim,
    Uppercase,
    Lowercase,
    /// Fold Latin-1 accented characters to their ASCII base letter.
    NoDiacritics,
    /// Truncate to the column's declared length instead of erroring.
    Limit,
    /// A caller-supplied formatter with a name for diagnostics.
    Custom {
        name: &'static str,
        func: fn(&str) -> String,
    },
}

impl Formatter {
    pub fn name(&self) -> &str {
        match self {
            Formatter::Trim => "trim",
            Formatter::Uppercase => "uppercase",
            Formatter::Lowercase => "lowercase",
            Formatter::NoDiacritics => "nodiacritics",
            Formatter::Limit => "limit",
            Formatter::Custom { name, .. } => name,
        }
    }

    /// Apply this formatter. `length` is the column's declared length,
    /// consumed only by `Limit`.
    pub fn apply(&self, input: &str, length: Option<usize>) -> String {
        match self {
            Formatter::Trim => input.trim().to_string(),
            Formatter::Uppercase => input.to_uppercase(),
            Formatter::Lowercase => input.to_lowercase(),
            Formatter::NoDiacritics => input.chars().map(fold_diacritic).collect(),
            Formatter::Limit => match length {
                Some(limit) => input.chars().take(limit).collect(),
                None => input.to_string(),
            },
            Formatter::Custom { func, .. } => func(input),
        }
    }
}

fn fold_diacritic(c: char) -> char {
    match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'O',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'Ç' => 'C',
        'ç' => 'c',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ÿ' => 'y',
        'Ñ' => 'N',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim() {
        assert_eq!(Formatter::Trim.apply("  hi  ", None), "hi");
    }

    #[test]
    fn test_case_folding() {
        assert_eq!(Formatter::Uppercase.apply("héllo", None), "HÉLLO");
        assert_eq!(Formatter::Lowercase.apply("HÉLLO", None), "héllo");
    }

    #[test]
    fn test_nodiacritics() {
        assert_eq!(Formatter::NoDiacritics.apply("àéîõüñÇ", None), "aeiounC");
        assert_eq!(Formatter::NoDiacritics.apply("plain", None), "plain");
    }

    #[test]
    fn test_limit() {
        assert_eq!(Formatter::Limit.apply("abcdef", Some(3)), "abc");
        assert_eq!(Formatter::Limit.apply("abcdef", None), "abcdef");
        // Counts characters, not bytes.
        assert_eq!(Formatter::Limit.apply("日本語です", Some(2)), "日本");
    }

    #[test]
    fn test_custom() {
        fn reverse(s: &str) -> String {
            s.chars().rev().collect()
        }
        let f = Formatter::Custom {
            name: "reverse",
            func: reverse,
        };
        assert_eq!(f.name(), "reverse");
        assert_eq!(f.apply("abc", None), "cba");
    }
}

use crate::db::EntryKind;

struct Rule {
    kind: EntryKind,
    /// Substrings of the lower-cased term text.
    phrases: &'static [&'static str],
    /// Suffixes of the raw `class` attribute.
    class_suffixes: &'static [&'static str],
}

// Order matters: "method in" is a substring of "static method in", so the
// descriptive phrases must be tested first.
const RULES: &[Rule] = &[
    Rule {
        kind: EntryKind::Class,
        phrases: &["class in", "- class"],
        class_suffixes: &["class"],
    },
    Rule {
        kind: EntryKind::Method,
        phrases: &["static method in"],
        class_suffixes: &["method"],
    },
    Rule {
        kind: EntryKind::Field,
        phrases: &["static variable in", "field in"],
        class_suffixes: &["field"],
    },
    Rule {
        kind: EntryKind::Constructor,
        phrases: &["constructor"],
        class_suffixes: &["constructor"],
    },
    Rule {
        kind: EntryKind::Method,
        phrases: &["method in"],
        class_suffixes: &[],
    },
    Rule {
        kind: EntryKind::Field,
        phrases: &["variable in"],
        class_suffixes: &[],
    },
    Rule {
        kind: EntryKind::Interface,
        phrases: &["interface in", "- interface"],
        class_suffixes: &["interface"],
    },
    Rule {
        kind: EntryKind::Exception,
        phrases: &["exception in", "- exception"],
        class_suffixes: &["exception"],
    },
    Rule {
        kind: EntryKind::Error,
        phrases: &["error in", "- error"],
        class_suffixes: &["error"],
    },
    Rule {
        kind: EntryKind::Enum,
        phrases: &["enum in", "- enum"],
        class_suffixes: &["enum"],
    },
    Rule {
        kind: EntryKind::Trait,
        phrases: &["trait in"],
        class_suffixes: &[],
    },
    Rule {
        kind: EntryKind::Script,
        phrases: &["script in"],
        class_suffixes: &[],
    },
    Rule {
        kind: EntryKind::Notation,
        phrases: &["annotation type"],
        class_suffixes: &["annotation"],
    },
    Rule {
        kind: EntryKind::Package,
        phrases: &["package"],
        class_suffixes: &["package"],
    },
];

impl Rule {
    fn matches(&self, text_lower: &str, class_attr: &str) -> bool {
        self.phrases.iter().any(|p| text_lower.contains(p))
            || self.class_suffixes.iter().any(|s| class_attr.ends_with(s))
    }
}

/// Kind of the symbol introduced by a definition term, from its full text and
/// its `class` attribute. `None` when no rule applies.
pub fn classify(term_text: &str, class_attr: &str) -> Option<EntryKind> {
    let lower = term_text.to_lowercase();
    RULES
        .iter()
        .find(|r| r.matches(&lower, class_attr))
        .map(|r| r.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn javadoc_index_phrases() {
        assert_eq!(classify("String - Class in java.lang", ""), Some(EntryKind::Class));
        assert_eq!(
            classify("valueOf(Object) - Static method in class java.lang.String", ""),
            Some(EntryKind::Method),
        );
        assert_eq!(
            classify("length() - Method in interface java.lang.CharSequence", ""),
            Some(EntryKind::Method),
        );
        assert_eq!(classify("Runnable - Interface in java.lang", ""), Some(EntryKind::Interface));
        assert_eq!(
            classify("IOException - Exception in java.io", ""),
            Some(EntryKind::Exception),
        );
        assert_eq!(classify("OutOfMemoryError - Error in java.lang", ""), Some(EntryKind::Error));
        assert_eq!(classify("TimeUnit - Enum in java.util.concurrent", ""), Some(EntryKind::Enum));
        assert_eq!(
            classify("Deprecated - Annotation Type in java.lang", ""),
            Some(EntryKind::Notation),
        );
        assert_eq!(classify("java.util - package java.util", ""), Some(EntryKind::Package));
        assert_eq!(classify("Ordered - Trait in scala.math", ""), Some(EntryKind::Trait));
        assert_eq!(classify("build - Script in gradle", ""), Some(EntryKind::Script));
    }

    #[test]
    fn static_method_before_generic_method() {
        assert_eq!(
            classify("max(int, int) - Static method in Math, see method in Foo", ""),
            Some(EntryKind::Method),
        );
    }

    #[test]
    fn static_variable_is_field() {
        assert_eq!(classify("MAX_VALUE - Static variable in Integer", ""), Some(EntryKind::Field));
        assert_eq!(classify("out - Field in System", ""), Some(EntryKind::Field));
        assert_eq!(classify("x - Variable in Point", ""), Some(EntryKind::Field));
    }

    #[test]
    fn constructor_beats_method_in() {
        assert_eq!(
            classify("Foo(int) - Constructor for Foo, delegates to method in Bar", ""),
            Some(EntryKind::Constructor),
        );
    }

    #[test]
    fn class_attribute_suffix() {
        assert_eq!(classify("Foo", "memberNameLink class"), Some(EntryKind::Class));
        assert_eq!(classify("foo()", "result-method"), Some(EntryKind::Method));
        assert_eq!(classify("bar", "result-field"), Some(EntryKind::Field));
        assert_eq!(classify("Foo()", "result-constructor"), Some(EntryKind::Constructor));
        assert_eq!(classify("Bar", "result-interface"), Some(EntryKind::Interface));
        assert_eq!(classify("Oops", "result-exception"), Some(EntryKind::Exception));
        assert_eq!(classify("Boom", "result-error"), Some(EntryKind::Error));
        assert_eq!(classify("Color", "result-enum"), Some(EntryKind::Enum));
        assert_eq!(classify("Nullable", "result-annotation"), Some(EntryKind::Notation));
        assert_eq!(classify("java.io", "result-package"), Some(EntryKind::Package));
    }

    #[test]
    fn class_attribute_is_case_sensitive() {
        assert_eq!(classify("Foo", "ResultClass"), None);
    }

    #[test]
    fn text_match_is_case_insensitive() {
        assert_eq!(classify("FOO - CLASS IN BAR", ""), Some(EntryKind::Class));
    }

    #[test]
    fn class_in_outranks_everything() {
        assert_eq!(
            classify("Foo(int) - Constructor for class in pkg", "x-method"),
            Some(EntryKind::Class),
        );
    }

    #[test]
    fn unclassifiable() {
        assert_eq!(classify("See Also:", ""), None);
        assert_eq!(classify("", ""), None);
    }
}

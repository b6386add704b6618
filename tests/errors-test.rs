use jsonpath_query::{JSONPathErrorType, Query};

fn error_kind(query: &str) -> JSONPathErrorType {
    Query::standard(query).expect_err("expected a compile error").kind
}

mod syntax_errors {
    use super::*;

    #[test]
    #[should_panic(expected = "expected '$'")]
    fn missing_root() {
        Query::standard("foo.bar").unwrap();
    }

    #[test]
    #[should_panic(expected = "unexpected descendant selection token")]
    fn trailing_descendant_segment() {
        Query::standard("$..").unwrap();
    }

    #[test]
    #[should_panic(expected = "unclosed bracketed selection")]
    fn unclosed_bracketed_selection() {
        Query::standard("$[1, 3").unwrap();
    }

    #[test]
    #[should_panic(expected = "unclosed bracketed selection")]
    fn unclosed_bracketed_selection_inside_filter() {
        Query::standard("$[?@.a < 1").unwrap();
    }

    #[test]
    #[should_panic(expected = "empty bracketed selection")]
    fn empty_bracketed_selection() {
        Query::standard("$[]").unwrap();
    }

    #[test]
    #[should_panic(expected = "unexpected trailing comma")]
    fn trailing_comma() {
        Query::standard("$[1,]").unwrap();
    }

    #[test]
    #[should_panic(expected = "unbalanced parentheses")]
    fn unbalanced_parens() {
        Query::standard("$[?((@.foo)]").unwrap();
    }

    #[test]
    #[should_panic(expected = "expected a filter expression")]
    fn empty_parens() {
        Query::standard("$[?()]").unwrap();
    }

    #[test]
    #[should_panic(expected = "unexpected shorthand selector")]
    fn shorthand_index() {
        Query::standard("$.1").unwrap();
    }

    #[test]
    #[should_panic(expected = "unexpected trailing whitespace")]
    fn trailing_whitespace() {
        Query::standard("$.a ").unwrap();
    }

    #[test]
    #[should_panic(expected = "invalid index")]
    fn leading_zero_index() {
        Query::standard("$[01]").unwrap();
    }

    #[test]
    #[should_panic(expected = "invalid index")]
    fn minus_zero_index() {
        Query::standard("$[-0]").unwrap();
    }

    #[test]
    #[should_panic(expected = "index out of range")]
    fn index_out_of_range() {
        Query::standard("$[9007199254740992]").unwrap();
    }

    #[test]
    #[should_panic(expected = "leading zero in number literal")]
    fn leading_zero_int_literal() {
        Query::standard("$[?@.a == 01]").unwrap();
    }

    #[test]
    #[should_panic(expected = "expected a comma or closing bracket")]
    fn missing_comma_between_selectors() {
        Query::standard("$['a' 'b']").unwrap();
    }

    #[test]
    #[should_panic(expected = "expected '=='")]
    fn single_equals() {
        Query::standard("$[?@.a = 1]").unwrap();
    }

    #[test]
    #[should_panic(expected = "invalid escape sequence")]
    fn bad_escape_in_string() {
        Query::standard(r#"$["ab\q"]"#).unwrap();
    }

    #[test]
    #[should_panic(expected = "invalid character in string literal")]
    fn raw_control_character_in_name() {
        Query::standard("$[\"a\tb\"]").unwrap();
    }
}

mod type_errors {
    use super::*;

    #[test]
    #[should_panic(expected = "non-singular query is not comparable")]
    fn non_singular_wildcard_comparison() {
        Query::standard("$.users[?@.* > 1]").unwrap();
    }

    #[test]
    #[should_panic(expected = "non-singular query is not comparable")]
    fn non_singular_descendant_comparison() {
        Query::standard("$[?@..a == 1]").unwrap();
    }

    #[test]
    #[should_panic(expected = "length() takes 1 argument but 2 were given")]
    fn too_many_arguments() {
        Query::standard("$[?length(@,@) > 0]").unwrap();
    }

    #[test]
    #[should_panic(expected = "count() takes 1 argument but 0 were given")]
    fn not_enough_arguments() {
        Query::standard("$[?count()]").unwrap();
    }

    #[test]
    #[should_panic(expected = "filter expression literals must be compared")]
    fn bare_literal_filter() {
        Query::standard("$[?true]").unwrap();
    }

    #[test]
    #[should_panic(expected = "filter expression literals must be compared")]
    fn literal_logical_operand() {
        Query::standard("$[?true && @.a]").unwrap();
    }

    #[test]
    #[should_panic(expected = "result of length() must be compared")]
    fn value_function_as_filter() {
        Query::standard("$[?length(@.a)]").unwrap();
    }

    #[test]
    #[should_panic(expected = "expression is not comparable")]
    fn comparison_of_comparison() {
        Query::standard("$[?@.a == @.b == @.c]").unwrap();
    }
}

mod error_categories {
    use super::*;

    #[test]
    fn syntax_error_kind() {
        assert_eq!(error_kind("$.."), JSONPathErrorType::SyntaxError);
        assert_eq!(error_kind("$[]"), JSONPathErrorType::SyntaxError);
    }

    #[test]
    fn type_error_kind() {
        assert_eq!(error_kind("$[?@.* > 1]"), JSONPathErrorType::TypeError);
        assert_eq!(error_kind("$[?length(@,@) > 0]"), JSONPathErrorType::TypeError);
    }

    #[test]
    fn name_error_kind() {
        assert_eq!(error_kind("$[?nosuchthing()]"), JSONPathErrorType::NameError);
    }

    #[test]
    fn errors_carry_spans() {
        let err = Query::standard("$.users[?@.* > 1]").expect_err("expected a type error");
        assert!(err.span.0 > 0);
        assert!(err.to_string().contains("type error:"));
    }

    #[test]
    fn existence_test_is_valid() {
        // An existence test is not a comparison; no singular-query rule applies.
        assert!(Query::standard("$.users[?@.score]").is_ok());
    }
}

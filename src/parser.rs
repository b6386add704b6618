//! A JSONPath parser producing validated [`Query`] syntax trees.
//!
//! Parsing is in two layers. The structural layer is a Pratt parser
//! over the lexer's token vector. Semantic validation runs as the tree
//! is built: comparison operands must be comparable (literals, singular
//! queries, or `ValueType` function results), logical operands must be
//! logical, and function arguments must match the declared signature of
//! one of the registered functions.

use std::{collections::HashMap, iter::Peekable, ops::RangeInclusive, vec::IntoIter};

use crate::{
    errors::JSONPathError,
    filter::{ComparisonOperator, FilterExpression, LogicalOperator},
    function::{standard_signatures, ExpressionType, FunctionSignature},
    lexer::lex,
    query::Query,
    segment::Segment,
    selector::Selector,
    token::{Token, TokenKind},
};

const EOQ_TOKEN: Token = Token {
    kind: TokenKind::Eoq,
    span: (0, 0),
};

type TokenStream = Peekable<IntoIter<Token>>;

const PRECEDENCE_LOWEST: u8 = 1;
const PRECEDENCE_LOGICAL_OR: u8 = 3;
const PRECEDENCE_LOGICAL_AND: u8 = 4;
const PRECEDENCE_RELATIONAL: u8 = 5;
const PRECEDENCE_LOGICAL_NOT: u8 = 7;

fn precedence(kind: &TokenKind) -> u8 {
    use TokenKind::*;
    match kind {
        Or => PRECEDENCE_LOGICAL_OR,
        And => PRECEDENCE_LOGICAL_AND,
        Eq | Ne | Lt | Le | Gt | Ge => PRECEDENCE_RELATIONAL,
        _ => PRECEDENCE_LOWEST,
    }
}

fn is_binary_operator(kind: &TokenKind) -> bool {
    use TokenKind::*;
    matches!(kind, And | Or | Eq | Ne | Lt | Le | Gt | Ge)
}

#[derive(Debug)]
pub struct Parser {
    /// The I-JSON interval for array indices and slice components.
    index_range: RangeInclusive<i64>,
    pub functions: HashMap<String, FunctionSignature>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            index_range: ((-2_i64).pow(53) + 1)..=(2_i64.pow(53) - 1),
            functions: standard_signatures(),
        }
    }

    pub fn parse(&self, query: &str) -> Result<Query, JSONPathError> {
        let tokens = lex(query)?;
        let mut it = tokens.into_iter().peekable();

        match it.next().unwrap_or(EOQ_TOKEN) {
            Token {
                kind: TokenKind::Root,
                ..
            } => {
                let segments = self.parse_segments(&mut it)?;
                match it.next() {
                    Some(Token {
                        kind: TokenKind::Eoq,
                        ..
                    })
                    | None => Ok(Query::new(segments)),
                    Some(token) => Err(JSONPathError::syntax(
                        format!("expected end of query, found {}", token.kind),
                        token.span,
                    )),
                }
            }
            token => Err(JSONPathError::syntax(
                format!("expected '$', found {}", token.kind),
                token.span,
            )),
        }
    }

    fn parse_segments(&self, it: &mut TokenStream) -> Result<Vec<Segment>, JSONPathError> {
        let mut segments: Vec<Segment> = Vec::new();

        loop {
            match &it.peek().unwrap_or(&EOQ_TOKEN).kind {
                TokenKind::DoubleDot => {
                    it.next();
                    let selectors = self.parse_selectors(it)?;
                    segments.push(Segment::Recursive { selectors });
                }
                TokenKind::LBracket | TokenKind::Name { .. } | TokenKind::Wild => {
                    let selectors = self.parse_selectors(it)?;
                    segments.push(Segment::Child { selectors });
                }
                _ => break,
            }
        }

        Ok(segments)
    }

    fn parse_selectors(&self, it: &mut TokenStream) -> Result<Vec<Selector>, JSONPathError> {
        match it.peek().unwrap_or(&EOQ_TOKEN) {
            Token {
                kind: TokenKind::Name { value },
                ..
            } => {
                // Shorthand names contain no escape sequences.
                let name = value.to_string();
                it.next();
                Ok(vec![Selector::Name { name }])
            }
            Token {
                kind: TokenKind::Wild,
                ..
            } => {
                it.next();
                Ok(vec![Selector::Wild])
            }
            Token {
                kind: TokenKind::LBracket,
                ..
            } => self.parse_bracketed(it),
            _ => Ok(Vec::new()),
        }
    }

    fn parse_bracketed(&self, it: &mut TokenStream) -> Result<Vec<Selector>, JSONPathError> {
        let open_token = match it.next() {
            Some(token) => token,
            None => return Err(JSONPathError::syntax("unexpected end of query".into(), (0, 0))),
        };

        debug_assert!(
            matches!(open_token.kind, TokenKind::LBracket),
            "expected the start of a bracketed selection"
        );

        let mut selectors: Vec<Selector> = Vec::new();
        let mut after_comma = false;

        loop {
            match it.peek().unwrap_or(&EOQ_TOKEN) {
                Token {
                    kind: TokenKind::RBracket,
                    span,
                } => {
                    if after_comma {
                        return Err(JSONPathError::syntax(
                            String::from("unexpected trailing comma"),
                            *span,
                        ));
                    }
                    it.next();
                    break;
                }
                Token {
                    kind: TokenKind::Index { .. } | TokenKind::Colon,
                    ..
                } => {
                    selectors.push(self.parse_slice_or_index(it)?);
                }
                Token {
                    kind: TokenKind::DoubleQuoteString { value },
                    span,
                } => {
                    let name = unescape_string(value, Quote::Double, *span)?;
                    it.next();
                    selectors.push(Selector::Name { name });
                }
                Token {
                    kind: TokenKind::SingleQuoteString { value },
                    span,
                } => {
                    let name = unescape_string(value, Quote::Single, *span)?;
                    it.next();
                    selectors.push(Selector::Name { name });
                }
                Token {
                    kind: TokenKind::Wild,
                    ..
                } => {
                    it.next();
                    selectors.push(Selector::Wild);
                }
                Token {
                    kind: TokenKind::Filter,
                    ..
                } => {
                    selectors.push(self.parse_filter(it)?);
                }
                Token {
                    kind: TokenKind::Eoq,
                    ..
                } => {
                    return Err(JSONPathError::syntax(
                        String::from("unexpected end of query"),
                        open_token.span,
                    ));
                }
                token => {
                    return Err(JSONPathError::syntax(
                        format!("unexpected selector token {}", token.kind),
                        token.span,
                    ));
                }
            }

            after_comma = false;

            // A comma or the closing bracket must follow each selector.
            match it.peek().unwrap_or(&EOQ_TOKEN) {
                Token {
                    kind: TokenKind::RBracket,
                    ..
                } => continue,
                Token {
                    kind: TokenKind::Comma,
                    ..
                } => {
                    it.next();
                    after_comma = true;
                }
                Token {
                    kind: TokenKind::Eoq,
                    ..
                } => {
                    return Err(JSONPathError::syntax(
                        String::from("unexpected end of query"),
                        open_token.span,
                    ));
                }
                token => {
                    return Err(JSONPathError::syntax(
                        format!("expected a comma or closing bracket, found {}", token.kind),
                        token.span,
                    ));
                }
            }
        }

        if selectors.is_empty() {
            return Err(JSONPathError::syntax(
                String::from("empty bracketed selection"),
                open_token.span,
            ));
        }

        Ok(selectors)
    }

    fn parse_slice_or_index(&self, it: &mut TokenStream) -> Result<Selector, JSONPathError> {
        let token = it.next().unwrap_or(EOQ_TOKEN);

        debug_assert!(
            matches!(token.kind, TokenKind::Colon | TokenKind::Index { .. }),
            "expected an index or slice"
        );

        if token.kind == TokenKind::Colon
            || matches!(it.peek().unwrap_or(&EOQ_TOKEN).kind, TokenKind::Colon)
        {
            // A slice selector.
            let mut start: Option<i64> = None;
            let mut stop: Option<i64> = None;
            let mut step: Option<i64> = None;

            // `1:`, or a bare `:`.
            if let Token {
                kind: TokenKind::Index { ref value },
                span,
            } = token
            {
                start = Some(self.parse_index_value(value, span)?);
                it.next(); // eat the colon
            }

            // The stop value, if any, then an optional second colon.
            if let TokenKind::Index { .. } = it.peek().unwrap_or(&EOQ_TOKEN).kind {
                if let Some(Token {
                    kind: TokenKind::Index { ref value },
                    span,
                }) = it.next()
                {
                    stop = Some(self.parse_index_value(value, span)?);
                }
                if it.peek().unwrap_or(&EOQ_TOKEN).kind == TokenKind::Colon {
                    it.next();
                }
            } else if it.peek().unwrap_or(&EOQ_TOKEN).kind == TokenKind::Colon {
                it.next();
            }

            // The step value, if any.
            if let TokenKind::Index { .. } = it.peek().unwrap_or(&EOQ_TOKEN).kind {
                if let Some(Token {
                    kind: TokenKind::Index { ref value },
                    span,
                }) = it.next()
                {
                    step = Some(self.parse_index_value(value, span)?);
                }
            }

            Ok(Selector::Slice { start, stop, step })
        } else {
            match token {
                Token {
                    kind: TokenKind::Index { ref value },
                    span,
                } => {
                    let index = self.parse_index_value(value, span)?;
                    Ok(Selector::Index { index })
                }
                token => Err(JSONPathError::syntax(
                    format!("expected an index, found {}", token.kind),
                    token.span,
                )),
            }
        }
    }

    /// Parse an array index or slice component. Leading zeros and `-0`
    /// are not allowed, and the value must be within the I-JSON range.
    fn parse_index_value(&self, value: &str, span: (usize, usize)) -> Result<i64, JSONPathError> {
        if value.len() > 1 && (value.starts_with('0') || value.starts_with("-0")) {
            return Err(JSONPathError::syntax(
                format!("invalid index '{}'", value),
                span,
            ));
        }

        let index = value
            .parse::<i64>()
            .map_err(|_| JSONPathError::syntax(String::from("index out of range"), span))?;

        if !self.index_range.contains(&index) {
            return Err(JSONPathError::syntax(
                String::from("index out of range"),
                span,
            ));
        }

        Ok(index)
    }

    fn parse_filter(&self, it: &mut TokenStream) -> Result<Selector, JSONPathError> {
        let token = it.next().unwrap_or(EOQ_TOKEN);

        debug_assert!(
            matches!(token.kind, TokenKind::Filter),
            "expected a filter selector"
        );

        let expression = self.parse_filter_expression(it, PRECEDENCE_LOWEST)?;
        self.ensure_logical(&expression, token.span)?;

        Ok(Selector::Filter {
            expression: Box::new(expression),
        })
    }

    fn parse_filter_expression(
        &self,
        it: &mut TokenStream,
        prec: u8,
    ) -> Result<FilterExpression, JSONPathError> {
        let mut left = self.parse_basic_expression(it)?;

        loop {
            let proceed = match it.peek() {
                Some(token) => {
                    is_binary_operator(&token.kind) && precedence(&token.kind) >= prec
                }
                None => false,
            };

            if !proceed {
                break;
            }

            left = self.parse_infix_expression(it, left)?;
        }

        Ok(left)
    }

    fn parse_basic_expression(
        &self,
        it: &mut TokenStream,
    ) -> Result<FilterExpression, JSONPathError> {
        match it.peek().unwrap_or(&EOQ_TOKEN) {
            Token {
                kind: TokenKind::True,
                ..
            } => {
                it.next();
                Ok(FilterExpression::True)
            }
            Token {
                kind: TokenKind::False,
                ..
            } => {
                it.next();
                Ok(FilterExpression::False)
            }
            Token {
                kind: TokenKind::Null,
                ..
            } => {
                it.next();
                Ok(FilterExpression::Null)
            }
            Token {
                kind: TokenKind::DoubleQuoteString { value },
                span,
            } => {
                let value = unescape_string(value, Quote::Double, *span)?;
                it.next();
                Ok(FilterExpression::String { value })
            }
            Token {
                kind: TokenKind::SingleQuoteString { value },
                span,
            } => {
                let value = unescape_string(value, Quote::Single, *span)?;
                it.next();
                Ok(FilterExpression::String { value })
            }
            Token {
                kind: TokenKind::Int { value },
                span,
            } => {
                let value = parse_int_literal(value, *span)?;
                it.next();
                Ok(FilterExpression::Int { value })
            }
            Token {
                kind: TokenKind::Float { value },
                span,
            } => {
                let value = parse_float_literal(value, *span)?;
                it.next();
                Ok(FilterExpression::Float { value })
            }
            Token {
                kind: TokenKind::Root,
                ..
            } => {
                it.next();
                let segments = self.parse_segments(it)?;
                Ok(FilterExpression::RootQuery {
                    query: Box::new(Query::new(segments)),
                })
            }
            Token {
                kind: TokenKind::Current,
                ..
            } => {
                it.next();
                let segments = self.parse_segments(it)?;
                Ok(FilterExpression::RelativeQuery {
                    query: Box::new(Query::new(segments)),
                })
            }
            Token {
                kind: TokenKind::Function { .. },
                ..
            } => self.parse_function_call(it),
            Token {
                kind: TokenKind::LParen,
                ..
            } => self.parse_grouped_expression(it),
            Token {
                kind: TokenKind::Not,
                ..
            } => self.parse_not_expression(it),
            Token { kind, span } => Err(JSONPathError::syntax(
                format!("expected a filter expression, found {}", kind),
                *span,
            )),
        }
    }

    fn parse_not_expression(&self, it: &mut TokenStream) -> Result<FilterExpression, JSONPathError> {
        let token = it.next().unwrap_or(EOQ_TOKEN);
        let expression = self.parse_filter_expression(it, PRECEDENCE_LOGICAL_NOT)?;
        self.ensure_logical(&expression, token.span)?;
        Ok(FilterExpression::Not {
            expression: Box::new(expression),
        })
    }

    fn parse_grouped_expression(
        &self,
        it: &mut TokenStream,
    ) -> Result<FilterExpression, JSONPathError> {
        it.next(); // eat the open paren
        let mut expression = self.parse_filter_expression(it, PRECEDENCE_LOWEST)?;

        loop {
            match it.peek().unwrap_or(&EOQ_TOKEN) {
                Token {
                    kind: TokenKind::Eoq | TokenKind::RBracket,
                    span,
                } => {
                    return Err(JSONPathError::syntax(
                        String::from("unbalanced parentheses"),
                        *span,
                    ));
                }
                Token {
                    kind: TokenKind::RParen,
                    ..
                } => break,
                _ => expression = self.parse_infix_expression(it, expression)?,
            }
        }

        it.next(); // eat the closing paren
        Ok(expression)
    }

    fn parse_infix_expression(
        &self,
        it: &mut TokenStream,
        left: FilterExpression,
    ) -> Result<FilterExpression, JSONPathError> {
        let token = it.next().unwrap_or(EOQ_TOKEN);

        match token.kind {
            TokenKind::And | TokenKind::Or => {
                let right = self.parse_filter_expression(it, precedence(&token.kind))?;
                self.ensure_logical(&left, token.span)?;
                self.ensure_logical(&right, token.span)?;
                let operator = if token.kind == TokenKind::And {
                    LogicalOperator::And
                } else {
                    LogicalOperator::Or
                };
                Ok(FilterExpression::Logical {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                })
            }
            TokenKind::Eq
            | TokenKind::Ne
            | TokenKind::Lt
            | TokenKind::Le
            | TokenKind::Gt
            | TokenKind::Ge => {
                // Comparison is non-associative; a second comparison
                // operator at the same precedence fails downstream.
                let right = self.parse_filter_expression(it, PRECEDENCE_RELATIONAL + 1)?;
                self.ensure_comparable(&left, token.span)?;
                self.ensure_comparable(&right, token.span)?;
                let operator = match token.kind {
                    TokenKind::Eq => ComparisonOperator::Eq,
                    TokenKind::Ne => ComparisonOperator::Ne,
                    TokenKind::Lt => ComparisonOperator::Lt,
                    TokenKind::Le => ComparisonOperator::Le,
                    TokenKind::Gt => ComparisonOperator::Gt,
                    _ => ComparisonOperator::Ge,
                };
                Ok(FilterExpression::Comparison {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                })
            }
            kind => Err(JSONPathError::syntax(
                format!("unexpected infix operator {}", kind),
                token.span,
            )),
        }
    }

    fn parse_function_call(&self, it: &mut TokenStream) -> Result<FilterExpression, JSONPathError> {
        let token = it.next().unwrap_or(EOQ_TOKEN);
        let mut args: Vec<FilterExpression> = Vec::new();

        while it.peek().unwrap_or(&EOQ_TOKEN).kind != TokenKind::RParen {
            let mut expression = self.parse_basic_expression(it)?;

            // An argument may be a comparison or logical expression.
            while is_binary_operator(&it.peek().unwrap_or(&EOQ_TOKEN).kind) {
                expression = self.parse_infix_expression(it, expression)?;
            }

            args.push(expression);

            match it.peek().unwrap_or(&EOQ_TOKEN) {
                Token {
                    kind: TokenKind::RParen,
                    ..
                } => break,
                Token {
                    kind: TokenKind::Comma,
                    ..
                } => {
                    it.next();
                }
                Token {
                    kind: TokenKind::Eoq,
                    span,
                } => {
                    return Err(JSONPathError::syntax(
                        String::from("unbalanced parentheses"),
                        *span,
                    ));
                }
                found => {
                    return Err(JSONPathError::syntax(
                        format!("expected a comma or closing paren, found {}", found.kind),
                        found.span,
                    ));
                }
            }
        }

        it.next(); // eat the closing paren

        match token.kind {
            TokenKind::Function { ref name } => {
                let name = name.to_string();
                self.validate_function_signature(&name, &args, token.span)?;
                Ok(FilterExpression::Function { name, args })
            }
            kind => Err(JSONPathError::syntax(
                format!("expected a function call, found {}", kind),
                token.span,
            )),
        }
    }

    /// Check a function call against the registered signature: arity
    /// first, then the declared type of each parameter.
    fn validate_function_signature(
        &self,
        name: &str,
        args: &[FilterExpression],
        span: (usize, usize),
    ) -> Result<(), JSONPathError> {
        let signature = self.functions.get(name).ok_or_else(|| {
            JSONPathError::name(format!("unknown function '{}'", name), span)
        })?;

        if args.len() != signature.param_types.len() {
            let plural = if signature.param_types.len() == 1 {
                "argument"
            } else {
                "arguments"
            };
            return Err(JSONPathError::typ(
                format!(
                    "{}() takes {} {} but {} were given",
                    name,
                    signature.param_types.len(),
                    plural,
                    args.len()
                ),
                span,
            ));
        }

        for (index, (arg, param_type)) in args.iter().zip(&signature.param_types).enumerate() {
            let ok = match param_type {
                ExpressionType::Value => {
                    arg.is_literal()
                        || self.is_singular_query(arg)
                        || self.function_return_type(arg) == Some(ExpressionType::Value)
                }
                ExpressionType::Logical => {
                    matches!(
                        arg,
                        FilterExpression::RelativeQuery { .. }
                            | FilterExpression::RootQuery { .. }
                            | FilterExpression::Logical { .. }
                            | FilterExpression::Comparison { .. }
                            | FilterExpression::Not { .. }
                    ) || self.function_return_type(arg) == Some(ExpressionType::Logical)
                }
                ExpressionType::Nodes => {
                    matches!(
                        arg,
                        FilterExpression::RelativeQuery { .. } | FilterExpression::RootQuery { .. }
                    ) || self.function_return_type(arg) == Some(ExpressionType::Nodes)
                }
            };

            if !ok {
                return Err(JSONPathError::typ(
                    format!("{}() argument {} must be of {:?}Type", name, index, param_type),
                    span,
                ));
            }
        }

        Ok(())
    }

    /// A filter, or an operand of `!`, `&&` or `||`, must be logical:
    /// literals and `ValueType` function results must be compared.
    fn ensure_logical(
        &self,
        expression: &FilterExpression,
        span: (usize, usize),
    ) -> Result<(), JSONPathError> {
        if expression.is_literal() {
            return Err(JSONPathError::typ(
                String::from("filter expression literals must be compared"),
                span,
            ));
        }

        if let FilterExpression::Function { name, .. } = expression {
            if self
                .functions
                .get(name)
                .map(|sig| sig.return_type == ExpressionType::Value)
                .unwrap_or(false)
            {
                return Err(JSONPathError::typ(
                    format!("result of {}() must be compared", name),
                    span,
                ));
            }
        }

        Ok(())
    }

    /// Comparison operands are literals, singular queries, or function
    /// calls returning `ValueType`.
    fn ensure_comparable(
        &self,
        expression: &FilterExpression,
        span: (usize, usize),
    ) -> Result<(), JSONPathError> {
        match expression {
            _ if expression.is_literal() => Ok(()),
            FilterExpression::RelativeQuery { query }
            | FilterExpression::RootQuery { query } => {
                if query.is_singular() {
                    Ok(())
                } else {
                    Err(JSONPathError::typ(
                        String::from("non-singular query is not comparable"),
                        span,
                    ))
                }
            }
            FilterExpression::Function { name, .. } => {
                match self.functions.get(name).map(|sig| sig.return_type) {
                    Some(ExpressionType::Value) => Ok(()),
                    _ => Err(JSONPathError::typ(
                        format!("result of {}() is not comparable", name),
                        span,
                    )),
                }
            }
            _ => Err(JSONPathError::typ(
                String::from("expression is not comparable"),
                span,
            )),
        }
    }

    fn is_singular_query(&self, expression: &FilterExpression) -> bool {
        match expression {
            FilterExpression::RelativeQuery { query } | FilterExpression::RootQuery { query } => {
                query.is_singular()
            }
            _ => false,
        }
    }

    fn function_return_type(&self, expression: &FilterExpression) -> Option<ExpressionType> {
        match expression {
            FilterExpression::Function { name, .. } => {
                self.functions.get(name).map(|sig| sig.return_type)
            }
            _ => None,
        }
    }
}

/// Parse an integer literal, which may carry a non-negative exponent.
/// Leading zeros are rejected; `-0` is allowed here, unlike in index
/// selectors.
fn parse_int_literal(value: &str, span: (usize, usize)) -> Result<i64, JSONPathError> {
    check_leading_zero(value, span)?;
    let parsed = value
        .parse::<f64>()
        .map_err(|_| JSONPathError::syntax(String::from("invalid integer literal"), span))?;
    Ok(parsed as i64)
}

fn parse_float_literal(value: &str, span: (usize, usize)) -> Result<f64, JSONPathError> {
    check_leading_zero(value, span)?;
    value
        .parse::<f64>()
        .map_err(|_| JSONPathError::syntax(String::from("invalid float literal"), span))
}

fn check_leading_zero(value: &str, span: (usize, usize)) -> Result<(), JSONPathError> {
    let mantissa = value
        .strip_prefix('-')
        .unwrap_or(value)
        .split(['.', 'e', 'E'])
        .next()
        .unwrap_or_default();

    if mantissa.len() > 1 && mantissa.starts_with('0') {
        Err(JSONPathError::syntax(
            String::from("leading zero in number literal"),
            span,
        ))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Single,
    Double,
}

/// Unescape a string literal's raw text. The lexer has already checked
/// that every backslash starts a plausible escape; this decodes them,
/// reassembles surrogate pairs, and rejects unescaped control
/// characters.
fn unescape_string(
    value: &str,
    quote: Quote,
    span: (usize, usize),
) -> Result<String, JSONPathError> {
    let chars: Vec<char> = value.chars().collect();
    let length = chars.len();
    let mut unescaped = String::with_capacity(value.len());
    let mut index = 0;

    while index < length {
        match chars[index] {
            '\\' => {
                index += 1;
                let escape = *chars.get(index).ok_or_else(|| {
                    JSONPathError::syntax(String::from("incomplete escape sequence"), span)
                })?;

                match escape {
                    '"' if quote == Quote::Double => unescaped.push('"'),
                    '\'' if quote == Quote::Single => unescaped.push('\''),
                    '\\' => unescaped.push('\\'),
                    '/' => unescaped.push('/'),
                    'b' => unescaped.push('\u{0008}'),
                    'f' => unescaped.push('\u{000C}'),
                    'n' => unescaped.push('\n'),
                    'r' => unescaped.push('\r'),
                    't' => unescaped.push('\t'),
                    'u' => {
                        let (ch, next_index) = decode_unicode_escape(&chars, index, span)?;
                        unescaped.push(ch);
                        index = next_index;
                    }
                    _ => {
                        return Err(JSONPathError::syntax(
                            String::from("invalid escape sequence"),
                            span,
                        ));
                    }
                }
            }
            ch if (ch as u32) < 0x20 => {
                return Err(JSONPathError::syntax(
                    String::from("invalid character in string literal"),
                    span,
                ));
            }
            ch => unescaped.push(ch),
        }

        index += 1;
    }

    Ok(unescaped)
}

/// Decode `\uXXXX` starting at `chars[index] == 'u'`. Returns the
/// decoded character and the index of the last consumed character.
fn decode_unicode_escape(
    chars: &[char],
    index: usize,
    span: (usize, usize),
) -> Result<(char, usize), JSONPathError> {
    let mut code_point = parse_hex_digits(chars, index + 1, span)?;
    let mut last = index + 4;

    if is_low_surrogate(code_point) {
        return Err(JSONPathError::syntax(
            String::from("unexpected low surrogate code point"),
            span,
        ));
    }

    if is_high_surrogate(code_point) {
        if !(chars.get(last + 1) == Some(&'\\') && chars.get(last + 2) == Some(&'u')) {
            return Err(JSONPathError::syntax(
                String::from("incomplete surrogate pair"),
                span,
            ));
        }

        let low = parse_hex_digits(chars, last + 3, span)?;
        if !is_low_surrogate(low) {
            return Err(JSONPathError::syntax(
                String::from("unexpected code point"),
                span,
            ));
        }

        code_point = 0x10000 + (((code_point & 0x03FF) << 10) | (low & 0x03FF));
        last += 6;
    }

    let ch = char::from_u32(code_point).ok_or_else(|| {
        JSONPathError::syntax(String::from("invalid \\uXXXX escape"), span)
    })?;

    Ok((ch, last))
}

fn parse_hex_digits(
    chars: &[char],
    start: usize,
    span: (usize, usize),
) -> Result<u32, JSONPathError> {
    let digits = chars.get(start..start + 4).ok_or_else(|| {
        JSONPathError::syntax(String::from("incomplete escape sequence"), span)
    })?;

    let digits: String = digits.iter().collect();
    u32::from_str_radix(&digits, 16)
        .map_err(|_| JSONPathError::syntax(String::from("invalid \\uXXXX escape"), span))
}

fn is_high_surrogate(code_point: u32) -> bool {
    (0xD800..=0xDBFF).contains(&code_point)
}

fn is_low_surrogate(code_point: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&code_point)
}

//! Expression parser
//!
//! A recursive descent parser for column expressions with proper operator
//! precedence. The accepted syntax is the one persisted in the schemas:
//! `{field}` references, arithmetic, comparisons, `&&`/`||`/`!`, and
//! function call forms (`IF`, `CEIL`, `NVL`, ...).

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};

/// Parse an expression string into an AST
///
/// # Example
/// ```rust
/// use atelier_formula::parse_expression;
///
/// let ast = parse_expression("1+2").unwrap();
/// let ast = parse_expression("{largeur} * {ampleur}").unwrap();
/// let ast = parse_expression("IF({paire} == 1, 4, 2)").unwrap();
/// ```
pub fn parse_expression(input: &str) -> FormulaResult<Expr> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FormulaError::Parse("Empty expression".into()));
    }

    let mut parser = ExprParser::new(input);
    let expr = parser.parse_or()?;

    // Make sure we consumed all input; the offending token sits in the
    // lookahead, not at the raw byte position
    if parser.current_token() != &Token::Eof {
        return Err(FormulaError::Parse(format!(
            "Unexpected token after expression: {:?}",
            parser.current_token()
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(f64),
    Text(String),

    // References and names
    FieldRef(String),   // {key}
    Identifier(String), // Function name or bare field reference

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    AndAnd,
    OrOr,
    Bang,
    Comma,

    // Delimiters
    LeftParen,
    RightParen,

    // Anything the scanner does not recognize
    Unknown(char),

    // End of input
    Eof,
}

/// Expression parser
struct ExprParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Option<Token>,
}

impl<'a> ExprParser<'a> {
    fn new(input: &'a str) -> Self {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: None,
        };
        parser.advance_token();
        parser
    }

    // === Token scanning ===

    fn advance_token(&mut self) {
        self.skip_whitespace();
        self.current_token = Some(self.scan_token());
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();

        if self.is_at_end() {
            return Token::Eof;
        }

        let c = self.peek_char().unwrap();

        // Single-character tokens
        match c {
            '+' => {
                self.advance();
                return Token::Plus;
            }
            '-' => {
                self.advance();
                return Token::Minus;
            }
            '*' => {
                self.advance();
                return Token::Star;
            }
            '/' => {
                self.advance();
                return Token::Slash;
            }
            ',' => {
                self.advance();
                return Token::Comma;
            }
            '(' => {
                self.advance();
                return Token::LeftParen;
            }
            ')' => {
                self.advance();
                return Token::RightParen;
            }
            '{' => {
                return self.scan_field_ref();
            }
            _ => {}
        }

        // One- and two-character operators
        if c == '<' {
            self.advance();
            if self.peek_char() == Some('=') {
                self.advance();
                return Token::LessEqual;
            } else if self.peek_char() == Some('>') {
                self.advance();
                return Token::NotEqual;
            }
            return Token::LessThan;
        }

        if c == '>' {
            self.advance();
            if self.peek_char() == Some('=') {
                self.advance();
                return Token::GreaterEqual;
            }
            return Token::GreaterThan;
        }

        if c == '=' {
            self.advance();
            // Legacy schemas write both `=` and `==`
            if self.peek_char() == Some('=') {
                self.advance();
            }
            return Token::Equal;
        }

        if c == '!' {
            self.advance();
            if self.peek_char() == Some('=') {
                self.advance();
                return Token::NotEqual;
            }
            return Token::Bang;
        }

        if c == '&' {
            self.advance();
            if self.peek_char() == Some('&') {
                self.advance();
                return Token::AndAnd;
            }
            return Token::Unknown('&');
        }

        if c == '|' {
            self.advance();
            if self.peek_char() == Some('|') {
                self.advance();
                return Token::OrOr;
            }
            return Token::Unknown('|');
        }

        // String literal (either quote style appears in the schemas)
        if c == '"' || c == '\'' {
            return self.scan_text(c);
        }

        // Number
        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        // Identifier: function name or bare field reference
        if c.is_ascii_alphabetic() || c == '_' {
            return self.scan_identifier();
        }

        // Unknown character
        self.advance();
        Token::Unknown(c)
    }

    fn scan_field_ref(&mut self) -> Token {
        self.advance(); // Skip '{'
        self.skip_whitespace();

        let start = self.pos;
        while self.peek_char().map_or(false, |c| c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        let key = self.input[start..self.pos].to_string();

        self.skip_whitespace();
        if key.is_empty() || self.peek_char() != Some('}') {
            return Token::Unknown('{');
        }
        self.advance(); // Skip '}'

        Token::FieldRef(key)
    }

    fn scan_text(&mut self, quote: char) -> Token {
        self.advance(); // Skip opening quote

        let mut s = String::new();
        while let Some(c) = self.peek_char() {
            if c == quote {
                break;
            }
            s.push(c);
            self.advance();
        }

        // Skip closing quote
        if self.peek_char() == Some(quote) {
            self.advance();
        }

        Token::Text(s)
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        match num_str.parse() {
            Ok(num) => Token::Number(num),
            // Malformed literal, e.g. "1e" with no exponent digits
            Err(_) => Token::Unknown(num_str.chars().next().unwrap_or('0')),
        }
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }

        Token::Identifier(self.input[start..self.pos].to_string())
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_token(&self) -> &Token {
        self.current_token.as_ref().unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> Token {
        let token = self.current_token.take().unwrap_or(Token::Eof);
        self.advance_token();
        token
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume();
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Logical or: ||
    // 2. Logical and: &&
    // 3. Comparison: =, ==, !=, <>, <, <=, >, >=
    // 4. Addition/Subtraction: +, -
    // 5. Multiplication/Division: *, /
    // 6. Unary: -, !
    // 7. Primary: literals, references, function calls, parentheses

    fn parse_or(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_and()?;

        while matches!(self.current_token(), Token::OrOr) {
            self.consume();
            let right = self.parse_and()?;
            left = Expr::BinaryOp {
                op: BinaryOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_comparison()?;

        while matches!(self.current_token(), Token::AndAnd) {
            self.consume();
            let right = self.parse_comparison()?;
            left = Expr::BinaryOp {
                op: BinaryOperator::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current_token() {
                Token::Equal => BinaryOperator::Equal,
                Token::NotEqual => BinaryOperator::NotEqual,
                Token::LessThan => BinaryOperator::LessThan,
                Token::LessEqual => BinaryOperator::LessEqual,
                Token::GreaterThan => BinaryOperator::GreaterThan,
                Token::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => break,
            };

            self.consume();
            let right = self.parse_additive()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume();
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume();
            let right = self.parse_unary()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        // Prefix minus
        if matches!(self.current_token(), Token::Minus) {
            self.consume();
            let operand = self.parse_unary()?;
            return Ok(Expr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(operand),
            });
        }

        // Prefix plus (no-op)
        if matches!(self.current_token(), Token::Plus) {
            self.consume();
            return self.parse_unary();
        }

        // Logical not
        if matches!(self.current_token(), Token::Bang) {
            self.consume();
            let operand = self.parse_unary()?;
            return Ok(Expr::UnaryOp {
                op: UnaryOperator::Not,
                operand: Box::new(operand),
            });
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume();
                Ok(Expr::Number(n))
            }

            Token::Text(s) => {
                self.consume();
                Ok(Expr::Text(s))
            }

            Token::FieldRef(key) => {
                self.consume();
                Ok(Expr::FieldRef(key))
            }

            Token::LeftParen => {
                self.consume();
                let expr = self.parse_or()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            Token::Identifier(name) => {
                self.consume();
                // A call form when followed by '(', otherwise a bare field
                // reference (legacy schemas spell both `{ml}` and `ml`)
                if matches!(self.current_token(), Token::LeftParen) {
                    self.parse_function_call(name)
                } else {
                    Ok(Expr::FieldRef(name))
                }
            }

            Token::Unknown(c) => Err(FormulaError::Parse(format!("Unexpected character: '{}'", c))),

            _ => Err(FormulaError::Parse(format!(
                "Unexpected token: {:?}",
                self.current_token()
            ))),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<Expr> {
        self.expect(&Token::LeftParen)?;

        let mut args = Vec::new();

        // Parse arguments
        if !matches!(self.current_token(), Token::RightParen) {
            args.push(self.parse_or()?);

            while matches!(self.current_token(), Token::Comma) {
                self.consume();
                args.push(self.parse_or()?);
            }
        }

        self.expect(&Token::RightParen)?;

        Ok(Expr::Function {
            name: name.to_uppercase(),
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        let ast = parse_expression("42").unwrap();
        assert_eq!(ast, Expr::Number(42.0));

        let ast = parse_expression("3.14").unwrap();
        assert_eq!(ast, Expr::Number(3.14));

        let ast = parse_expression("1e3").unwrap();
        assert_eq!(ast, Expr::Number(1000.0));
    }

    #[test]
    fn test_parse_text() {
        let ast = parse_expression("\"paire\"").unwrap();
        assert_eq!(ast, Expr::Text("paire".into()));

        let ast = parse_expression("'simple'").unwrap();
        assert_eq!(ast, Expr::Text("simple".into()));
    }

    #[test]
    fn test_parse_field_ref() {
        let ast = parse_expression("{largeur}").unwrap();
        assert_eq!(ast, Expr::FieldRef("largeur".into()));

        // Whitespace inside the braces is tolerated
        let ast = parse_expression("{ laize }").unwrap();
        assert_eq!(ast, Expr::FieldRef("laize".into()));

        // Bare identifiers resolve as fields too
        let ast = parse_expression("largeur").unwrap();
        assert_eq!(ast, Expr::FieldRef("largeur".into()));
    }

    #[test]
    fn test_parse_arithmetic_precedence() {
        let ast = parse_expression("1+2*3").unwrap();
        // Should parse as 1+(2*3) due to precedence
        if let Expr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Add);
            assert_eq!(*left, Expr::Number(1.0));
            assert!(matches!(
                *right,
                Expr::BinaryOp {
                    op: BinaryOperator::Multiply,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_comparison() {
        let ast = parse_expression("{a} > 5").unwrap();
        assert!(matches!(
            ast,
            Expr::BinaryOp {
                op: BinaryOperator::GreaterThan,
                ..
            }
        ));

        // All spellings of (in)equality
        for expr in ["{a} = 1", "{a} == 1"] {
            let ast = parse_expression(expr).unwrap();
            assert!(matches!(
                ast,
                Expr::BinaryOp {
                    op: BinaryOperator::Equal,
                    ..
                }
            ));
        }
        for expr in ["{a} != 1", "{a} <> 1"] {
            let ast = parse_expression(expr).unwrap();
            assert!(matches!(
                ast,
                Expr::BinaryOp {
                    op: BinaryOperator::NotEqual,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_parse_logical() {
        let ast = parse_expression("{a} > 1 && {b} < 2 || {c} = 3").unwrap();
        // `||` binds loosest
        assert!(matches!(
            ast,
            Expr::BinaryOp {
                op: BinaryOperator::Or,
                ..
            }
        ));

        let ast = parse_expression("!{paire}").unwrap();
        assert!(matches!(
            ast,
            Expr::UnaryOp {
                op: UnaryOperator::Not,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_function_call() {
        let ast = parse_expression("IF({paire} = 1, 4, 2)").unwrap();
        if let Expr::Function { name, args } = ast {
            assert_eq!(name, "IF");
            assert_eq!(args.len(), 3);
        } else {
            panic!("Expected Function");
        }

        // Function names are case-insensitive in legacy schemas
        let ast = parse_expression("ceil({ml})").unwrap();
        if let Expr::Function { name, args } = ast {
            assert_eq!(name, "CEIL");
            assert_eq!(args.len(), 1);
        } else {
            panic!("Expected Function");
        }
    }

    #[test]
    fn test_parse_nested_function() {
        let ast = parse_expression("IF({laize} > {h} + 50, CEIL({a_plat} / 100), 0)").unwrap();
        if let Expr::Function { name, args } = ast {
            assert_eq!(name, "IF");
            assert_eq!(args.len(), 3);
        } else {
            panic!("Expected Function");
        }
    }

    #[test]
    fn test_parse_parentheses() {
        let ast = parse_expression("({a}+2)*3").unwrap();
        if let Expr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Multiply);
            assert!(matches!(
                *left,
                Expr::BinaryOp {
                    op: BinaryOperator::Add,
                    ..
                }
            ));
            assert_eq!(*right, Expr::Number(3.0));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("{largeur} +").is_err());
        assert!(parse_expression("1 + 2)").is_err());
        assert!(parse_expression("IF(1, 2").is_err());
        assert!(parse_expression("{pas ferme").is_err());
        assert!(parse_expression("1 # 2").is_err());
    }

    #[test]
    fn test_parse_rejects_trailing_tokens() {
        // A single leftover token is still an error, never a silent
        // truncation of the expression
        assert!(parse_expression("1 + 2 3").is_err());
        assert!(parse_expression("{a} {b}").is_err());
        assert!(parse_expression("CEIL({ml}) 2").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_number_literals() {
        assert!(parse_expression("1e").is_err());
        assert!(parse_expression("2e+").is_err());
        assert!(parse_expression("{ml} * 1e").is_err());
    }

    #[test]
    fn test_parse_real_schema_expressions() {
        // Expressions lifted from the production quote schema
        for expr in [
            "IF({paire} = 1, ROUND({mecanisme} / 10) + 4, ROUND({mecanisme} / 10) + 2)",
            "CEIL({a_plat} / {laize})",
            "NVL({prix_unitaire}, 0) * {ml} * {quantite}",
            "{h_finie} + 50",
        ] {
            parse_expression(expr).unwrap();
        }
    }
}

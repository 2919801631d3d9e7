use std::fmt;

/// The different kinds of tokens the Kiwi grammar understands.
///
/// Kinds are grouped into disjoint categories (additive, multiplicative,
/// comparison, logical, statement keyword, literal, structural). The
/// predicates below are the single source of truth for category membership;
/// the parser never spells out those groups itself.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// A character sequence the scanner could not classify
    UNKNOWN,

    /// End‑of‑input marker, returned repeatedly once input is exhausted
    EOF,

    /// `// …` or `/* … */`, filtered out by the parser
    COMMENT,

    /// '+'
    ADD,

    /// '-'
    SUBTRACT,

    /// '*'
    MULTIPLY,

    /// '/'
    DIVIDE,

    /// '%'
    MODULO,

    /// '='
    EQUAL,

    /// '~='
    NOT_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQ,

    /// '<'
    LESS,

    /// '<='
    LESS_EQ,

    /// '&&'
    AND,

    /// '||'
    OR,

    /// '~'
    NOT,

    /// 'if'
    IF,

    /// 'func'
    FUNC,

    /// 'return'
    RETURN,

    /// 'while'
    WHILE,

    /// `true` / `false` in any letter case
    BOOL,

    /// A user‑defined name
    IDENTIFIER,

    /// A numeral
    NUMBER,

    /// A string literal (lexeme holds the contents without quotes)
    STRING,

    /// ':='
    ASSIGN,

    /// '{'
    LBRACE,

    /// '}'
    RBRACE,

    /// ':'
    COLON,

    /// ','
    COMMA,

    /// ';'
    SEMICOLON,

    /// 'else'
    ELSE,

    /// '('
    LPAREN,

    /// ')'
    RPAREN,
}

impl Token {
    /// Addition‑level operators.
    pub fn is_add_op(self) -> bool {
        matches!(self, Token::ADD | Token::SUBTRACT)
    }

    /// Multiplication‑level operators.
    pub fn is_mul_op(self) -> bool {
        matches!(self, Token::MULTIPLY | Token::DIVIDE | Token::MODULO)
    }

    /// Comparison operators.
    pub fn is_cmp_op(self) -> bool {
        matches!(
            self,
            Token::EQUAL
                | Token::NOT_EQUAL
                | Token::GREATER
                | Token::GREATER_EQ
                | Token::LESS
                | Token::LESS_EQ
        )
    }

    /// Logic operators, including the prefix `~`.
    pub fn is_log_op(self) -> bool {
        matches!(self, Token::AND | Token::OR | Token::NOT)
    }

    /// Operators that take a left and a right operand.
    pub fn is_bin_op(self) -> bool {
        (self.is_add_op() || self.is_mul_op() || self.is_cmp_op() || self.is_log_op())
            && self != Token::NOT
    }

    /// Operators that may prefix a term.
    pub fn is_unary_op(self) -> bool {
        self.is_add_op() || self == Token::NOT
    }

    /// Keywords that may begin a statement.
    pub fn is_stmt_keyword(self) -> bool {
        matches!(self, Token::IF | Token::FUNC | Token::RETURN | Token::WHILE)
    }

    /// Tokens that carry a literal value or a name.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Token::BOOL | Token::IDENTIFIER | Token::NUMBER | Token::STRING
        )
    }

    /// Relative binding strength of a binary operator tier; higher binds
    /// tighter. Non‑operators rank 0.
    pub fn precedence(self) -> u8 {
        if self.is_log_op() {
            1
        } else if self.is_cmp_op() {
            2
        } else if self.is_add_op() {
            3
        } else if self.is_mul_op() {
            4
        } else {
            0
        }
    }

    /// Every token kind, in declaration order.
    pub const ALL: [Token; 34] = [
        Token::UNKNOWN,
        Token::EOF,
        Token::COMMENT,
        Token::ADD,
        Token::SUBTRACT,
        Token::MULTIPLY,
        Token::DIVIDE,
        Token::MODULO,
        Token::EQUAL,
        Token::NOT_EQUAL,
        Token::GREATER,
        Token::GREATER_EQ,
        Token::LESS,
        Token::LESS_EQ,
        Token::AND,
        Token::OR,
        Token::NOT,
        Token::IF,
        Token::FUNC,
        Token::RETURN,
        Token::WHILE,
        Token::BOOL,
        Token::IDENTIFIER,
        Token::NUMBER,
        Token::STRING,
        Token::ASSIGN,
        Token::LBRACE,
        Token::RBRACE,
        Token::COLON,
        Token::COMMA,
        Token::SEMICOLON,
        Token::ELSE,
        Token::LPAREN,
        Token::RPAREN,
    ];
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: &'static str = match self {
            Token::UNKNOWN => "UNKNOWN",
            Token::EOF => "EOF",
            Token::COMMENT => "COMMENT",
            Token::ADD => "+",
            Token::SUBTRACT => "-",
            Token::MULTIPLY => "*",
            Token::DIVIDE => "/",
            Token::MODULO => "%",
            Token::EQUAL => "=",
            Token::NOT_EQUAL => "~=",
            Token::GREATER => ">",
            Token::GREATER_EQ => ">=",
            Token::LESS => "<",
            Token::LESS_EQ => "<=",
            Token::AND => "&&",
            Token::OR => "||",
            Token::NOT => "~",
            Token::IF => "if",
            Token::FUNC => "func",
            Token::RETURN => "return",
            Token::WHILE => "while",
            Token::BOOL => "BOOL",
            Token::IDENTIFIER => "IDENTIFIER",
            Token::NUMBER => "NUMBER",
            Token::STRING => "STRING",
            Token::ASSIGN => ":=",
            Token::LBRACE => "{",
            Token::RBRACE => "}",
            Token::COLON => ":",
            Token::COMMA => ",",
            Token::SEMICOLON => ";",
            Token::ELSE => "else",
            Token::LPAREN => "(",
            Token::RPAREN => ")",
        };

        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(pred: fn(Token) -> bool) -> Vec<Token> {
        Token::ALL.iter().copied().filter(|t| pred(*t)).collect()
    }

    #[test]
    fn display_spellings() {
        assert_eq!(Token::NOT_EQUAL.to_string(), "~=");
        assert_eq!(Token::ASSIGN.to_string(), ":=");
        assert_eq!(Token::RBRACE.to_string(), "}");
        assert_eq!(Token::IDENTIFIER.to_string(), "IDENTIFIER");
        assert_eq!(Token::EOF.to_string(), "EOF");
    }

    #[test]
    fn category_membership() {
        assert_eq!(members(Token::is_add_op), [Token::ADD, Token::SUBTRACT]);
        assert_eq!(
            members(Token::is_mul_op),
            [Token::MULTIPLY, Token::DIVIDE, Token::MODULO]
        );
        assert_eq!(
            members(Token::is_cmp_op),
            [
                Token::EQUAL,
                Token::NOT_EQUAL,
                Token::GREATER,
                Token::GREATER_EQ,
                Token::LESS,
                Token::LESS_EQ
            ]
        );
        assert_eq!(
            members(Token::is_log_op),
            [Token::AND, Token::OR, Token::NOT]
        );
        assert_eq!(
            members(Token::is_stmt_keyword),
            [Token::IF, Token::FUNC, Token::RETURN, Token::WHILE]
        );
        assert_eq!(
            members(Token::is_literal),
            [Token::BOOL, Token::IDENTIFIER, Token::NUMBER, Token::STRING]
        );
    }

    #[test]
    fn categories_are_disjoint() {
        let preds: [fn(Token) -> bool; 6] = [
            Token::is_add_op,
            Token::is_mul_op,
            Token::is_cmp_op,
            Token::is_log_op,
            Token::is_stmt_keyword,
            Token::is_literal,
        ];

        for t in Token::ALL {
            let hits = preds.iter().filter(|p| p(t)).count();
            assert!(hits <= 1, "{} belongs to {} categories", t, hits);
        }
    }

    #[test]
    fn unary_and_binary_operators() {
        assert!(Token::SUBTRACT.is_unary_op());
        assert!(Token::NOT.is_unary_op());
        assert!(!Token::MULTIPLY.is_unary_op());

        assert!(Token::SUBTRACT.is_bin_op());
        assert!(Token::OR.is_bin_op());
        assert!(!Token::NOT.is_bin_op());
        assert!(!Token::ASSIGN.is_bin_op());
    }

    #[test]
    fn precedence_tiers() {
        assert_eq!(Token::OR.precedence(), 1);
        assert_eq!(Token::LESS_EQ.precedence(), 2);
        assert_eq!(Token::ADD.precedence(), 3);
        assert_eq!(Token::MODULO.precedence(), 4);
        assert_eq!(Token::LPAREN.precedence(), 0);
    }
}

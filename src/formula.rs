// Copyright 2024 Vladimir Kharchev

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Parametric expressions such as `[0]*sin([1]*x)/x`.
//!
//! Supports arithmetic (`+`, `-`, `*`, `/`, `^`), the variables `x` and `y`, free parameters
//! written `[i]`, the constants `pi` and `e`, and the built-in functions `sin`, `cos`, `tan`,
//! `asin`, `acos`, `atan`, `exp`, `log`, `log10`, `sqrt`, `abs`, `pow`, `min` and `max`.

use crate::error::{Error, Result};

// ── AST ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Expr {
    Number(f64),
    Var(usize),
    Param(usize),
    Neg(Box<Expr>),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

#[derive(Debug, Clone, Copy)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy)]
enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Log,
    Log10,
    Sqrt,
    Abs,
    Pow,
    Min,
    Max,
}

impl Func {
    fn lookup(name: &str) -> Option<Func> {
        let func = match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "asin" => Func::Asin,
            "acos" => Func::Acos,
            "atan" => Func::Atan,
            "exp" => Func::Exp,
            "log" => Func::Log,
            "log10" => Func::Log10,
            "sqrt" => Func::Sqrt,
            "abs" => Func::Abs,
            "pow" => Func::Pow,
            "min" => Func::Min,
            "max" => Func::Max,
            _ => return None,
        };
        Some(func)
    }

    fn arity(self) -> usize {
        match self {
            Func::Pow | Func::Min | Func::Max => 2,
            _ => 1,
        }
    }
}

// ── Compiled formula ───────────────────────────────────────────

/// A compiled expression in up to two variables and any number of parameters.
#[derive(Debug, Clone)]
pub struct Formula {
    text: String,
    ast: Expr,
    n_params: usize,
    dimension: usize,
}

impl Formula {
    /// Parses and compiles `input`.
    ///
    /// # Errors
    /// Returns [`Error::Formula`] on unknown identifiers, unknown functions, wrong argument
    /// counts or malformed syntax.
    pub fn compile(input: &str) -> Result<Self> {
        let tokens = tokenize(input)?;
        let mut parser = Parser::new(&tokens);
        let ast = parser.parse_add()?;
        if parser.pos < parser.tokens.len() {
            return Err(Error::Formula(format!(
                "unexpected token after expression: {:?}",
                parser.tokens[parser.pos]
            )));
        }
        Ok(Formula {
            text: input.to_string(),
            ast,
            n_params: parser.max_param.map_or(0, |p| p + 1),
            dimension: parser.max_var.map_or(1, |v| v + 1),
        })
    }

    /// The source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Highest parameter index plus one.
    #[must_use]
    pub fn n_params(&self) -> usize {
        self.n_params
    }

    /// 1 for expressions in `x` only, 2 when `y` appears.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Evaluates the expression.
    ///
    /// Missing variables read as zero and missing parameters as NaN.
    #[must_use]
    pub fn eval(&self, vars: &[f64], params: &[f64]) -> f64 {
        eval_expr(&self.ast, vars, params)
    }
}

// ── Evaluation ─────────────────────────────────────────────────

fn eval_expr(e: &Expr, vars: &[f64], params: &[f64]) -> f64 {
    match e {
        Expr::Number(n) => *n,
        Expr::Var(i) => vars.get(*i).copied().unwrap_or(0.0),
        Expr::Param(i) => params.get(*i).copied().unwrap_or(f64::NAN),
        Expr::Neg(a) => -eval_expr(a, vars, params),
        Expr::BinOp(op, a, b) => {
            let lhs = eval_expr(a, vars, params);
            let rhs = eval_expr(b, vars, params);
            match op {
                BinOp::Add => lhs + rhs,
                BinOp::Sub => lhs - rhs,
                BinOp::Mul => lhs * rhs,
                BinOp::Div => lhs / rhs,
                BinOp::Pow => lhs.powf(rhs),
            }
        }
        Expr::Call(f, args) => {
            let a0 = || eval_expr(&args[0], vars, params);
            let a1 = || eval_expr(&args[1], vars, params);
            match f {
                Func::Sin => a0().sin(),
                Func::Cos => a0().cos(),
                Func::Tan => a0().tan(),
                Func::Asin => a0().asin(),
                Func::Acos => a0().acos(),
                Func::Atan => a0().atan(),
                Func::Exp => a0().exp(),
                Func::Log => a0().ln(),
                Func::Log10 => a0().log10(),
                Func::Sqrt => a0().sqrt(),
                Func::Abs => a0().abs(),
                Func::Pow => a0().powf(a1()),
                Func::Min => a0().min(a1()),
                Func::Max => a0().max(a1()),
            }
        }
    }
}

// ── Tokenizer ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Param(usize),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '^' => Some(Token::Caret),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            _ => None,
        };
        if let Some(t) = single {
            tokens.push(t);
            i += 1;
            continue;
        }

        match c {
            '[' => {
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&ch| ch == ']')
                    .map(|p| start + p)
                    .ok_or_else(|| Error::Formula("unterminated parameter reference".into()))?;
                let s: String = chars[start..end].iter().collect();
                let index: usize = s
                    .trim()
                    .parse()
                    .map_err(|_| Error::Formula(format!("invalid parameter index: '[{s}]'")))?;
                tokens.push(Token::Param(index));
                i = end + 1;
            }
            _ if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_digit()
                        || chars[i] == '.'
                        || chars[i] == 'e'
                        || chars[i] == 'E'
                        || ((chars[i] == '+' || chars[i] == '-')
                            && i > start
                            && (chars[i - 1] == 'e' || chars[i - 1] == 'E')))
                {
                    i += 1;
                }
                let s: String = chars[start..i].iter().collect();
                let n: f64 = s
                    .parse()
                    .map_err(|_| Error::Formula(format!("invalid number: '{s}'")))?;
                tokens.push(Token::Num(n));
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            _ => {
                return Err(Error::Formula(format!("unexpected character: '{c}'")));
            }
        }
    }

    Ok(tokens)
}

// ── Parser (recursive descent) ─────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    max_param: Option<usize>,
    max_var: Option<usize>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            max_param: None,
            max_var: None,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.advance() {
            Some(t) if t == expected => Ok(()),
            other => Err(Error::Formula(format!(
                "expected {expected:?}, got {other:?}"
            ))),
        }
    }

    fn parse_add(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul()?;
            lhs = Expr::BinOp(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::BinOp(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                let e = self.parse_unary()?;
                Ok(Expr::Neg(Box::new(e)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    // `^` binds tighter than unary minus and associates to the right.
    fn parse_power(&mut self) -> Result<Expr> {
        let base = self.parse_atom()?;
        if matches!(self.peek(), Some(Token::Caret)) {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(Expr::BinOp(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        match self.advance().cloned() {
            Some(Token::Num(n)) => Ok(Expr::Number(n)),
            Some(Token::Param(i)) => {
                self.max_param = Some(self.max_param.map_or(i, |m| m.max(i)));
                Ok(Expr::Param(i))
            }
            Some(Token::LParen) => {
                let e = self.parse_add()?;
                self.expect(&Token::RParen)?;
                Ok(e)
            }
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.advance();
                    let func = Func::lookup(&name)
                        .ok_or_else(|| Error::Formula(format!("unknown function: '{name}'")))?;
                    let mut args = vec![self.parse_add()?];
                    while matches!(self.peek(), Some(Token::Comma)) {
                        self.advance();
                        args.push(self.parse_add()?);
                    }
                    self.expect(&Token::RParen)?;
                    if args.len() != func.arity() {
                        return Err(Error::Formula(format!(
                            "{name} takes {} argument(s), got {}",
                            func.arity(),
                            args.len()
                        )));
                    }
                    Ok(Expr::Call(func, args))
                } else {
                    self.variable(&name)
                }
            }
            other => Err(Error::Formula(format!(
                "expected number, identifier, parameter or '(', got {other:?}"
            ))),
        }
    }

    fn variable(&mut self, name: &str) -> Result<Expr> {
        let index = match name {
            "x" => 0,
            "y" => 1,
            "pi" => return Ok(Expr::Number(std::f64::consts::PI)),
            "e" => return Ok(Expr::Number(std::f64::consts::E)),
            _ => return Err(Error::Formula(format!("unknown identifier: '{name}'"))),
        };
        self.max_var = Some(self.max_var.map_or(index, |m: usize| m.max(index)));
        Ok(Expr::Var(index))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn damped_sine() {
        let f = Formula::compile("[0]*sin([1]*x)/x").unwrap();
        assert_eq!(f.n_params(), 2);
        assert_eq!(f.dimension(), 1);
        let x: f64 = 1.3;
        assert_relative_eq!(f.eval(&[x], &[0.5, 2.0]), 0.5 * (2.0 * x).sin() / x, epsilon = 1e-12);
    }

    #[test]
    fn linear_law() {
        let f = Formula::compile("[0]+x*[1]").unwrap();
        assert_relative_eq!(f.eval(&[3.0], &[1.0, 2.0]), 7.0);
    }

    #[test]
    fn two_dimensional_product() {
        let f = Formula::compile("1000*(([0]*sin(x)/x)*([1]*sin(y)/y))+200").unwrap();
        assert_eq!(f.dimension(), 2);
        assert_eq!(f.n_params(), 2);
        let (x, y) = (0.7f64, -1.9f64);
        let expected = 1000.0 * ((x.sin() / x) * (y.sin() / y)) + 200.0;
        assert_relative_eq!(f.eval(&[x, y], &[1.0, 1.0]), expected, epsilon = 1e-9);
    }

    #[test]
    fn power_precedence() {
        let f = Formula::compile("-x^2").unwrap();
        assert_relative_eq!(f.eval(&[3.0], &[]), -9.0);
        let f = Formula::compile("2^3^2").unwrap();
        assert_relative_eq!(f.eval(&[], &[]), 512.0);
        let f = Formula::compile("2*pow(x, 2) + max(1, 4)").unwrap();
        assert_relative_eq!(f.eval(&[3.0], &[]), 22.0);
    }

    #[test]
    fn constants() {
        let f = Formula::compile("e^x").unwrap();
        assert_eq!(f.dimension(), 1);
        assert_relative_eq!(f.eval(&[1.0], &[]), std::f64::consts::E, epsilon = 1e-12);
        let f = Formula::compile("2*pi + 1e1").unwrap();
        assert_relative_eq!(f.eval(&[], &[]), 2.0 * std::f64::consts::PI + 10.0);
    }

    #[test]
    fn missing_parameters_evaluate_to_nan() {
        let f = Formula::compile("[1]*x").unwrap();
        assert!(f.eval(&[2.0], &[]).is_nan());
        assert!(f.eval(&[2.0], &[1.0]).is_nan());
        assert_relative_eq!(f.eval(&[2.0], &[1.0, 3.0]), 6.0);
    }

    #[test]
    fn sparse_parameter_indices() {
        let f = Formula::compile("[3]*x").unwrap();
        assert_eq!(f.n_params(), 4);
    }

    #[test]
    fn errors() {
        assert!(Formula::compile("z + 1").is_err());
        assert!(Formula::compile("foo(x)").is_err());
        assert!(Formula::compile("pow(x)").is_err());
        assert!(Formula::compile("[a]*x").is_err());
        assert!(Formula::compile("[0*x").is_err());
        assert!(Formula::compile("(x + 1").is_err());
        assert!(Formula::compile("x $ 2").is_err());
    }
}

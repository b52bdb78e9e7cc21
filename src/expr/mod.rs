//! Typed expression language for filter rules.
//!
//! Syntax:
//!   BaseName == "Chaos Orb"          - field comparison
//!   Rarity >= Rare                   - rarities order Normal < Magic < Rare < Unique
//!   BaseName.Contains("Essence")     - string methods: Contains, StartsWith, EndsWith
//!   StackSize >= 5 && !IsCorrupted   - boolean operators && || ! (or and/or/not)
//!   ItemLevel + Quality * 2 > 100    - arithmetic: + - * / %
//!   (expr)                           - grouping
//!
//! Rules are checked against the item schema when they compile: unknown
//! fields, unknown methods, and type mismatches are [`ParseError`]s, not
//! match-time surprises. A compiled [`Predicate`] can only fail at match
//! time with an [`EvalError`].

mod ast;
mod compile;
mod error;
mod eval;
mod lexer;
mod parser;

pub use compile::{Predicate, compile};
pub use error::{EvalError, ParseError};

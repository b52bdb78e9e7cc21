//! Rule-based item filtering.
//!
//! A filter file is a list of boolean rules over item records: one rule
//! per block, blocks separated by blank lines, `//` comments allowed.
//! Every block compiles independently against the item schema, so one bad
//! rule never takes the file down. Matching walks the rules in file order
//! and the first hit wins.
//!
//! ```
//! use lootfilter::{Item, ItemFilter};
//!
//! let filter = ItemFilter::parse(
//!     "// currency worth stacking\nBaseName.Contains(\"Orb\") && StackSize >= 5\n\nRarity == Unique\n",
//! );
//! assert!(filter.errors().is_empty());
//!
//! let item = Item {
//!     base_name: "Chaos Orb".into(),
//!     class_name: "StackableCurrency".into(),
//!     stack_size: 10,
//!     ..Item::default()
//! };
//! assert!(filter.matches(&item));
//! ```

pub mod expr;
pub mod filter;
pub mod item;

pub use expr::{EvalError, ParseError, Predicate};
pub use filter::{CompiledRule, FilterHandle, ItemFilter, LoadError, MatchOutcome, RuleError};
pub use item::{Item, Rarity};

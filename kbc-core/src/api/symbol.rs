/*!

Function symbols and the table that holds them. A [`crate::core::term_store::Symbol`] flatterm
word only ever carries a numeric id; everything else about a symbol — arity, KBO weight,
precedence, and whether it is the minimal constant or a Skolem constant — lives here, looked up
by id. This mirrors the teacher's `Symbol`/`SymbolTable` split (see `api/symbol.rs` and
`core/symbol/`), minus the sort system, which this spec has no use for (sort-erased terms only,
per §1's Non-goals).

*/

use std::fmt;

use enumflags2::{bitflags, BitFlags};
use kbc_abs::IString;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub struct FunctionId(pub u32);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub struct VariableIndex(pub u32);

impl VariableIndex {
  #[inline(always)]
  pub fn as_usize(self) -> usize {
    self.0 as usize
  }

  #[inline(always)]
  pub fn from_usize(n: usize) -> Self {
    VariableIndex(n as u32)
  }
}

#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SymbolFlag {
  /// The distinguished least constant: `orient` never needs to be told about it explicitly
  /// because it's the one constant with weight 0, but code that special-cases the
  /// `WeaklyOriented` check looks for this flag rather than comparing weights directly.
  Minimal,
  /// Marks a constant introduced by Skolemization of an existentially quantified goal
  /// variable, so that proof printing (out of scope here) can tell it apart from a
  /// user-declared constant.
  SkolemOf,
}

pub type SymbolFlags = BitFlags<SymbolFlag>;

/// Carries everything about a function symbol besides its numeric id: arity, the weight and
/// precedence rank used by the KBO (§4.C), and the minimal/Skolem flags (§3).
#[derive(Clone, Debug)]
pub struct FunctionSymbol {
  pub name:       IString,
  pub arity:      u32,
  pub weight:     u32,
  pub precedence: i64,
  pub flags:      SymbolFlags,
}

impl FunctionSymbol {
  pub fn new(name: impl Into<IString>, arity: u32, weight: u32, precedence: i64) -> Self {
    FunctionSymbol { name: name.into(), arity, weight, precedence, flags: SymbolFlags::empty() }
  }

  pub fn with_flags(mut self, flags: SymbolFlags) -> Self {
    self.flags = flags;
    self
  }

  pub fn is_minimal(&self) -> bool {
    self.flags.contains(SymbolFlag::Minimal)
  }

  pub fn is_skolem(&self) -> bool {
    self.flags.contains(SymbolFlag::SkolemOf)
  }
}

impl fmt::Display for FunctionSymbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)
  }
}

/// The set of declared function symbols, indexed by [`FunctionId`]. Precedence is total: two
/// distinct symbols never share a `precedence` value (enforced by `declare`, which breaks ties
/// on insertion order if the caller doesn't supply distinct ranks).
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
  symbols:    Vec<FunctionSymbol>,
  minimal_id: Option<FunctionId>,
}

impl SymbolTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Declares a new function symbol, returning the id it is assigned. If `symbol` is flagged
  /// `Minimal`, it becomes the table's minimal constant (only one is allowed; declaring a
  /// second panics, an internal-assertion-style programming error per §7).
  pub fn declare(&mut self, mut symbol: FunctionSymbol) -> FunctionId {
    // Keep precedence total: if the caller's rank collides with an existing one, nudge it
    // past the current maximum so every declared symbol remains distinguishable.
    if self.symbols.iter().any(|s| s.precedence == symbol.precedence) {
      let max = self.symbols.iter().map(|s| s.precedence).max().unwrap_or(0);
      symbol.precedence = max + 1;
    }
    let id = FunctionId(self.symbols.len() as u32);
    if symbol.is_minimal() {
      assert!(self.minimal_id.is_none(), "a second minimal constant was declared");
      self.minimal_id = Some(id);
    }
    self.symbols.push(symbol);
    id
  }

  pub fn get(&self, id: FunctionId) -> &FunctionSymbol {
    &self.symbols[id.0 as usize]
  }

  pub fn minimal(&self) -> Option<FunctionId> {
    self.minimal_id
  }

  pub fn weight(&self, id: FunctionId) -> u32 {
    self.get(id).weight
  }

  pub fn arity(&self, id: FunctionId) -> u32 {
    self.get(id).arity
  }

  /// Total precedence comparison between two function symbols.
  pub fn precedence_cmp(&self, a: FunctionId, b: FunctionId) -> std::cmp::Ordering {
    self.get(a).precedence.cmp(&self.get(b).precedence)
  }

  pub fn len(&self) -> usize {
    self.symbols.len()
  }
}

/// The fixed KBO weight contributed by each occurrence of a bound variable. Standard KBO
/// practice (and the only choice consistent with the minimal constant, which must have weight
/// 0 and therefore be lighter than any variable, per §4.C).
pub const VARIABLE_WEIGHT: u32 = 1;

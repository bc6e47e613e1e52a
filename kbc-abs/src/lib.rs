#![allow(unused)]
/*!

Types and small utilities that abstract over the implementing backing type, in the style of
a "platform" crate: everything here is generic over the notion of "a term rewriting engine,"
not specific to the saturation engine built on top of it.

A motivating example is `IString`, an interned string type. A number of external crates could
provide this functionality; this module redirects to whichever one we've chosen so the choice
can change in one place:

```ignore
pub use string_cache::DefaultAtom as IString;
```

Another example is the `log` module, whose (crate) public interface consists only of
`init_tracing()` and the macros `critical!`, `error!`, `warning!`, `info!`, `debug!`, and
`trace!`. The backing implementation (currently `tracing`) is encapsulated there so call sites
never need to know which logging crate is in use.

*/

pub mod log;
pub mod labeller;
mod nat_set;
mod string_util;

// Interned string. A process-wide cache shared across threads.
pub use string_cache::DefaultAtom as IString;

pub use smallvec::{SmallVec, smallvec};

// A set of (small) natural numbers, e.g. a set of variable indices.
pub use nat_set::NatSet;

pub use string_util::int_to_subscript;

pub use tracing;

/*!

The message sink a [`crate::Prover`] forwards its output stream to (§6). Decoupling "what the
engine did" from "what happens to that information" lets an embedder choose: pretty-print it,
forward it over a wire, or (as tests do) just collect it.

*/

use kbc_core::Message;

pub trait Output {
  fn emit(&mut self, message: Message);
}

/// The simplest possible sink: appends every message to a `Vec`, in order.
#[derive(Default)]
pub struct CollectingOutput {
  pub messages: Vec<Message>,
}

impl Output for CollectingOutput {
  fn emit(&mut self, message: Message) {
    self.messages.push(message);
  }
}

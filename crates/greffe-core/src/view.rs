//! Resolved read models.
//!
//! An [`ActView`] is the fully-resolved form of a certificate: the act plus
//! its subject and the names (not just ids) of the commune, its parent
//! entity, and the province. It is what API callers receive and what an
//! external certificate renderer consumes; the engine itself never renders.

use serde::Serialize;

use crate::{act::Act, person::Person};

/// The computed read model for a certificate — never stored, always derived.
#[derive(Debug, Clone, Serialize)]
pub struct ActView {
  pub act:      Act,
  pub subject:  Person,
  pub commune:  String,
  pub entity:   String,
  pub province: String,
}

/// Pure rendering seam for certificate documents (PDF or otherwise).
/// Implemented outside this workspace; the registry only supplies the
/// resolved view.
pub trait CertificateRenderer {
  fn render(&self, view: &ActView) -> Vec<u8>;
}
